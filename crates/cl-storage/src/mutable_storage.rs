//! # Mutable Storage - The Block Applier
//!
//! One isolated unit of work over a working copy of the world state.
//! Candidate blocks are folded in one at a time; each block executes under a
//! savepoint and either lands completely or leaves no trace, while blocks
//! already folded earlier in this instance's lifetime stay intact. Nothing
//! becomes durable until the owning [`Storage`](crate::Storage) commits the
//! whole instance; dropping it un-committed discards everything.

use cl_execution::execute;
use cl_state::WorldStateView;
use shared_types::{hex_hash, Block, Hash};
use tracing::{debug, warn};

/// A speculative sequence of applied blocks awaiting commit.
#[derive(Debug)]
pub struct MutableStorage {
    wsv: WorldStateView,
    top_hash: Hash,
    top_height: u64,
    staged: Vec<Block>,
}

impl MutableStorage {
    /// Open a unit of work on a snapshot of the durable state.
    #[must_use]
    pub fn new(wsv: WorldStateView, top_hash: Hash, top_height: u64) -> Self {
        Self {
            wsv,
            top_hash,
            top_height,
            staged: Vec::new(),
        }
    }

    /// Apply one candidate block.
    ///
    /// The prologue runs first, against the pre-block state and the current
    /// top-of-chain hash; it is the caller's chain-continuity and signature
    /// check, and a `false` aborts before any command executes. Commands
    /// then run in transaction order with conjunctive short-circuit: the
    /// first failure rolls the whole block back to the savepoint.
    ///
    /// Returns whether the block was applied.
    pub fn apply<F>(&mut self, block: Block, prologue: F) -> bool
    where
        F: FnOnce(&Block, &WorldStateView, &Hash) -> bool,
    {
        // Savepoint scoped to this block.
        let savepoint = self.wsv.clone();

        let mut ok = prologue(&block, &self.wsv, &self.top_hash);
        if !ok {
            debug!(height = block.height, "block prologue rejected the block");
        }

        'outer: for tx in &block.transactions {
            if !ok {
                break;
            }
            let creator = tx.payload.creator.clone();
            for command in &tx.payload.commands {
                if let Err(e) = execute(command, &mut self.wsv, Some(&creator)) {
                    warn!(
                        height = block.height,
                        tx = %hex_hash(&tx.hash()),
                        error = %e,
                        "command failed, rolling block back"
                    );
                    ok = false;
                    break 'outer;
                }
            }
        }

        if ok {
            self.top_hash = block.hash();
            self.top_height = block.height;
            self.staged.push(block);
        } else {
            self.wsv = savepoint;
        }
        ok
    }

    /// Read access to the working state, including staged effects.
    #[must_use]
    pub fn wsv(&self) -> &WorldStateView {
        &self.wsv
    }

    /// Top-of-chain hash including staged blocks.
    #[must_use]
    pub fn top_hash(&self) -> Hash {
        self.top_hash
    }

    /// Top-of-chain height including staged blocks.
    #[must_use]
    pub fn top_height(&self) -> u64 {
        self.top_height
    }

    /// Blocks staged so far, in application order.
    #[must_use]
    pub fn staged_blocks(&self) -> &[Block] {
        &self.staged
    }

    /// Decompose into working state and staged blocks for commit.
    #[must_use]
    pub(crate) fn into_parts(self) -> (WorldStateView, Vec<Block>, Hash) {
        (self.wsv, self.staged, self.top_hash)
    }
}
