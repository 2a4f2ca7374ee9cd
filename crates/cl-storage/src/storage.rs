//! # Durable Storage Owner
//!
//! The single owner of the durable ledger: world state, block store, indices
//! and the top-of-chain hash, behind one lock. Writers work on snapshots
//! (a [`MutableStorage`] for applying candidate blocks, a [`TemporaryWsv`]
//! for stateful validation) and readers always observe the last committed
//! state, never an in-flight block.
//!
//! The prepare/commit split is the one sanctioned overlap of tentative-state
//! computation with a durable commit: [`Storage::prepare_block`] executes a
//! candidate against a snapshot, and [`Storage::commit_prepared`] publishes
//! it only if the chain head still matches the parent the snapshot was built
//! against. A mismatch consumes and drops the prepared state; the caller
//! re-prepares against the new head.

use parking_lot::RwLock;
use tracing::{debug, info};

use cl_state::WorldStateView;
use shared_types::{hex_hash, AccountId, AssetId, Block, Hash};

use crate::block_store::BlockStore;
use crate::errors::StorageError;
use crate::index::BlockIndex;
use crate::mutable_storage::MutableStorage;
use crate::temporary_wsv::TemporaryWsv;
use crate::GENESIS_PARENT_HASH;

#[derive(Debug, Default)]
struct Durable {
    wsv: WorldStateView,
    blocks: BlockStore,
    index: BlockIndex,
    top_hash: Hash,
}

/// A candidate block executed against a snapshot, awaiting publication.
///
/// Holds the post-execution state and the parent hash the snapshot was
/// built against. Consumed by [`Storage::commit_prepared`] on both the
/// success and the mismatch path, so stale prepared state never lingers.
#[derive(Debug)]
pub struct PreparedBlock {
    block: Block,
    wsv_after: WorldStateView,
    parent_hash: Hash,
}

impl PreparedBlock {
    /// The prepared candidate block.
    #[must_use]
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// The chain head this block was prepared against.
    #[must_use]
    pub fn parent_hash(&self) -> Hash {
        self.parent_hash
    }
}

/// The durable ledger.
#[derive(Debug, Default)]
pub struct Storage {
    inner: RwLock<Durable>,
}

impl Storage {
    /// An empty ledger with the all-zero genesis parent hash.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Durable {
                top_hash: GENESIS_PARENT_HASH,
                ..Durable::default()
            }),
        }
    }

    /// Open a block-applier unit of work on a snapshot of the current state.
    ///
    /// Dropping the returned value without [`Storage::commit`] discards it;
    /// rollback is the default, durability takes the explicit step.
    #[must_use]
    pub fn create_mutable_storage(&self) -> MutableStorage {
        let durable = self.inner.read();
        MutableStorage::new(
            durable.wsv.clone(),
            durable.top_hash,
            durable.blocks.height(),
        )
    }

    /// Open a validation snapshot of the current state.
    #[must_use]
    pub fn create_temporary_wsv(&self) -> TemporaryWsv {
        TemporaryWsv::new(self.inner.read().wsv.clone())
    }

    /// Fold a finished unit of work into the durable ledger.
    ///
    /// # Errors
    ///
    /// `ChainMismatch` when the first staged block does not chain onto the
    /// durable head (another commit won the race); the unit of work is
    /// consumed and discarded. Height gaps surface as `HeightGap`.
    pub fn commit(&self, mutable: MutableStorage) -> Result<(), StorageError> {
        let (wsv, staged, top_hash) = mutable.into_parts();
        if staged.is_empty() {
            return Ok(());
        }
        let mut durable = self.inner.write();
        let first = &staged[0];
        if first.prev_hash != durable.top_hash {
            return Err(StorageError::ChainMismatch {
                staged_parent: hex_hash(&first.prev_hash),
                durable_top: hex_hash(&durable.top_hash),
            });
        }
        // Validate the whole sequence before touching the durable store, so
        // a height gap cannot leave a half-committed sequence behind.
        let mut expected = durable.blocks.height() + 1;
        for block in &staged {
            if block.height != expected {
                return Err(StorageError::HeightGap {
                    expected,
                    got: block.height,
                });
            }
            expected += 1;
        }
        let top_height = staged.last().map(|b| b.height).unwrap_or_default();
        let count = staged.len();
        for block in staged {
            durable.index.index_block(&block);
            durable.blocks.append(block)?;
        }
        durable.wsv = wsv;
        durable.top_hash = top_hash;
        info!(blocks = count, top_height, "committed unit of work");
        Ok(())
    }

    /// Execute a candidate block against a snapshot without publishing it.
    ///
    /// Every transaction is stateful-validated and executed; the first
    /// rejection fails the whole prepare.
    ///
    /// # Errors
    ///
    /// `PrepareFailed` carrying the first rejection's reason.
    pub fn prepare_block(&self, block: Block) -> Result<PreparedBlock, StorageError> {
        let (mut temp, parent_hash) = {
            let durable = self.inner.read();
            (
                TemporaryWsv::new(durable.wsv.clone()),
                durable.top_hash,
            )
        };
        for tx in &block.transactions {
            temp.apply(tx)
                .map_err(|e| StorageError::PrepareFailed {
                    reason: e.to_string(),
                })?;
        }
        debug!(height = block.height, "block prepared");
        Ok(PreparedBlock {
            block,
            wsv_after: temp.into_wsv(),
            parent_hash,
        })
    }

    /// Publish a prepared block if the chain head has not moved.
    ///
    /// # Errors
    ///
    /// `StalePreparedState` when the durable head no longer matches the
    /// parent the snapshot was built against. The prepared state is consumed
    /// either way: the mismatch arm disposes it and the caller re-prepares.
    pub fn commit_prepared(&self, prepared: PreparedBlock) -> Result<(), StorageError> {
        let mut durable = self.inner.write();
        if durable.top_hash != prepared.parent_hash {
            return Err(StorageError::StalePreparedState {
                prepared_parent: hex_hash(&prepared.parent_hash),
                durable_top: hex_hash(&durable.top_hash),
            });
        }
        let PreparedBlock {
            block, wsv_after, ..
        } = prepared;
        let block_hash = block.hash();
        durable.index.index_block(&block);
        durable.blocks.append(block)?;
        durable.wsv = wsv_after;
        durable.top_hash = block_hash;
        info!(top = %hex_hash(&block_hash), "committed prepared block");
        Ok(())
    }

    /// Snapshot of the committed world state.
    #[must_use]
    pub fn view(&self) -> WorldStateView {
        self.inner.read().wsv.clone()
    }

    /// Hash of the newest committed block.
    #[must_use]
    pub fn top_hash(&self) -> Hash {
        self.inner.read().top_hash
    }

    /// Height of the newest committed block; 0 for an empty chain.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.inner.read().blocks.height()
    }

    /// True if a committed block contains the transaction.
    #[must_use]
    pub fn has_transaction(&self, hash: &Hash) -> bool {
        self.inner.read().index.has_transaction(hash)
    }

    /// Committed transaction hashes created by an account.
    #[must_use]
    pub fn account_transactions(&self, account: &AccountId) -> Vec<Hash> {
        self.inner.read().index.account_transactions(account).to_vec()
    }

    /// Committed transaction hashes touching an (account, asset) balance.
    #[must_use]
    pub fn account_asset_transactions(&self, account: &AccountId, asset: &AssetId) -> Vec<Hash> {
        self.inner
            .read()
            .index
            .account_asset_transactions(account, asset)
            .to_vec()
    }

    /// Fetch a committed block by height, verifying integrity.
    pub fn get_block(&self, height: u64) -> Result<Option<Block>, StorageError> {
        self.inner.read().blocks.get(height).map(|b| b.cloned())
    }
}
