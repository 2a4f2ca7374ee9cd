//! # Transactions
//!
//! A transaction is an ordered command list signed by its creator account.
//! The *reduced hash* is computed over the payload with signatures excluded,
//! so resubmitting the same transaction with additional signatures (the
//! multi-signature flow) keeps the same identity for deduplication and
//! batching.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};

use crate::command::Command;
use crate::ids::AccountId;
use crate::{Hash, PublicKey, Signature, Timestamp};

/// Batch metadata binding sibling transactions into one atomic unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMeta {
    /// Reduced hashes of every member of the batch, in batch order.
    pub reduced_hashes: Vec<Hash>,
}

/// One signature over a transaction payload.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    /// Key the signature was produced with.
    pub public_key: PublicKey,
    /// Signature over the payload bytes.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

/// The signed-over part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPayload {
    /// Account that authored the transaction.
    pub creator: AccountId,
    /// Commands to apply, in order.
    pub commands: Vec<Command>,
    /// Creation time, milliseconds since epoch.
    pub created_at: Timestamp,
    /// Required number of distinct signatures.
    pub quorum: u32,
    /// Present when this transaction is part of an atomic batch.
    pub batch: Option<BatchMeta>,
}

/// A signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The signed-over payload.
    pub payload: TransactionPayload,
    /// Collected signatures; may still be below quorum for MST flows.
    pub signatures: Vec<TransactionSignature>,
}

/// The reduced view of a payload: what the reduced hash covers. Signatures
/// and batch metadata are excluded, so batch members can reference each
/// other's reduced hashes without circularity.
#[derive(Serialize)]
struct ReducedPayload<'a> {
    creator: &'a AccountId,
    commands: &'a [Command],
    created_at: Timestamp,
    quorum: u32,
}

impl Transaction {
    /// Reduced hash: SHA-256 over the payload with signatures and batch
    /// metadata excluded. Used for deduplication and batch references.
    #[must_use]
    pub fn reduced_hash(&self) -> Hash {
        let reduced = ReducedPayload {
            creator: &self.payload.creator,
            commands: &self.payload.commands,
            created_at: self.payload.created_at,
            quorum: self.payload.quorum,
        };
        let bytes = bincode::serialize(&reduced).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        hasher.finalize().into()
    }

    /// Canonical transaction hash. Same as the reduced hash: identity never
    /// depends on which signatures have been collected so far.
    #[must_use]
    pub fn hash(&self) -> Hash {
        self.reduced_hash()
    }

    /// Required signature quorum.
    #[must_use]
    pub fn quorum(&self) -> u32 {
        self.payload.quorum
    }

    /// Number of distinct signatory keys currently attached.
    #[must_use]
    pub fn signature_count(&self) -> usize {
        let mut keys: Vec<&PublicKey> = self.signatures.iter().map(|s| &s.public_key).collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }

    /// True once the collected distinct signatures meet the quorum.
    #[must_use]
    pub fn has_enough_signatures(&self) -> bool {
        self.signature_count() >= self.quorum() as usize
    }
}
