//! # Blocks
//!
//! A block is an ordered transaction list chained to its parent by hash.
//! Blocks are immutable once constructed; the hash is computed over the
//! header fields and the member transaction hashes, the way the block store
//! persists them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::transaction::Transaction;
use crate::{Hash, Timestamp};

/// An ordered, hash-chained set of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Height in the chain; strictly increasing, gapless.
    pub height: u64,
    /// Hash of the parent block.
    pub prev_hash: Hash,
    /// Creation time, milliseconds since epoch.
    pub created_at: Timestamp,
    /// Transactions in application order.
    pub transactions: Vec<Transaction>,
    /// Hashes of transactions that failed stateful validation in this round.
    /// Carried so the commit event can resolve them to a rejected status.
    pub rejected_hashes: Vec<Hash>,
}

impl Block {
    /// Block hash over height, parent hash, time and member hashes.
    #[must_use]
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.height.to_le_bytes());
        hasher.update(self.prev_hash);
        hasher.update(self.created_at.to_le_bytes());
        for tx in &self.transactions {
            hasher.update(tx.hash());
        }
        for rejected in &self.rejected_hashes {
            hasher.update(rejected);
        }
        hasher.finalize().into()
    }

    /// True if the block carries a transaction with the given hash.
    #[must_use]
    pub fn contains_transaction(&self, hash: &Hash) -> bool {
        self.transactions.iter().any(|tx| tx.hash() == *hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::ids::AccountId;
    use crate::transaction::TransactionPayload;

    fn block_at(height: u64, prev_hash: Hash) -> Block {
        Block {
            height,
            prev_hash,
            created_at: 1_700_000_000_000,
            transactions: vec![Transaction {
                payload: TransactionPayload {
                    creator: AccountId::new("admin", "test"),
                    commands: vec![Command::CreateDomain {
                        domain_id: "d".into(),
                        default_role: "user".into(),
                    }],
                    created_at: 1_700_000_000_000,
                    quorum: 1,
                    batch: None,
                },
                signatures: vec![],
            }],
            rejected_hashes: vec![],
        }
    }

    #[test]
    fn hash_chains_on_parent() {
        let a = block_at(1, [0u8; 32]);
        let b = block_at(1, [1u8; 32]);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn contains_transaction_by_hash() {
        let block = block_at(1, [0u8; 32]);
        let tx_hash = block.transactions[0].hash();
        assert!(block.contains_transaction(&tx_hash));
        assert!(!block.contains_transaction(&[9u8; 32]));
    }
}
