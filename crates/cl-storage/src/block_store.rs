//! # Append-Only Block Store
//!
//! Blocks keyed by height, strictly increasing and gapless. Each stored
//! block carries a checksum computed at write time and verified on every
//! read; a mismatch means the store is corrupt, which the node treats as
//! unrecoverable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use shared_types::{Block, Hash};

use crate::errors::StorageError;

/// A block at rest, wrapped with write-time integrity metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBlock {
    /// The block itself.
    pub block: Block,
    /// SHA-256 over the serialized block, computed at write time.
    pub checksum: Hash,
}

impl StoredBlock {
    fn new(block: Block) -> Result<Self, StorageError> {
        let checksum = checksum_of(&block)?;
        Ok(Self { block, checksum })
    }

    fn verify(&self) -> Result<(), StorageError> {
        let recomputed = checksum_of(&self.block)?;
        if recomputed != self.checksum {
            return Err(StorageError::CorruptedBlock {
                height: self.block.height,
            });
        }
        Ok(())
    }
}

fn checksum_of(block: &Block) -> Result<Hash, StorageError> {
    let bytes = bincode::serialize(block).map_err(|e| StorageError::Serialization {
        height: block.height,
        reason: e.to_string(),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hasher.finalize().into())
}

/// Append-only storage of committed blocks, keyed by height.
#[derive(Debug, Clone, Default)]
pub struct BlockStore {
    blocks: BTreeMap<u64, StoredBlock>,
}

impl BlockStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next block. Heights start at 1 and are gapless.
    pub fn append(&mut self, block: Block) -> Result<(), StorageError> {
        let expected = self.height() + 1;
        if block.height != expected {
            return Err(StorageError::HeightGap {
                expected,
                got: block.height,
            });
        }
        if self.blocks.contains_key(&block.height) {
            return Err(StorageError::HeightOccupied {
                height: block.height,
            });
        }
        let height = block.height;
        self.blocks.insert(height, StoredBlock::new(block)?);
        Ok(())
    }

    /// Fetch a block by height, verifying its checksum.
    pub fn get(&self, height: u64) -> Result<Option<&Block>, StorageError> {
        match self.blocks.get(&height) {
            Some(stored) => {
                stored.verify()?;
                Ok(Some(&stored.block))
            }
            None => Ok(None),
        }
    }

    /// Height of the newest block; 0 for an empty chain.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.blocks.keys().next_back().copied().unwrap_or(0)
    }

    /// Number of stored blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when no block has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
