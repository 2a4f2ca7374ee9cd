//! Storage-layer failures.
//!
//! Everything here is recoverable at block granularity except corruption of
//! the append-only store, which the owning process treats as fatal.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Appending a block out of sequence.
    #[error("Height gap: expected {expected}, got {got}")]
    HeightGap { expected: u64, got: u64 },

    /// A block already occupies this height.
    #[error("Block already stored at height {height}")]
    HeightOccupied { height: u64 },

    /// Stored block bytes no longer match their write-time checksum.
    #[error("Corrupted block at height {height}")]
    CorruptedBlock { height: u64 },

    /// Block could not be serialized for storage.
    #[error("Block serialization failed at height {height}: {reason}")]
    Serialization { height: u64, reason: String },

    /// The first staged block does not chain onto the durable head.
    #[error("Chain mismatch: staged parent {staged_parent}, durable top {durable_top}")]
    ChainMismatch {
        staged_parent: String,
        durable_top: String,
    },

    /// A prepared block's parent no longer matches the durable head; the
    /// prepared state was disposed and the caller must re-prepare.
    #[error("Stale prepared state: prepared against {prepared_parent}, durable top {durable_top}")]
    StalePreparedState {
        prepared_parent: String,
        durable_top: String,
    },

    /// A candidate block failed stateful validation during prepare.
    #[error("Prepare failed: {reason}")]
    PrepareFailed { reason: String },
}
