//! # Ledger Storage
//!
//! The durable side of the commit pipeline:
//!
//! - [`BlockStore`] - append-only blocks keyed by height, checksummed at
//!   write and verified on read.
//! - [`BlockIndex`] - secondary indices from accounts and (account, asset)
//!   pairs to referencing transaction hashes.
//! - [`MutableStorage`] - the block applier: one isolated unit of work that
//!   folds candidate blocks in all-or-nothing steps and discards everything
//!   unless explicitly committed.
//! - [`TemporaryWsv`] - per-transaction stateful validation against a
//!   throwaway snapshot.
//! - [`Storage`] - the single durable owner; hands out snapshots to readers
//!   and implements the prepare/commit split with a parent-hash re-check.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod block_store;
pub mod errors;
pub mod index;
pub mod mutable_storage;
pub mod storage;
pub mod temporary_wsv;

pub use block_store::BlockStore;
pub use errors::StorageError;
pub use index::BlockIndex;
pub use mutable_storage::MutableStorage;
pub use storage::{PreparedBlock, Storage};
pub use temporary_wsv::{StatefulError, TemporaryWsv};

/// Parent hash of the genesis block: the all-zero hash.
pub const GENESIS_PARENT_HASH: shared_types::Hash = [0u8; 32];
