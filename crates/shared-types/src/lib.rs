//! # Shared Types Crate
//!
//! This crate contains all domain entities shared across the Concord Ledger
//! subsystems: identifiers, fixed-point amounts, world-state entities, the
//! closed command set, transactions, blocks, and transaction statuses.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **Closed sums**: commands, permissions, and statuses are closed enums
//!   with exhaustive matching downstream; adding a variant is a breaking
//!   change for every consumer.
//! - **Value semantics**: entities are plain data. All mutation goes through
//!   the world-state store; nothing here holds interior mutability.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod amount;
pub mod block;
pub mod command;
pub mod entities;
pub mod ids;
pub mod permissions;
pub mod status;
pub mod transaction;

pub use amount::{Amount, AmountParseError};
pub use block::Block;
pub use command::Command;
pub use entities::{Account, AccountAsset, Asset, Domain, Peer};
pub use ids::{AccountId, AssetId, DomainId, IdParseError, RoleId};
pub use permissions::{GrantablePermission, Permission, RolePermissionSet};
pub use status::{StatusDetail, TransactionStatus, TxStatus};
pub use transaction::{BatchMeta, Transaction, TransactionPayload, TransactionSignature};

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// Unix timestamp in milliseconds since epoch.
pub type Timestamp = u64;

/// Render a hash as lowercase hex for logs and error messages.
#[must_use]
pub fn hex_hash(hash: &Hash) -> String {
    hex::encode(hash)
}
