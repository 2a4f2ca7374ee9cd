//! # Concord Ledger Node Runtime
//!
//! Wires the ledger subsystems into a running node:
//!
//! - `config` - unified configuration with defaults and validation
//! - `genesis` - first-block assembly for fresh chains
//! - `adapters` - in-process ordering and MST collaborators
//! - `container` - dependency-ordered construction and task ownership
//!
//! The pipeline, end to end:
//!
//! ```text
//! client bytes ──► CommandService ──► TransactionProcessor ──┬─► OrderingGate ─► round loop
//!                                                            └─► MstGate ─► signature loop
//!                      round loop ──► Storage (apply + commit) ──► statuses ──► StatusBus
//!                                     clients ◄── get_status / stream_status ◄──┘
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod config;
pub mod container;
pub mod genesis;

pub use config::NodeConfig;
pub use container::Node;
pub use genesis::GenesisBuilder;
