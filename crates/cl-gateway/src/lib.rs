//! # Command Service Gateway
//!
//! The client-facing facade of the node, transport-agnostic:
//!
//! - `submit_transaction` / `submit_transaction_list` - ingress with
//!   stateless validation and duplicate suppression
//! - `get_status` - point status lookup, falling back to the durable ledger
//! - `stream_status` - streaming status with two-stage bounded waits
//!
//! A transport layer (gRPC, HTTP) is expected to wrap these calls; nothing
//! in here knows about wire formats beyond the submitted payload bytes.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod service;
pub mod validation;
pub mod writer;

pub use service::{CommandService, GatewayConfig};
pub use validation::{DefaultStatelessValidator, StatelessValidator};
pub use writer::{BufferWriter, StatusWriter, WriteError};
