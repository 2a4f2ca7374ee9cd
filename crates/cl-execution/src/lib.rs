//! # Command Execution
//!
//! Validates and applies single ledger commands against the world state.
//! Two independent phases per command:
//!
//! - [`validate`]: authorization plus cheap preconditions, read-only.
//!   Authorization is two-tier: the creator's roles grant the command's
//!   any-account permission, or the target account granted the creator a
//!   matching scoped permission.
//! - [`execute`]: re-checks domain invariants atomically with mutation
//!   (referential existence, signatory-count vs quorum, balance arithmetic
//!   at the asset's exact precision, no overflow) so no time-of-check /
//!   time-of-use gap exists inside a block's unit of work.
//!
//! Failures are values; a failing command aborts only its containing block.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod errors;
pub mod executor;
pub mod validator;

pub use errors::{ExecutionError, ExecutionErrorCode};
pub use executor::execute;
pub use validator::validate;
