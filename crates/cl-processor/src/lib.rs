//! # Transaction Processor
//!
//! Routes incoming batches toward ordering or multi-signature collection and
//! translates the pipeline's external events (verified proposals, commits,
//! MST lifecycle) into status publications.
//!
//! The ordering and MST collaborators are injected as trait objects; there
//! is no process-wide dispatch state. Status emissions for one processing
//! round are serialized through one critical section so two statuses from
//! the same round for the same hash cannot interleave out of order.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod ports;
pub mod processor;

pub use events::{CommitOutcome, TransactionError, VerifiedProposal};
pub use ports::{MstGate, OrderingGate};
pub use processor::TransactionProcessor;
