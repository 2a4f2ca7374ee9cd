//! # Concord Ledger Test Suite
//!
//! Cross-subsystem integration tests. Unit tests live beside the code they
//! exercise in each crate; everything here spans at least two subsystems or
//! drives the full submit-to-commit pipeline.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod fixtures;

#[cfg(test)]
mod integration;
