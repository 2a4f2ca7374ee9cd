//! # Shared Bus - Transaction Status Distribution
//!
//! The status bus is the single channel through which the transaction
//! processor reports lifecycle transitions and through which the command
//! service serves streaming status queries.
//!
//! ```text
//! ┌─────────────────┐                      ┌──────────────────┐
//! │ Tx Processor    │                      │ Command Service  │
//! │                 │      publish()       │  (per client)    │
//! │                 │ ──────┐              └──────────────────┘
//! └─────────────────┘       │                      ↑
//!                           ▼                      │
//!                     ┌──────────────┐             │
//!                     │  Status Bus  │ ────────────┘
//!                     │              │   subscribe(filter)
//!                     └──────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Any number of independent subscribers; each receives every published
//!   status matching its filter, in publish order.
//! - Dropping a [`Subscription`] tears it down; there is no other
//!   unsubscribe step to forget.
//! - The [`StatusCache`] is monotonic per hash: an update is applied only
//!   when its ordinal is strictly greater than the cached one.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod cache;
pub mod publisher;
pub mod subscriber;

pub use cache::StatusCache;
pub use publisher::StatusBus;
pub use subscriber::{StatusFilter, StatusStream, Subscription, SubscriptionError};

/// Maximum statuses to buffer per subscriber before lag drops the oldest.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
