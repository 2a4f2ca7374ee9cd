//! # Status Publisher
//!
//! The publishing side of the status bus.

use tokio::sync::broadcast;
use tracing::debug;

use shared_types::{hex_hash, TransactionStatus};

use crate::subscriber::{StatusFilter, StatusStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Multi-producer, multi-consumer broadcast of transaction statuses.
///
/// Built on `tokio::sync::broadcast`: every subscriber observes every
/// published status in publish order, filtered client-side by its
/// [`StatusFilter`]. Suitable for single-node operation; nothing here
/// crosses a process boundary.
pub struct StatusBus {
    /// Broadcast sender for statuses.
    sender: broadcast::Sender<TransactionStatus>,

    /// Channel capacity.
    capacity: usize,
}

impl StatusBus {
    /// Create a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with a specific per-subscriber buffer capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Publish a status to every live subscriber.
    ///
    /// Returns the number of subscribers the status reached. A bus with no
    /// subscribers drops the status; the status cache, not the bus, is the
    /// authoritative record.
    pub fn publish(&self, status: TransactionStatus) -> usize {
        let hash = hex_hash(&status.tx_hash);
        let code = status.status;
        match self.sender.send(status) {
            Ok(receivers) => {
                debug!(tx = %hash, status = ?code, receivers, "Status published");
                receivers
            }
            Err(_) => {
                debug!(tx = %hash, status = ?code, "Status dropped (no subscribers)");
                0
            }
        }
    }

    /// Subscribe to statuses matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: StatusFilter) -> Subscription {
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Subscribe and wrap the subscription as a `Stream`.
    #[must_use]
    pub fn status_stream(&self, filter: StatusFilter) -> StatusStream {
        StatusStream::new(self.subscribe(filter))
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Per-subscriber buffer capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for StatusBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StatusBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
