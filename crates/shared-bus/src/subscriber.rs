//! # Status Subscriber
//!
//! The subscription side of the status bus.

use std::pin::Pin;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

use shared_types::{Hash, TransactionStatus};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The status bus was dropped.
    #[error("Status bus closed")]
    Closed,
}

/// Client-side filter applied to every received status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFilter {
    /// Hashes to include. Empty means all hashes.
    pub hashes: Vec<Hash>,
}

impl StatusFilter {
    /// Accept every status.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept only statuses for one transaction hash.
    #[must_use]
    pub fn hash(hash: Hash) -> Self {
        Self { hashes: vec![hash] }
    }

    /// True if a status passes this filter.
    #[must_use]
    pub fn matches(&self, status: &TransactionStatus) -> bool {
        self.hashes.is_empty() || self.hashes.contains(&status.tx_hash)
    }
}

/// A handle receiving statuses that match its filter.
///
/// Dropping the subscription detaches it from the bus; that is the only
/// teardown step, so every exit path (terminal delivery, timeout, client
/// disconnect) releases the slot by letting the handle go out of scope.
pub struct Subscription {
    receiver: broadcast::Receiver<TransactionStatus>,
    filter: StatusFilter,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<TransactionStatus>,
        filter: StatusFilter,
    ) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next status matching the filter.
    ///
    /// Returns `None` when the bus has been dropped. A lagged subscriber
    /// skips the overwritten statuses and keeps receiving; the status cache
    /// covers anything missed here.
    pub async fn recv(&mut self) -> Option<TransactionStatus> {
        loop {
            let status = match self.receiver.recv().await {
                Ok(s) => s,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, statuses dropped");
                    continue;
                }
            };
            if self.filter.matches(&status) {
                return Some(status);
            }
        }
    }

    /// Try to receive without blocking.
    ///
    /// `Ok(None)` means no matching status is currently buffered.
    pub fn try_recv(&mut self) -> Result<Option<TransactionStatus>, SubscriptionError> {
        loop {
            let status = match self.receiver.try_recv() {
                Ok(s) => s,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };
            if self.filter.matches(&status) {
                return Ok(Some(status));
            }
        }
    }

    /// The filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &StatusFilter {
        &self.filter
    }
}

/// A stream wrapper for subscriptions, for use with stream combinators.
pub struct StatusStream {
    subscription: Subscription,
}

impl StatusStream {
    /// Wrap a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }
}

impl Stream for StatusStream {
    type Item = TransactionStatus;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.subscription.try_recv() {
            Ok(Some(status)) => Poll::Ready(Some(status)),
            Ok(None) => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(SubscriptionError::Closed) => Poll::Ready(None),
        }
    }
}
