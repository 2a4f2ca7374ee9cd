//! # Status Writers
//!
//! The seam between the streaming status query and its transport. A failed
//! write means the client is gone; the stream handler treats it as the
//! disconnect signal and tears the subscription down.

use thiserror::Error;

use shared_types::TransactionStatus;

/// The client vanished mid-stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("client disconnected")]
pub struct WriteError;

/// Sink for one client's status stream.
pub trait StatusWriter: Send {
    /// Deliver one status to the client.
    ///
    /// # Errors
    ///
    /// [`WriteError`] when the client connection is no longer writable.
    fn write(&mut self, status: TransactionStatus) -> Result<(), WriteError>;
}

/// An in-memory writer collecting delivered statuses.
///
/// Used by tests and diagnostics; `fail_after` simulates a client that
/// disconnects after receiving a number of statuses.
#[derive(Debug, Default)]
pub struct BufferWriter {
    /// Statuses delivered so far.
    pub statuses: Vec<TransactionStatus>,
    /// When set, writes beyond this count fail.
    pub fail_after: Option<usize>,
}

impl BufferWriter {
    /// A writer that never fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer that disconnects after `count` successful writes.
    #[must_use]
    pub fn failing_after(count: usize) -> Self {
        Self {
            statuses: Vec::new(),
            fail_after: Some(count),
        }
    }
}

impl StatusWriter for BufferWriter {
    fn write(&mut self, status: TransactionStatus) -> Result<(), WriteError> {
        if let Some(limit) = self.fail_after {
            if self.statuses.len() >= limit {
                return Err(WriteError);
            }
        }
        self.statuses.push(status);
        Ok(())
    }
}
