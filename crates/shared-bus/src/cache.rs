//! # Status Cache
//!
//! The authoritative last-known status per transaction hash. Writes are
//! monotonic: an update lands only when its ordinal is strictly greater than
//! the cached one, so stale re-deliveries from concurrent publishers never
//! regress a transaction's visible status.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use shared_types::{hex_hash, Hash, TransactionStatus};

/// Monotonic per-hash status records.
///
/// The read-compare-write for one hash happens under the map lock, which is
/// the per-hash critical section: two publishers racing on the same hash
/// serialize here and the larger ordinal wins regardless of arrival order.
#[derive(Debug, Default)]
pub struct StatusCache {
    entries: Mutex<HashMap<Hash, TransactionStatus>>,
}

impl StatusCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an update if it advances the cached ordinal.
    ///
    /// Returns `true` when the cache changed. Equal ordinals are dismissed
    /// too: re-delivering the current status is a no-op.
    pub fn insert_if_newer(&self, status: TransactionStatus) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(&status.tx_hash) {
            Some(cached) if status.status <= cached.status => {
                debug!(
                    tx = %hex_hash(&status.tx_hash),
                    cached = ?cached.status,
                    received = ?status.status,
                    "Dismissed stale status"
                );
                false
            }
            _ => {
                entries.insert(status.tx_hash, status);
                true
            }
        }
    }

    /// Last-known status for a hash, if any.
    #[must_use]
    pub fn find(&self, hash: &Hash) -> Option<TransactionStatus> {
        self.entries.lock().get(hash).cloned()
    }

    /// True if the hash has ever been recorded.
    #[must_use]
    pub fn contains(&self, hash: &Hash) -> bool {
        self.entries.lock().contains_key(hash)
    }

    /// Number of tracked hashes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
