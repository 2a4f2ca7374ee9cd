//! # Command Service
//!
//! Accepts signed transactions, deduplicates resubmissions, and serves point
//! and streaming status queries backed by the status cache, the status bus
//! and the durable ledger.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, warn};

use cl_processor::TransactionProcessor;
use cl_storage::Storage;
use shared_bus::{StatusBus, StatusCache, StatusFilter};
use shared_types::{hex_hash, Hash, Transaction, TransactionStatus, TxStatus};

use crate::validation::StatelessValidator;
use crate::writer::StatusWriter;

/// Gateway timing knobs.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// How long a status stream waits for processing to start at all.
    pub initial_wait: Duration,
    /// One ordering round; the stream's second wait is twice this.
    pub round_period: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            initial_wait: Duration::from_secs(1),
            round_period: Duration::from_secs(3),
        }
    }
}

/// The client-facing command facade.
pub struct CommandService {
    processor: Arc<TransactionProcessor>,
    storage: Arc<Storage>,
    status_bus: Arc<StatusBus>,
    cache: Arc<StatusCache>,
    validator: Arc<dyn StatelessValidator>,
    config: GatewayConfig,
}

impl CommandService {
    /// Wire the service to its collaborators.
    #[must_use]
    pub fn new(
        processor: Arc<TransactionProcessor>,
        storage: Arc<Storage>,
        status_bus: Arc<StatusBus>,
        cache: Arc<StatusCache>,
        validator: Arc<dyn StatelessValidator>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            processor,
            storage,
            status_bus,
            cache,
            validator,
            config,
        }
    }

    /// Mirror every published status into the cache, monotonically.
    ///
    /// One listener per service instance; it ends when the bus is dropped.
    pub fn spawn_status_listener(&self) -> JoinHandle<()> {
        let mut subscription = self.status_bus.subscribe(StatusFilter::all());
        let cache = Arc::clone(&self.cache);
        tokio::spawn(async move {
            while let Some(status) = subscription.recv().await {
                cache.insert_if_newer(status);
            }
        })
    }

    /// Accept one signed transaction, submitted as serialized bytes.
    pub async fn submit_transaction(&self, bytes: &[u8]) {
        match bincode::deserialize::<Transaction>(bytes) {
            Ok(tx) => match self.validator.validate(&tx) {
                Ok(()) => self.accept("submit", tx).await,
                Err(reason) => self.reject_raw("submit", bytes, reason),
            },
            Err(e) => self.reject_raw("submit", bytes, format!("malformed transaction: {e}")),
        }
    }

    /// Accept a transaction sequence, validated as one unit.
    ///
    /// A sequence failure records one composed message, naming the first and
    /// last member hashes, as the failure reason of every member.
    pub async fn submit_transaction_list(&self, items: &[Vec<u8>]) {
        if items.is_empty() {
            return;
        }

        let mut decoded = Vec::with_capacity(items.len());
        let mut failure = None;
        for bytes in items {
            match bincode::deserialize::<Transaction>(bytes) {
                Ok(tx) => decoded.push(tx),
                Err(e) => {
                    failure = Some(format!("malformed transaction: {e}"));
                    break;
                }
            }
        }
        let failure =
            failure.or_else(|| self.validator.validate_sequence(&decoded).err());

        if let Some(reason) = failure {
            let first = raw_hash(&items[0]);
            let last = raw_hash(items.last().map(Vec::as_slice).unwrap_or_default());
            let sequence_error = format!(
                "Stateless invalid tx in transaction sequence: {reason}, \
                 hash of the first: {}, hash of the last: {}",
                hex_hash(&first),
                hex_hash(&last)
            );
            for bytes in items {
                let hash = raw_hash(bytes);
                self.record(
                    "submit_list",
                    TransactionStatus::stateless_failed(hash, sequence_error.clone()),
                );
            }
            return;
        }

        for tx in decoded {
            self.accept("submit_list", tx).await;
        }
    }

    /// Last-known status, consulting the durable ledger on a cache miss.
    /// Either answer is populated into the cache; a `NotReceived` record
    /// has the minimal ordinal and never blocks later progress.
    #[must_use]
    pub fn get_status(&self, hash: &Hash) -> TransactionStatus {
        if let Some(cached) = self.cache.find(hash) {
            return cached;
        }
        let status = if self.storage.has_transaction(hash) {
            TransactionStatus::committed(*hash)
        } else {
            warn!(tx = %hex_hash(hash), "asked non-existing tx");
            TransactionStatus::not_received(*hash)
        };
        self.cache.insert_if_newer(status.clone());
        status
    }

    /// Stream statuses for one hash until a terminal status or a bound.
    ///
    /// The cached status is flushed immediately; the stream then forwards
    /// bus updates. If nothing is known after `initial_wait`, the stream
    /// concludes `NotReceived`. Otherwise it waits up to two ordering
    /// rounds and finally reports the best-known cached status, terminal or
    /// not. Every exit path (terminal delivery, timeout, failed write)
    /// drops the subscription.
    pub async fn stream_status<W: StatusWriter>(&self, hash: Hash, writer: &mut W) {
        // Subscribe before flushing the cache so no update slips between.
        let mut subscription = self.status_bus.subscribe(StatusFilter::hash(hash));

        debug!(tx = %hex_hash(&hash), "status stream opened");

        if let Some(cached) = self.cache.find(&hash) {
            let terminal = cached.is_terminal();
            if writer.write(cached).is_err() {
                return;
            }
            if terminal {
                return;
            }
        }

        // Stage one: give processing a short window to surface anything.
        match timeout(self.config.initial_wait, subscription.recv()).await {
            Ok(Some(status)) => {
                let terminal = status.is_terminal();
                if writer.write(status).is_err() {
                    return;
                }
                if terminal {
                    return;
                }
            }
            Ok(None) => {
                // Bus gone; the cache is all there will ever be.
                if let Some(best) = self.cache.find(&hash) {
                    let _ = writer.write(best);
                }
                return;
            }
            Err(_) => {
                if self.cache.find(&hash).is_none() {
                    warn!(tx = %hex_hash(&hash), "status stream timed out, not received");
                    let _ = writer.write(TransactionStatus::not_received(hash));
                    return;
                }
            }
        }

        // Stage two: processing has started; allow up to two rounds.
        let deadline = Instant::now() + 2 * self.config.round_period;
        loop {
            match timeout_at(deadline, subscription.recv()).await {
                Ok(Some(status)) => {
                    let terminal = status.is_terminal();
                    if writer.write(status).is_err() {
                        return;
                    }
                    if terminal {
                        return;
                    }
                }
                Ok(None) | Err(_) => break,
            }
        }

        // Report the best-known status, possibly non-terminal, and close.
        if let Some(best) = self.cache.find(&hash) {
            debug!(tx = %hex_hash(&hash), status = ?best.status, "stream closing with best-known status");
            let _ = writer.write(best);
        }
    }

    async fn accept(&self, who: &str, tx: Transaction) {
        let hash = tx.hash();
        // A cached NotReceived comes from a status query that raced the
        // submission; it marks no prior processing and never dedupes.
        if let Some(cached) = self
            .cache
            .find(&hash)
            .filter(|cached| cached.status != TxStatus::NotReceived)
        {
            if tx.quorum() < 2 {
                warn!(who, tx = %hex_hash(&hash), "found transaction in cache, ignoring");
                return;
            }
            if cached.status == TxStatus::MstPending {
                // A multi-signature resubmission; surface the pending state
                // again so late subscribers observe progress.
                self.status_bus.publish(cached);
            }
        }
        self.record(who, TransactionStatus::stateless_success(hash));
        self.processor.handle_transaction(tx).await;
    }

    fn reject_raw(&self, who: &str, bytes: &[u8], reason: String) {
        // The transaction cannot be hashed the normal way; derive its
        // identity from the raw payload bytes.
        let hash = raw_hash(bytes);
        warn!(who, tx = %hex_hash(&hash), reason = %reason, "stateless invalid tx");
        self.record(who, TransactionStatus::stateless_failed(hash, reason));
    }

    fn record(&self, who: &str, status: TransactionStatus) {
        debug!(
            who,
            tx = %hex_hash(&status.tx_hash),
            status = ?status.status,
            "recording status"
        );
        self.cache.insert_if_newer(status.clone());
        self.status_bus.publish(status);
    }
}

fn raw_hash(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}
