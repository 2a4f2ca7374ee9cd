//! # Processor Core
//!
//! Batch routing plus the three inbound event handlers. Every handler
//! publishes its round's statuses while holding the round lock; handlers
//! are invoked from the collaborators' own execution contexts, decoupled
//! from the RPC-serving tasks.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use shared_bus::StatusBus;
use shared_types::{hex_hash, Hash, StatusDetail, Transaction, TransactionStatus};

use crate::events::{CommitOutcome, VerifiedProposal};
use crate::ports::{MstGate, OrderingGate};

/// Orchestrates batches through signature-completeness checks and republishes
/// pipeline events as statuses.
pub struct TransactionProcessor {
    ordering: Arc<dyn OrderingGate>,
    mst: Arc<dyn MstGate>,
    status_bus: Arc<StatusBus>,
    /// Serializes status emissions of one processing round.
    round_lock: Mutex<()>,
}

impl TransactionProcessor {
    /// Wire the processor to its collaborators and the status bus.
    #[must_use]
    pub fn new(
        ordering: Arc<dyn OrderingGate>,
        mst: Arc<dyn MstGate>,
        status_bus: Arc<StatusBus>,
    ) -> Self {
        Self {
            ordering,
            mst,
            status_bus,
            round_lock: Mutex::new(()),
        }
    }

    /// Handle one transaction as a singleton batch.
    pub async fn handle_transaction(&self, tx: Transaction) {
        self.handle_batch(vec![tx]).await;
    }

    /// Route a newly assembled batch.
    ///
    /// Quorum-complete batches go to ordering and every member is reported
    /// as `EnoughSignaturesCollected`; incomplete ones go to the MST
    /// collaborator, which reports progress through its own events.
    pub async fn handle_batch(&self, batch: Vec<Transaction>) {
        if batch.is_empty() {
            return;
        }
        let complete = batch.iter().all(Transaction::has_enough_signatures);
        if complete {
            let hashes: Vec<Hash> = batch.iter().map(Transaction::hash).collect();
            info!(txs = hashes.len(), "batch complete, propagating to ordering");
            self.ordering.propagate_batch(batch).await;
            let _round = self.round_lock.lock();
            for hash in hashes {
                self.status_bus
                    .publish(TransactionStatus::enough_signatures(hash));
            }
        } else {
            info!("batch below quorum, waiting for signatures");
            self.mst.propagate_batch(batch).await;
        }
    }

    /// Stateful validation finished for a proposal.
    pub fn handle_verified_proposal(&self, proposal: &VerifiedProposal) {
        let _round = self.round_lock.lock();
        for error in &proposal.rejected {
            debug!(tx = %hex_hash(&error.tx_hash), "stateful validation failed");
            self.status_bus.publish(TransactionStatus::stateful_failed(
                error.tx_hash,
                StatusDetail {
                    message: error.message.clone(),
                    command_name: Some(error.command_name.clone()),
                    command_index: Some(error.command_index),
                    error_code: Some(error.error_code),
                },
            ));
        }
        for hash in &proposal.valid_hashes {
            debug!(tx = %hex_hash(hash), "stateful validation success");
            self.status_bus
                .publish(TransactionStatus::stateful_success(*hash));
        }
    }

    /// A block was committed.
    pub fn handle_commit(&self, outcome: &CommitOutcome) {
        let _round = self.round_lock.lock();
        for hash in &outcome.rejected_hashes {
            debug!(tx = %hex_hash(hash), "transaction rejected by committed block");
            self.status_bus.publish(TransactionStatus::rejected(*hash));
        }
        for hash in &outcome.committed_hashes {
            debug!(tx = %hex_hash(hash), "transaction committed");
            self.status_bus.publish(TransactionStatus::committed(*hash));
        }
    }

    /// The MST state gained signatures; every contained transaction is
    /// still pending. Re-emitted on each new partial signature.
    pub fn handle_mst_state_updated(&self, hashes: &[Hash]) {
        let _round = self.round_lock.lock();
        for hash in hashes {
            self.status_bus
                .publish(TransactionStatus::mst_pending(*hash));
        }
    }

    /// An MST batch reached quorum: forward to ordering and report.
    pub async fn handle_mst_prepared(&self, batch: Vec<Transaction>) {
        let hashes: Vec<Hash> = batch.iter().map(Transaction::hash).collect();
        info!(txs = hashes.len(), "MST batch prepared, propagating to ordering");
        self.ordering.propagate_batch(batch).await;
        let _round = self.round_lock.lock();
        for hash in hashes {
            self.status_bus
                .publish(TransactionStatus::enough_signatures(hash));
        }
    }

    /// An MST batch timed out before reaching quorum.
    pub fn handle_mst_expired(&self, hashes: &[Hash]) {
        let _round = self.round_lock.lock();
        for hash in hashes {
            info!(tx = %hex_hash(hash), "MST batch expired");
            self.status_bus
                .publish(TransactionStatus::mst_expired(*hash));
        }
    }
}
