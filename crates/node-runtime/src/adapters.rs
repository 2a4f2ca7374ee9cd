//! # In-Process Collaborator Adapters
//!
//! Stand-ins for the external ordering and multi-signature collaborators,
//! good for a single-node deployment and for exercising the pipeline end to
//! end. Both gates enqueue onto a loop task; the loops call back into the
//! transaction processor the same way remote collaborators would.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{error, info, warn};

use cl_processor::{
    CommitOutcome, MstGate, OrderingGate, TransactionError, TransactionProcessor,
    VerifiedProposal,
};
use cl_storage::Storage;
use shared_types::{Block, Hash, Timestamp, Transaction};

/// Current wall-clock time in milliseconds.
#[must_use]
pub fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as Timestamp
}

/// Ordering gate that feeds an in-process ordering loop.
pub struct DirectOrderingGate {
    sender: mpsc::UnboundedSender<Vec<Transaction>>,
}

impl DirectOrderingGate {
    /// Create the gate and the receiving end for the loop.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Vec<Transaction>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl OrderingGate for DirectOrderingGate {
    async fn propagate_batch(&self, batch: Vec<Transaction>) {
        if self.sender.send(batch).is_err() {
            warn!("ordering loop is gone, batch dropped");
        }
    }
}

/// MST gate that feeds an in-process signature-collection loop.
pub struct InProcessMstGate {
    sender: mpsc::UnboundedSender<Vec<Transaction>>,
}

impl InProcessMstGate {
    /// Create the gate and the receiving end for the loop.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Vec<Transaction>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl MstGate for InProcessMstGate {
    async fn propagate_batch(&self, batch: Vec<Transaction>) {
        if self.sender.send(batch).is_err() {
            warn!("MST loop is gone, batch dropped");
        }
    }
}

/// One ordering round per received batch: stateful validation against a
/// temporary snapshot, then block assembly, apply and commit.
pub async fn run_ordering_loop(
    mut batches: mpsc::UnboundedReceiver<Vec<Transaction>>,
    storage: Arc<Storage>,
    processor: Arc<TransactionProcessor>,
) {
    while let Some(batch) = batches.recv().await {
        run_round(&storage, &processor, batch);
    }
    info!("ordering loop stopped");
}

fn run_round(storage: &Storage, processor: &TransactionProcessor, batch: Vec<Transaction>) {
    let mut temp = storage.create_temporary_wsv();
    let mut valid = Vec::new();
    let mut rejected = Vec::new();
    for tx in batch {
        let tx_hash = tx.hash();
        match temp.apply(&tx) {
            Ok(()) => valid.push(tx),
            Err(e) => rejected.push(TransactionError {
                tx_hash,
                command_name: e.source.command_name.to_owned(),
                command_index: e.command_index,
                error_code: e.source.code as u32,
                message: e.source.message.clone(),
            }),
        }
    }

    processor.handle_verified_proposal(&VerifiedProposal {
        valid_hashes: valid.iter().map(Transaction::hash).collect(),
        rejected: rejected.clone(),
    });

    if valid.is_empty() {
        return;
    }

    let committed_hashes: Vec<Hash> = valid.iter().map(Transaction::hash).collect();
    let rejected_hashes: Vec<Hash> = rejected.iter().map(|e| e.tx_hash).collect();
    let block = Block {
        height: storage.height() + 1,
        prev_hash: storage.top_hash(),
        created_at: now_millis(),
        transactions: valid,
        rejected_hashes: rejected_hashes.clone(),
    };

    let mut mutable = storage.create_mutable_storage();
    if !mutable.apply(block, |candidate, _, top| candidate.prev_hash == *top) {
        warn!("candidate block failed to apply, round dropped");
        return;
    }
    match storage.commit(mutable) {
        Ok(()) => processor.handle_commit(&CommitOutcome {
            committed_hashes,
            rejected_hashes,
        }),
        Err(e) => error!(error = %e, "commit failed"),
    }
}

/// Accumulates signatures for incomplete batches until quorum or expiry.
pub async fn run_mst_loop(
    mut batches: mpsc::UnboundedReceiver<Vec<Transaction>>,
    processor: Arc<TransactionProcessor>,
    expiry: Duration,
    sweep_interval: Duration,
) {
    let mut pending: HashMap<Hash, (Transaction, Instant)> = HashMap::new();
    let mut sweep = tokio::time::interval(sweep_interval);
    sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            received = batches.recv() => {
                let Some(batch) = received else { break };
                let mut updated = Vec::new();
                let mut ready = Vec::new();
                for tx in batch {
                    let hash = tx.hash();
                    let entry = pending.entry(hash).or_insert_with(|| {
                        (
                            Transaction {
                                payload: tx.payload.clone(),
                                signatures: Vec::new(),
                            },
                            Instant::now(),
                        )
                    });
                    for signature in tx.signatures {
                        if !entry
                            .0
                            .signatures
                            .iter()
                            .any(|s| s.public_key == signature.public_key)
                        {
                            entry.0.signatures.push(signature);
                        }
                    }
                    if entry.0.has_enough_signatures() {
                        if let Some((complete, _)) = pending.remove(&hash) {
                            ready.push(complete);
                        }
                    } else {
                        updated.push(hash);
                    }
                }
                if !updated.is_empty() {
                    processor.handle_mst_state_updated(&updated);
                }
                if !ready.is_empty() {
                    processor.handle_mst_prepared(ready).await;
                }
            }
            _ = sweep.tick() => {
                let now = Instant::now();
                let expired: Vec<Hash> = pending
                    .iter()
                    .filter(|(_, (_, since))| now.duration_since(*since) >= expiry)
                    .map(|(hash, _)| *hash)
                    .collect();
                if !expired.is_empty() {
                    pending.retain(|hash, _| !expired.contains(hash));
                    processor.handle_mst_expired(&expired);
                }
            }
        }
    }
    info!("MST loop stopped");
}
