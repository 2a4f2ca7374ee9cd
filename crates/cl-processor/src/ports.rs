//! Outbound (driven) ports of the transaction processor.
//!
//! Dependencies on the ordering and multi-signature collaborators, expressed
//! as traits so the runtime wires concrete adapters and tests wire mocks.

use async_trait::async_trait;
use shared_types::Transaction;

/// The ordering collaborator: totally orders batches into proposals.
#[async_trait]
pub trait OrderingGate: Send + Sync {
    /// Hand a quorum-complete batch to ordering.
    ///
    /// Transport failures are the collaborator's concern; it logs and
    /// retries on its own schedule, so propagation itself is infallible.
    async fn propagate_batch(&self, batch: Vec<Transaction>);
}

/// The multi-signature collaborator: accumulates signatures across peers
/// until a batch meets quorum or expires.
#[async_trait]
pub trait MstGate: Send + Sync {
    /// Hand a signature-incomplete batch to the MST subsystem.
    async fn propagate_batch(&self, batch: Vec<Transaction>);
}
