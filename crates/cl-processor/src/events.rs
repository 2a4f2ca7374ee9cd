//! Inbound pipeline event payloads.
//!
//! These are the abstract events the processor consumes from the ordering
//! and validation collaborators; the collaborators themselves live outside
//! this crate.

use shared_types::Hash;

/// Stateful rejection detail for one transaction of a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionError {
    /// The rejected transaction.
    pub tx_hash: Hash,
    /// Name of the failing command.
    pub command_name: String,
    /// Index of the failing command within the transaction.
    pub command_index: u32,
    /// Stable error code.
    pub error_code: u32,
    /// Human-readable reason.
    pub message: String,
}

/// Outcome of stateful validation of one proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedProposal {
    /// Transactions that passed stateful validation.
    pub valid_hashes: Vec<Hash>,
    /// Transactions rejected, with per-command detail.
    pub rejected: Vec<TransactionError>,
}

/// Outcome of a commit round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Transactions contained in the committed block.
    pub committed_hashes: Vec<Hash>,
    /// Transactions the committed block explicitly lists as rejected.
    pub rejected_hashes: Vec<Hash>,
}
