//! # Transaction Statuses
//!
//! The transaction lifecycle is a closed, totally ordered set of codes. The
//! numeric order below is a compatibility contract: the status cache accepts
//! an update only when its ordinal is strictly greater than the cached one,
//! so stale re-deliveries never regress a transaction's visible status.

use serde::{Deserialize, Serialize};

use crate::Hash;

/// Lifecycle codes in ascending ordinal order.
///
/// The derived `Ord` follows declaration order and is the monotonicity
/// contract; do not reorder variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum TxStatus {
    NotReceived = 0,
    StatelessValidationFailed = 1,
    StatelessValidationSuccess = 2,
    MstExpired = 3,
    MstPending = 4,
    EnoughSignaturesCollected = 5,
    StatefulValidationFailed = 6,
    StatefulValidationSuccess = 7,
    Rejected = 8,
    Committed = 9,
}

impl TxStatus {
    /// Position in the total order.
    #[must_use]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Terminal codes end the lifecycle; streams close after delivering one.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TxStatus::StatelessValidationFailed
                | TxStatus::MstExpired
                | TxStatus::StatefulValidationFailed
                | TxStatus::Rejected
                | TxStatus::Committed
        )
    }
}

/// Structured failure detail attached to a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetail {
    /// Human-readable reason.
    pub message: String,
    /// Name of the failing command, for stateful failures.
    pub command_name: Option<String>,
    /// Index of the failing command within its transaction.
    pub command_index: Option<u32>,
    /// Numeric error code, for stateful failures.
    pub error_code: Option<u32>,
}

impl StatusDetail {
    /// Detail carrying only a reason message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            command_name: None,
            command_index: None,
            error_code: None,
        }
    }
}

/// One status report for one transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatus {
    /// The transaction this status is about.
    pub tx_hash: Hash,
    /// Lifecycle code.
    pub status: TxStatus,
    /// Optional failure detail.
    pub error: Option<StatusDetail>,
}

impl TransactionStatus {
    /// A bare status with no error detail.
    #[must_use]
    pub fn new(tx_hash: Hash, status: TxStatus) -> Self {
        Self {
            tx_hash,
            status,
            error: None,
        }
    }

    #[must_use]
    pub fn not_received(tx_hash: Hash) -> Self {
        Self::new(tx_hash, TxStatus::NotReceived)
    }

    #[must_use]
    pub fn stateless_success(tx_hash: Hash) -> Self {
        Self::new(tx_hash, TxStatus::StatelessValidationSuccess)
    }

    #[must_use]
    pub fn stateless_failed(tx_hash: Hash, reason: impl Into<String>) -> Self {
        Self {
            tx_hash,
            status: TxStatus::StatelessValidationFailed,
            error: Some(StatusDetail::message(reason)),
        }
    }

    #[must_use]
    pub fn mst_pending(tx_hash: Hash) -> Self {
        Self::new(tx_hash, TxStatus::MstPending)
    }

    #[must_use]
    pub fn mst_expired(tx_hash: Hash) -> Self {
        Self::new(tx_hash, TxStatus::MstExpired)
    }

    #[must_use]
    pub fn enough_signatures(tx_hash: Hash) -> Self {
        Self::new(tx_hash, TxStatus::EnoughSignaturesCollected)
    }

    #[must_use]
    pub fn stateful_success(tx_hash: Hash) -> Self {
        Self::new(tx_hash, TxStatus::StatefulValidationSuccess)
    }

    #[must_use]
    pub fn stateful_failed(tx_hash: Hash, detail: StatusDetail) -> Self {
        Self {
            tx_hash,
            status: TxStatus::StatefulValidationFailed,
            error: Some(detail),
        }
    }

    #[must_use]
    pub fn rejected(tx_hash: Hash) -> Self {
        Self::new(tx_hash, TxStatus::Rejected)
    }

    #[must_use]
    pub fn committed(tx_hash: Hash) -> Self {
        Self::new(tx_hash, TxStatus::Committed)
    }

    /// True once this status ends the lifecycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_order_matches_contract() {
        let expected = [
            TxStatus::NotReceived,
            TxStatus::StatelessValidationFailed,
            TxStatus::StatelessValidationSuccess,
            TxStatus::MstExpired,
            TxStatus::MstPending,
            TxStatus::EnoughSignaturesCollected,
            TxStatus::StatefulValidationFailed,
            TxStatus::StatefulValidationSuccess,
            TxStatus::Rejected,
            TxStatus::Committed,
        ];
        for (i, status) in expected.iter().enumerate() {
            assert_eq!(status.ordinal() as usize, i);
        }
        let mut sorted = expected;
        sorted.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn terminal_set_is_exact() {
        let terminal = [
            TxStatus::StatelessValidationFailed,
            TxStatus::MstExpired,
            TxStatus::StatefulValidationFailed,
            TxStatus::Rejected,
            TxStatus::Committed,
        ];
        for status in [
            TxStatus::NotReceived,
            TxStatus::StatelessValidationSuccess,
            TxStatus::MstPending,
            TxStatus::EnoughSignaturesCollected,
            TxStatus::StatefulValidationSuccess,
        ] {
            assert!(!status.is_terminal());
        }
        for status in terminal {
            assert!(status.is_terminal());
        }
    }
}
