//! Command-level failure values.

use cl_state::WsvError;
use thiserror::Error;

/// Stable numeric codes carried in stateful-failure statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ExecutionErrorCode {
    PermissionDenied = 1,
    NotFound = 2,
    AlreadyExists = 3,
    PrecisionMismatch = 4,
    Overflow = 5,
    NotEnoughBalance = 6,
    InvariantViolation = 7,
    MissingCreator = 8,
}

/// Failure of one command, returned as a value and aggregated into the
/// block's all-or-nothing outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{command_name}: {message}")]
pub struct ExecutionError {
    /// Name of the failing command.
    pub command_name: &'static str,
    /// Stable error code.
    pub code: ExecutionErrorCode,
    /// Human-readable reason.
    pub message: String,
}

impl ExecutionError {
    /// Build an error for a command.
    #[must_use]
    pub fn new(
        command_name: &'static str,
        code: ExecutionErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            command_name,
            code,
            message: message.into(),
        }
    }

    /// Fold a world-state constraint failure into a command failure.
    #[must_use]
    pub fn from_wsv(command_name: &'static str, err: WsvError) -> Self {
        let code = match &err {
            WsvError::AccountNotFound { .. }
            | WsvError::DomainNotFound { .. }
            | WsvError::AssetNotFound { .. }
            | WsvError::RoleNotFound { .. }
            | WsvError::PeerNotFound { .. }
            | WsvError::SignatoryNotFound { .. }
            | WsvError::SignatoryNotAttached { .. }
            | WsvError::RoleNotAttached { .. }
            | WsvError::GrantNotFound { .. } => ExecutionErrorCode::NotFound,
            WsvError::AccountAlreadyExists { .. }
            | WsvError::DomainAlreadyExists { .. }
            | WsvError::AssetAlreadyExists { .. }
            | WsvError::RoleAlreadyExists { .. }
            | WsvError::RoleAlreadyAttached { .. }
            | WsvError::PeerAlreadyExists { .. }
            | WsvError::SignatoryAlreadyAttached { .. }
            | WsvError::GrantAlreadyPresent { .. } => ExecutionErrorCode::AlreadyExists,
            WsvError::SignatoryStillReferenced { .. } => ExecutionErrorCode::InvariantViolation,
        };
        Self {
            command_name,
            code,
            message: err.to_string(),
        }
    }
}
