//! # Temporary WSV
//!
//! A throwaway world-state snapshot for stateful validation of proposals.
//! Transactions are applied one at a time, each under its own savepoint:
//! validation (authorization + preconditions) runs before every command's
//! execution, and a failure rolls back only that transaction. The per-block
//! all-or-nothing rule belongs to the block applier; this type owns the
//! per-transaction rule.

use cl_execution::{execute, validate, ExecutionError, ExecutionErrorCode};
use cl_state::WorldStateView;
use shared_types::Transaction;
use thiserror::Error;
use tracing::debug;

/// Stateful rejection of one transaction: the failing command's name, its
/// index within the transaction, and the underlying execution error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("command {command_index} failed stateful validation: {source}")]
pub struct StatefulError {
    /// Index of the failing command within the transaction.
    pub command_index: u32,
    /// The command-level failure.
    #[source]
    pub source: ExecutionError,
}

/// A validation-only world state.
#[derive(Debug)]
pub struct TemporaryWsv {
    wsv: WorldStateView,
}

impl TemporaryWsv {
    /// Wrap a snapshot of the current state.
    #[must_use]
    pub fn new(wsv: WorldStateView) -> Self {
        Self { wsv }
    }

    /// Validate and apply one transaction under a savepoint.
    ///
    /// # Errors
    ///
    /// Returns the first failing command's [`StatefulError`]; the snapshot
    /// is left exactly as before the transaction.
    pub fn apply(&mut self, tx: &Transaction) -> Result<(), StatefulError> {
        let savepoint = self.wsv.clone();
        let creator = tx.payload.creator.clone();

        for (index, command) in tx.payload.commands.iter().enumerate() {
            let command_index = index as u32;
            if !validate(command, &self.wsv, &creator) {
                self.wsv = savepoint;
                debug!(command = command.name(), index, "command failed validation");
                return Err(StatefulError {
                    command_index,
                    source: ExecutionError::new(
                        command.name(),
                        ExecutionErrorCode::PermissionDenied,
                        format!("{creator} is not permitted to run this command"),
                    ),
                });
            }
            if let Err(source) = execute(command, &mut self.wsv, Some(&creator)) {
                self.wsv = savepoint;
                debug!(command = command.name(), index, error = %source, "command failed execution");
                return Err(StatefulError {
                    command_index,
                    source,
                });
            }
        }
        Ok(())
    }

    /// Read access to the snapshot, including applied transactions.
    #[must_use]
    pub fn wsv(&self) -> &WorldStateView {
        &self.wsv
    }

    /// Consume the snapshot, e.g. to become a prepared block's state.
    #[must_use]
    pub fn into_wsv(self) -> WorldStateView {
        self.wsv
    }
}
