//! # Command Execution
//!
//! Applies one command to the world state, re-validating domain invariants
//! atomically with the mutation. The creator is `None` only when the genesis
//! prologue applies commands without an authoring account.

use cl_state::wsv::GENESIS_WRITER;
use cl_state::{WorldStateView, WsvError};
use shared_types::{Account, AccountAsset, AccountId, Asset, AssetId, Command, Domain};
use tracing::trace;

use crate::errors::{ExecutionError, ExecutionErrorCode};

/// Execute one command against the world state.
///
/// # Errors
///
/// Returns an [`ExecutionError`] naming the command, a stable code, and a
/// reason. The caller decides the blast radius: the block applier rolls the
/// whole block back on the first failure.
pub fn execute(
    command: &Command,
    wsv: &mut WorldStateView,
    creator: Option<&AccountId>,
) -> Result<(), ExecutionError> {
    trace!(command = command.name(), "executing command");
    match command {
        Command::AddAssetQuantity {
            account_id,
            asset_id,
            amount,
        } => {
            let name = command.name();
            let precision = asset_precision(name, wsv, asset_id)?;
            if amount.scale() != precision {
                return Err(precision_mismatch(name, precision, amount.scale()));
            }
            if wsv.get_account(account_id).is_none() {
                return Err(ExecutionError::new(
                    name,
                    ExecutionErrorCode::NotFound,
                    format!("account {account_id} is absent"),
                ));
            }
            let balance = match wsv.get_account_asset(account_id, asset_id) {
                Some(row) => row.balance.checked_add(amount).ok_or_else(|| {
                    ExecutionError::new(
                        name,
                        ExecutionErrorCode::Overflow,
                        "amount overflows balance",
                    )
                })?,
                None => *amount,
            };
            wsv.upsert_account_asset(AccountAsset {
                account_id: account_id.clone(),
                asset_id: asset_id.clone(),
                balance,
            })
            .map_err(|e| ExecutionError::from_wsv(name, e))
        }

        Command::SubtractAssetQuantity {
            account_id,
            asset_id,
            amount,
        } => {
            let name = command.name();
            let precision = asset_precision(name, wsv, asset_id)?;
            if amount.scale() != precision {
                return Err(precision_mismatch(name, precision, amount.scale()));
            }
            let row = wsv.get_account_asset(account_id, asset_id).ok_or_else(|| {
                ExecutionError::new(
                    name,
                    ExecutionErrorCode::NotFound,
                    format!("{account_id} does not hold {asset_id}"),
                )
            })?;
            let balance = row.balance.checked_sub(amount).ok_or_else(|| {
                ExecutionError::new(
                    name,
                    ExecutionErrorCode::NotEnoughBalance,
                    "not sufficient amount",
                )
            })?;
            wsv.upsert_account_asset(AccountAsset {
                account_id: account_id.clone(),
                asset_id: asset_id.clone(),
                balance,
            })
            .map_err(|e| ExecutionError::from_wsv(name, e))
        }

        Command::TransferAsset {
            src_account_id,
            dest_account_id,
            asset_id,
            amount,
            ..
        } => {
            let name = command.name();
            let precision = asset_precision(name, wsv, asset_id)?;
            if amount.scale() != precision {
                return Err(precision_mismatch(name, precision, amount.scale()));
            }
            let src_row = wsv
                .get_account_asset(src_account_id, asset_id)
                .ok_or_else(|| {
                    ExecutionError::new(
                        name,
                        ExecutionErrorCode::NotFound,
                        format!("asset {asset_id} is absent on {src_account_id}"),
                    )
                })?;
            let new_src_balance = src_row.balance.checked_sub(amount).ok_or_else(|| {
                ExecutionError::new(
                    name,
                    ExecutionErrorCode::NotEnoughBalance,
                    "not enough assets on source account",
                )
            })?;
            if wsv.get_account(dest_account_id).is_none() {
                return Err(ExecutionError::new(
                    name,
                    ExecutionErrorCode::NotFound,
                    format!("account {dest_account_id} is absent"),
                ));
            }
            let new_dest_balance = match wsv.get_account_asset(dest_account_id, asset_id) {
                Some(row) => row.balance.checked_add(amount).ok_or_else(|| {
                    ExecutionError::new(
                        name,
                        ExecutionErrorCode::Overflow,
                        "operation overflows destination balance",
                    )
                })?,
                None => *amount,
            };
            wsv.upsert_account_asset(AccountAsset {
                account_id: dest_account_id.clone(),
                asset_id: asset_id.clone(),
                balance: new_dest_balance,
            })
            .and_then(|()| {
                wsv.upsert_account_asset(AccountAsset {
                    account_id: src_account_id.clone(),
                    asset_id: asset_id.clone(),
                    balance: new_src_balance,
                })
            })
            .map_err(|e| ExecutionError::from_wsv(name, e))
        }

        Command::AddPeer { peer } => wsv
            .insert_peer(peer.clone())
            .map_err(|e| ExecutionError::from_wsv(command.name(), e)),

        Command::AddSignatory {
            account_id,
            public_key,
        } => wsv
            .insert_signatory(*public_key)
            .and_then(|()| wsv.insert_account_signatory(account_id, *public_key))
            .map_err(|e| ExecutionError::from_wsv(command.name(), e)),

        Command::RemoveSignatory {
            account_id,
            public_key,
        } => {
            let name = command.name();
            wsv.delete_account_signatory(account_id, public_key)
                .map_err(|e| ExecutionError::from_wsv(name, e))?;
            // The key stays registered while other accounts still use it.
            match wsv.delete_signatory(public_key) {
                Ok(()) | Err(WsvError::SignatoryStillReferenced { .. }) => Ok(()),
                Err(e) => Err(ExecutionError::from_wsv(name, e)),
            }
        }

        Command::AppendRole {
            account_id,
            role_name,
        } => wsv
            .insert_account_role(account_id, role_name)
            .map_err(|e| ExecutionError::from_wsv(command.name(), e)),

        Command::DetachRole {
            account_id,
            role_name,
        } => wsv
            .delete_account_role(account_id, role_name)
            .map_err(|e| ExecutionError::from_wsv(command.name(), e)),

        Command::CreateAccount {
            account_name,
            domain_id,
            public_key,
        } => {
            let name = command.name();
            let default_role = wsv
                .get_domain(domain_id)
                .map(|domain| domain.default_role.clone())
                .ok_or_else(|| {
                    ExecutionError::new(
                        name,
                        ExecutionErrorCode::NotFound,
                        format!("domain {domain_id} not found"),
                    )
                })?;
            let id = AccountId::new(account_name.clone(), domain_id.clone());
            wsv.insert_signatory(*public_key)
                .and_then(|()| {
                    wsv.insert_account(Account {
                        id: id.clone(),
                        domain_id: domain_id.clone(),
                        quorum: 1,
                    })
                })
                .and_then(|()| wsv.insert_account_signatory(&id, *public_key))
                .and_then(|()| wsv.insert_account_role(&id, &default_role))
                .map_err(|e| ExecutionError::from_wsv(name, e))
        }

        Command::CreateAsset {
            asset_name,
            domain_id,
            precision,
        } => wsv
            .insert_asset(Asset {
                id: AssetId::new(asset_name.clone(), domain_id.clone()),
                domain_id: domain_id.clone(),
                precision: *precision,
            })
            .map_err(|e| ExecutionError::from_wsv(command.name(), e)),

        Command::CreateDomain {
            domain_id,
            default_role,
        } => wsv
            .insert_domain(Domain {
                id: domain_id.clone(),
                default_role: default_role.clone(),
            })
            .map_err(|e| ExecutionError::from_wsv(command.name(), e)),

        Command::CreateRole {
            role_name,
            permissions,
        } => wsv
            .insert_role(role_name.clone())
            .and_then(|()| wsv.insert_role_permissions(role_name, *permissions))
            .map_err(|e| ExecutionError::from_wsv(command.name(), e)),

        Command::GrantPermission {
            account_id,
            permission,
        } => {
            let grantor = require_creator(command.name(), creator)?;
            wsv.insert_account_grantable_permission(grantor, account_id, *permission)
                .map_err(|e| ExecutionError::from_wsv(command.name(), e))
        }

        Command::RevokePermission {
            account_id,
            permission,
        } => {
            let grantor = require_creator(command.name(), creator)?;
            wsv.delete_account_grantable_permission(grantor, account_id, *permission)
                .map_err(|e| ExecutionError::from_wsv(command.name(), e))
        }

        Command::SetAccountDetail {
            account_id,
            key,
            value,
        } => {
            let writer = creator
                .map(ToString::to_string)
                .unwrap_or_else(|| GENESIS_WRITER.to_owned());
            wsv.set_account_detail(account_id, &writer, key, value)
                .map_err(|e| ExecutionError::from_wsv(command.name(), e))
        }

        Command::SetQuorum { account_id, quorum } => {
            let name = command.name();
            let account = wsv.get_account(account_id).cloned().ok_or_else(|| {
                ExecutionError::new(
                    name,
                    ExecutionErrorCode::NotFound,
                    format!("absent account {account_id}"),
                )
            })?;
            let signatories = wsv.get_signatories(account_id).unwrap_or_default();
            if signatories.len() < *quorum as usize {
                return Err(ExecutionError::new(
                    name,
                    ExecutionErrorCode::InvariantViolation,
                    format!(
                        "quorum {quorum} exceeds signatory count {}",
                        signatories.len()
                    ),
                ));
            }
            wsv.update_account(Account {
                quorum: *quorum,
                ..account
            })
            .map_err(|e| ExecutionError::from_wsv(name, e))
        }
    }
}

fn asset_precision(
    command_name: &'static str,
    wsv: &WorldStateView,
    asset_id: &AssetId,
) -> Result<u8, ExecutionError> {
    wsv.get_asset(asset_id)
        .map(|asset| asset.precision)
        .ok_or_else(|| {
            ExecutionError::new(
                command_name,
                ExecutionErrorCode::NotFound,
                format!("asset {asset_id} is absent"),
            )
        })
}

fn precision_mismatch(command_name: &'static str, expected: u8, got: u8) -> ExecutionError {
    ExecutionError::new(
        command_name,
        ExecutionErrorCode::PrecisionMismatch,
        format!("precision mismatch: expected {expected}, but got {got}"),
    )
}

fn require_creator<'a>(
    command_name: &'static str,
    creator: Option<&'a AccountId>,
) -> Result<&'a AccountId, ExecutionError> {
    creator.ok_or_else(|| {
        ExecutionError::new(
            command_name,
            ExecutionErrorCode::MissingCreator,
            "command requires a creator account",
        )
    })
}
