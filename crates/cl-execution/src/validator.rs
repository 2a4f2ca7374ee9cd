//! # Command Validation
//!
//! Read-only authorization and precondition checks, run during stateful
//! validation of a proposal. Execution re-checks the hard invariants, so
//! everything here may be evaluated against a state that later shifts:
//! validation answers "may this creator do this", not "will it succeed".

use cl_state::WorldStateView;
use shared_types::{AccountId, Command, GrantablePermission, Permission};

/// Validate one command for a creator account: authorization first, then
/// cheap shape preconditions.
#[must_use]
pub fn validate(command: &Command, wsv: &WorldStateView, creator: &AccountId) -> bool {
    has_permission(command, wsv, creator) && is_valid(command, wsv, creator)
}

/// True when the creator's roles hold a permission.
fn has_role_permission(wsv: &WorldStateView, account: &AccountId, permission: Permission) -> bool {
    wsv.get_account_permissions(account).contains(permission)
}

/// True when `grantor` granted the creator a scoped permission.
fn has_grant(
    wsv: &WorldStateView,
    grantor: &AccountId,
    grantee: &AccountId,
    permission: GrantablePermission,
) -> bool {
    wsv.has_account_grantable_permission(grantor, grantee, permission)
}

fn has_permission(command: &Command, wsv: &WorldStateView, creator: &AccountId) -> bool {
    match command {
        // Asset quantity mutations only ever target the creator's own account.
        Command::AddAssetQuantity { account_id, .. } => {
            creator == account_id
                && has_role_permission(wsv, creator, Permission::AddAssetQuantity)
        }
        Command::SubtractAssetQuantity { account_id, .. } => {
            creator == account_id
                && has_role_permission(wsv, creator, Permission::SubtractAssetQuantity)
        }
        Command::AddPeer { .. } => has_role_permission(wsv, creator, Permission::AddPeer),
        Command::AddSignatory { account_id, .. } => {
            (account_id == creator && has_role_permission(wsv, creator, Permission::AddSignatory))
                || has_grant(wsv, account_id, creator, GrantablePermission::AddSignatory)
        }
        Command::RemoveSignatory { account_id, .. } => {
            (account_id == creator
                && has_role_permission(wsv, creator, Permission::RemoveSignatory))
                || has_grant(wsv, account_id, creator, GrantablePermission::RemoveSignatory)
        }
        Command::AppendRole { .. } => has_role_permission(wsv, creator, Permission::AppendRole),
        Command::DetachRole { .. } => has_role_permission(wsv, creator, Permission::DetachRole),
        Command::CreateAccount { .. } => {
            has_role_permission(wsv, creator, Permission::CreateAccount)
        }
        Command::CreateAsset { .. } => has_role_permission(wsv, creator, Permission::CreateAsset),
        Command::CreateDomain { .. } => {
            has_role_permission(wsv, creator, Permission::CreateDomain)
        }
        Command::CreateRole { .. } => has_role_permission(wsv, creator, Permission::CreateRole),
        Command::GrantPermission { permission, .. } => {
            has_role_permission(wsv, creator, permission.required_to_grant())
        }
        Command::RevokePermission {
            account_id,
            permission,
        } => has_grant(wsv, creator, account_id, *permission),
        Command::SetAccountDetail { account_id, .. } => {
            creator == account_id
                || has_grant(wsv, account_id, creator, GrantablePermission::SetAccountDetail)
        }
        Command::SetQuorum { account_id, .. } => {
            (creator == account_id && has_role_permission(wsv, creator, Permission::SetQuorum))
                || has_grant(wsv, account_id, creator, GrantablePermission::SetQuorum)
        }
        Command::TransferAsset {
            src_account_id,
            dest_account_id,
            ..
        } => {
            let src_side = if creator == src_account_id {
                has_role_permission(wsv, creator, Permission::Transfer)
            } else {
                has_grant(wsv, src_account_id, creator, GrantablePermission::Transfer)
            };
            src_side && has_role_permission(wsv, dest_account_id, Permission::Receive)
        }
    }
}

fn is_valid(command: &Command, wsv: &WorldStateView, creator: &AccountId) -> bool {
    match command {
        Command::AppendRole { role_name, .. } => {
            // A role may only be appended by an account already holding
            // every permission the role carries.
            match wsv.get_role_permissions(role_name) {
                Some(role_perms) => {
                    role_perms.is_subset_of(&wsv.get_account_permissions(creator))
                }
                None => false,
            }
        }
        Command::CreateAccount { account_name, .. } => is_valid_account_name(account_name),
        Command::CreateAsset { asset_name, .. } => is_valid_short_name(asset_name),
        Command::CreateDomain { domain_id, .. } => is_valid_short_name(domain_id),
        Command::CreateRole {
            role_name,
            permissions,
        } => {
            permissions.is_subset_of(&wsv.get_account_permissions(creator))
                && is_valid_role_name(role_name)
        }
        Command::RemoveSignatory { account_id, .. } => {
            let (Some(account), Some(signatories)) =
                (wsv.get_account(account_id), wsv.get_signatories(account_id))
            else {
                return false;
            };
            // The remaining set must still be able to meet the quorum.
            signatories.len().saturating_sub(1) >= account.quorum as usize
        }
        Command::SetQuorum { account_id, quorum } => {
            let Some(signatories) = wsv.get_signatories(account_id) else {
                return false;
            };
            *quorum > 0 && *quorum <= 9 && signatories.len() >= *quorum as usize
        }
        Command::TransferAsset {
            src_account_id,
            dest_account_id,
            asset_id,
            amount,
            ..
        } => {
            if amount.is_zero() {
                return false;
            }
            let Some(asset) = wsv.get_asset(asset_id) else {
                return false;
            };
            if amount.scale() != asset.precision {
                return false;
            }
            let Some(src_row) = wsv.get_account_asset(src_account_id, asset_id) else {
                return false;
            };
            wsv.get_account(dest_account_id).is_some() && src_row.balance >= *amount
        }
        // Everything else is authorized-only; execution enforces the rest.
        _ => true,
    }
}

fn is_valid_account_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() < 32
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

fn is_valid_short_name(name: &str) -> bool {
    !name.is_empty() && name.len() < 10 && name.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn is_valid_role_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() < 8
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}
