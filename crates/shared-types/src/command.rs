//! # Ledger Commands
//!
//! The closed set of operations a transaction can carry. Each variant is
//! validated and executed by the command executor; the enum itself is plain
//! data and serializes as part of the transaction payload.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::entities::Peer;
use crate::ids::{AccountId, AssetId, DomainId, RoleId};
use crate::permissions::{GrantablePermission, RolePermissionSet};
use crate::PublicKey;

/// One ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Credit the target account's balance of an asset.
    AddAssetQuantity {
        account_id: AccountId,
        asset_id: AssetId,
        amount: Amount,
    },
    /// Register a peer by public key and address.
    AddPeer { peer: Peer },
    /// Attach a signatory public key to an account.
    AddSignatory {
        account_id: AccountId,
        public_key: PublicKey,
    },
    /// Attach an existing role to an account.
    AppendRole {
        account_id: AccountId,
        role_name: RoleId,
    },
    /// Create an account in an existing domain with one signatory.
    CreateAccount {
        account_name: String,
        domain_id: DomainId,
        public_key: PublicKey,
    },
    /// Define an asset with a fixed decimal precision.
    CreateAsset {
        asset_name: String,
        domain_id: DomainId,
        precision: u8,
    },
    /// Create a domain with a default role for new accounts.
    CreateDomain {
        domain_id: DomainId,
        default_role: RoleId,
    },
    /// Create a role carrying a permission set.
    CreateRole {
        role_name: RoleId,
        permissions: RolePermissionSet,
    },
    /// Detach a role from an account.
    DetachRole {
        account_id: AccountId,
        role_name: RoleId,
    },
    /// Grant the creator's scoped permission to another account.
    GrantPermission {
        account_id: AccountId,
        permission: GrantablePermission,
    },
    /// Remove a signatory from an account.
    RemoveSignatory {
        account_id: AccountId,
        public_key: PublicKey,
    },
    /// Revoke a previously granted scoped permission.
    RevokePermission {
        account_id: AccountId,
        permission: GrantablePermission,
    },
    /// Write one key/value pair into an account's detail blob.
    SetAccountDetail {
        account_id: AccountId,
        key: String,
        value: String,
    },
    /// Change an account's signature quorum.
    SetQuorum { account_id: AccountId, quorum: u32 },
    /// Debit the target account's balance of an asset.
    SubtractAssetQuantity {
        account_id: AccountId,
        asset_id: AssetId,
        amount: Amount,
    },
    /// Move an asset quantity between two accounts.
    TransferAsset {
        src_account_id: AccountId,
        dest_account_id: AccountId,
        asset_id: AssetId,
        description: String,
        amount: Amount,
    },
}

impl Command {
    /// Stable command name used in status errors and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddAssetQuantity { .. } => "AddAssetQuantity",
            Command::AddPeer { .. } => "AddPeer",
            Command::AddSignatory { .. } => "AddSignatory",
            Command::AppendRole { .. } => "AppendRole",
            Command::CreateAccount { .. } => "CreateAccount",
            Command::CreateAsset { .. } => "CreateAsset",
            Command::CreateDomain { .. } => "CreateDomain",
            Command::CreateRole { .. } => "CreateRole",
            Command::DetachRole { .. } => "DetachRole",
            Command::GrantPermission { .. } => "GrantPermission",
            Command::RemoveSignatory { .. } => "RemoveSignatory",
            Command::RevokePermission { .. } => "RevokePermission",
            Command::SetAccountDetail { .. } => "SetAccountDetail",
            Command::SetQuorum { .. } => "SetQuorum",
            Command::SubtractAssetQuantity { .. } => "SubtractAssetQuantity",
            Command::TransferAsset { .. } => "TransferAsset",
        }
    }
}
