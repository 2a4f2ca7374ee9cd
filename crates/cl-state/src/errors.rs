//! World-state constraint errors.
//!
//! Every mutation primitive reports violated constraints as values; the
//! command executor folds them into execution errors and the block applier
//! folds those into the block's all-or-nothing outcome.

use shared_types::{AccountId, AssetId, DomainId, GrantablePermission, RoleId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WsvError {
    #[error("Account not found: {id}")]
    AccountNotFound { id: AccountId },

    #[error("Account already exists: {id}")]
    AccountAlreadyExists { id: AccountId },

    #[error("Domain not found: {id}")]
    DomainNotFound { id: DomainId },

    #[error("Domain already exists: {id}")]
    DomainAlreadyExists { id: DomainId },

    #[error("Asset not found: {id}")]
    AssetNotFound { id: AssetId },

    #[error("Asset already exists: {id}")]
    AssetAlreadyExists { id: AssetId },

    #[error("Role not found: {id}")]
    RoleNotFound { id: RoleId },

    #[error("Role already exists: {id}")]
    RoleAlreadyExists { id: RoleId },

    #[error("Role {role} already attached to account {account}")]
    RoleAlreadyAttached { account: AccountId, role: RoleId },

    #[error("Role {role} not attached to account {account}")]
    RoleNotAttached { account: AccountId, role: RoleId },

    #[error("Peer already exists: {public_key}")]
    PeerAlreadyExists { public_key: String },

    #[error("Peer not found: {public_key}")]
    PeerNotFound { public_key: String },

    #[error("Signatory not registered: {public_key}")]
    SignatoryNotFound { public_key: String },

    #[error("Signatory {public_key} already attached to account {account}")]
    SignatoryAlreadyAttached {
        account: AccountId,
        public_key: String,
    },

    #[error("Signatory {public_key} not attached to account {account}")]
    SignatoryNotAttached {
        account: AccountId,
        public_key: String,
    },

    #[error("Signatory {public_key} still referenced by an account")]
    SignatoryStillReferenced { public_key: String },

    #[error("Permission {permission:?} already granted by {grantor} to {grantee}")]
    GrantAlreadyPresent {
        grantor: AccountId,
        grantee: AccountId,
        permission: GrantablePermission,
    },

    #[error("Permission {permission:?} was not granted by {grantor} to {grantee}")]
    GrantNotFound {
        grantor: AccountId,
        grantee: AccountId,
        permission: GrantablePermission,
    },
}
