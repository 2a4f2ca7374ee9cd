//! # World-State Entities
//!
//! The entities the ledger tracks: accounts, domains, assets, balances and
//! peers. These are value types; the world-state store owns the authoritative
//! copies and all mutation flows through successful command execution.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::ids::{AccountId, AssetId, DomainId, RoleId};
use crate::PublicKey;

/// A ledger account.
///
/// ## Invariants
///
/// - `quorum` never exceeds the account's signatory count (enforced by the
///   signatory and quorum commands, not by this struct).
/// - `id.domain` references an existing [`Domain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Globally unique id, `name@domain`.
    pub id: AccountId,
    /// Domain the account was created in.
    pub domain_id: DomainId,
    /// Minimum distinct signatures required on this account's transactions.
    pub quorum: u32,
}

impl Account {
    /// A fresh account with quorum 1, as seeded by account creation.
    #[must_use]
    pub fn new(id: AccountId) -> Self {
        let domain_id = id.domain.clone();
        Self {
            id,
            domain_id,
            quorum: 1,
        }
    }
}

/// A namespace for accounts and assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Unique domain id.
    pub id: DomainId,
    /// Role assigned to accounts created in this domain.
    pub default_role: RoleId,
}

/// An asset definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Globally unique id, `name#domain`.
    pub id: AssetId,
    /// Domain the asset is defined in.
    pub domain_id: DomainId,
    /// Fixed decimal scale every balance of this asset must carry.
    pub precision: u8,
}

/// A balance row: one account's holding of one asset.
///
/// Created on first credit; the balance scale always equals the asset's
/// declared precision and is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAsset {
    /// Holder account.
    pub account_id: AccountId,
    /// Held asset.
    pub asset_id: AssetId,
    /// Current balance.
    pub balance: Amount,
}

/// A network peer, unique by public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// The peer's signing key.
    pub public_key: PublicKey,
    /// Network address, `host:port`.
    pub address: String,
}
