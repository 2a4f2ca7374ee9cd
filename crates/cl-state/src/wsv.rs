//! # World-State Store
//!
//! Point mutations and point queries over the ledger state. Mutations check
//! the same referential constraints a relational schema would enforce
//! (foreign keys, uniqueness) and report violations as [`WsvError`] values.
//!
//! Balance writes are caller-computed: `upsert_account_asset` creates the
//! row on first credit and replaces the balance afterwards, never deriving
//! the value itself. Arithmetic belongs to the command executor.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use shared_types::{
    Account, AccountAsset, AccountId, Asset, AssetId, Domain, DomainId, GrantablePermission,
    Peer, PublicKey, RoleId, RolePermissionSet,
};

use crate::errors::WsvError;

/// Writer name recorded for details set during genesis application, when no
/// creator account exists yet.
pub const GENESIS_WRITER: &str = "genesis";

/// The structured, queryable ledger state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldStateView {
    accounts: HashMap<AccountId, Account>,
    domains: HashMap<DomainId, Domain>,
    assets: HashMap<AssetId, Asset>,
    account_assets: BTreeMap<(AccountId, AssetId), AccountAsset>,
    peers: BTreeMap<PublicKey, Peer>,
    roles: HashMap<RoleId, RolePermissionSet>,
    account_roles: HashMap<AccountId, BTreeSet<RoleId>>,
    signatories: HashSet<PublicKey>,
    account_signatories: HashMap<AccountId, BTreeSet<PublicKey>>,
    grants: HashSet<(AccountId, AccountId, GrantablePermission)>,
    /// account -> writer -> key -> value
    details: HashMap<AccountId, BTreeMap<String, BTreeMap<String, String>>>,
}

impl WorldStateView {
    /// An empty world state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Insert a new account. The account's domain must already exist.
    pub fn insert_account(&mut self, account: Account) -> Result<(), WsvError> {
        if !self.domains.contains_key(&account.domain_id) {
            return Err(WsvError::DomainNotFound {
                id: account.domain_id.clone(),
            });
        }
        if self.accounts.contains_key(&account.id) {
            return Err(WsvError::AccountAlreadyExists { id: account.id });
        }
        self.accounts.insert(account.id.clone(), account);
        Ok(())
    }

    /// Replace an existing account (quorum changes go through here).
    pub fn update_account(&mut self, account: Account) -> Result<(), WsvError> {
        if !self.accounts.contains_key(&account.id) {
            return Err(WsvError::AccountNotFound { id: account.id });
        }
        self.accounts.insert(account.id.clone(), account);
        Ok(())
    }

    /// Insert a new domain.
    pub fn insert_domain(&mut self, domain: Domain) -> Result<(), WsvError> {
        if self.domains.contains_key(&domain.id) {
            return Err(WsvError::DomainAlreadyExists { id: domain.id });
        }
        self.domains.insert(domain.id.clone(), domain);
        Ok(())
    }

    /// Insert a new asset. The asset's domain must already exist.
    pub fn insert_asset(&mut self, asset: Asset) -> Result<(), WsvError> {
        if !self.domains.contains_key(&asset.domain_id) {
            return Err(WsvError::DomainNotFound {
                id: asset.domain_id.clone(),
            });
        }
        if self.assets.contains_key(&asset.id) {
            return Err(WsvError::AssetAlreadyExists { id: asset.id });
        }
        self.assets.insert(asset.id.clone(), asset);
        Ok(())
    }

    /// Create or replace a balance row with a caller-computed balance.
    pub fn upsert_account_asset(&mut self, account_asset: AccountAsset) -> Result<(), WsvError> {
        if !self.accounts.contains_key(&account_asset.account_id) {
            return Err(WsvError::AccountNotFound {
                id: account_asset.account_id.clone(),
            });
        }
        if !self.assets.contains_key(&account_asset.asset_id) {
            return Err(WsvError::AssetNotFound {
                id: account_asset.asset_id.clone(),
            });
        }
        let key = (
            account_asset.account_id.clone(),
            account_asset.asset_id.clone(),
        );
        self.account_assets.insert(key, account_asset);
        Ok(())
    }

    /// Register a peer, unique by public key.
    pub fn insert_peer(&mut self, peer: Peer) -> Result<(), WsvError> {
        if self.peers.contains_key(&peer.public_key) {
            return Err(WsvError::PeerAlreadyExists {
                public_key: hex::encode(peer.public_key),
            });
        }
        self.peers.insert(peer.public_key, peer);
        Ok(())
    }

    /// Remove a peer by public key.
    pub fn delete_peer(&mut self, public_key: &PublicKey) -> Result<(), WsvError> {
        self.peers
            .remove(public_key)
            .map(|_| ())
            .ok_or_else(|| WsvError::PeerNotFound {
                public_key: hex::encode(public_key),
            })
    }

    /// Create a role with an empty permission set.
    pub fn insert_role(&mut self, role: RoleId) -> Result<(), WsvError> {
        if self.roles.contains_key(&role) {
            return Err(WsvError::RoleAlreadyExists { id: role });
        }
        self.roles.insert(role, RolePermissionSet::empty());
        Ok(())
    }

    /// Attach a permission set to an existing role.
    pub fn insert_role_permissions(
        &mut self,
        role: &RoleId,
        permissions: RolePermissionSet,
    ) -> Result<(), WsvError> {
        let entry = self
            .roles
            .get_mut(role)
            .ok_or_else(|| WsvError::RoleNotFound { id: role.clone() })?;
        *entry = entry.union(&permissions);
        Ok(())
    }

    /// Attach an existing role to an existing account.
    pub fn insert_account_role(
        &mut self,
        account: &AccountId,
        role: &RoleId,
    ) -> Result<(), WsvError> {
        if !self.accounts.contains_key(account) {
            return Err(WsvError::AccountNotFound {
                id: account.clone(),
            });
        }
        if !self.roles.contains_key(role) {
            return Err(WsvError::RoleNotFound { id: role.clone() });
        }
        let attached = self.account_roles.entry(account.clone()).or_default();
        if !attached.insert(role.clone()) {
            return Err(WsvError::RoleAlreadyAttached {
                account: account.clone(),
                role: role.clone(),
            });
        }
        Ok(())
    }

    /// Detach a role from an account.
    pub fn delete_account_role(
        &mut self,
        account: &AccountId,
        role: &RoleId,
    ) -> Result<(), WsvError> {
        let attached = self
            .account_roles
            .get_mut(account)
            .ok_or_else(|| WsvError::AccountNotFound {
                id: account.clone(),
            })?;
        if !attached.remove(role) {
            return Err(WsvError::RoleNotAttached {
                account: account.clone(),
                role: role.clone(),
            });
        }
        Ok(())
    }

    /// Register a signatory key. Idempotent: re-registering is a no-op.
    pub fn insert_signatory(&mut self, public_key: PublicKey) -> Result<(), WsvError> {
        self.signatories.insert(public_key);
        Ok(())
    }

    /// Attach a registered signatory to an account.
    pub fn insert_account_signatory(
        &mut self,
        account: &AccountId,
        public_key: PublicKey,
    ) -> Result<(), WsvError> {
        if !self.accounts.contains_key(account) {
            return Err(WsvError::AccountNotFound {
                id: account.clone(),
            });
        }
        if !self.signatories.contains(&public_key) {
            return Err(WsvError::SignatoryNotFound {
                public_key: hex::encode(public_key),
            });
        }
        let attached = self.account_signatories.entry(account.clone()).or_default();
        if !attached.insert(public_key) {
            return Err(WsvError::SignatoryAlreadyAttached {
                account: account.clone(),
                public_key: hex::encode(public_key),
            });
        }
        Ok(())
    }

    /// Detach a signatory from an account.
    pub fn delete_account_signatory(
        &mut self,
        account: &AccountId,
        public_key: &PublicKey,
    ) -> Result<(), WsvError> {
        let attached = self
            .account_signatories
            .get_mut(account)
            .ok_or_else(|| WsvError::AccountNotFound {
                id: account.clone(),
            })?;
        if !attached.remove(public_key) {
            return Err(WsvError::SignatoryNotAttached {
                account: account.clone(),
                public_key: hex::encode(public_key),
            });
        }
        Ok(())
    }

    /// Drop a signatory key once no account references it.
    pub fn delete_signatory(&mut self, public_key: &PublicKey) -> Result<(), WsvError> {
        let referenced = self
            .account_signatories
            .values()
            .any(|keys| keys.contains(public_key));
        if referenced {
            return Err(WsvError::SignatoryStillReferenced {
                public_key: hex::encode(public_key),
            });
        }
        if !self.signatories.remove(public_key) {
            return Err(WsvError::SignatoryNotFound {
                public_key: hex::encode(public_key),
            });
        }
        Ok(())
    }

    /// Record a grantable permission. Granting twice is a constraint error.
    pub fn insert_account_grantable_permission(
        &mut self,
        grantor: &AccountId,
        grantee: &AccountId,
        permission: GrantablePermission,
    ) -> Result<(), WsvError> {
        if !self.accounts.contains_key(grantee) {
            return Err(WsvError::AccountNotFound { id: grantee.clone() });
        }
        let key = (grantor.clone(), grantee.clone(), permission);
        if !self.grants.insert(key) {
            return Err(WsvError::GrantAlreadyPresent {
                grantor: grantor.clone(),
                grantee: grantee.clone(),
                permission,
            });
        }
        Ok(())
    }

    /// Remove a previously recorded grant.
    pub fn delete_account_grantable_permission(
        &mut self,
        grantor: &AccountId,
        grantee: &AccountId,
        permission: GrantablePermission,
    ) -> Result<(), WsvError> {
        let key = (grantor.clone(), grantee.clone(), permission);
        if !self.grants.remove(&key) {
            return Err(WsvError::GrantNotFound {
                grantor: grantor.clone(),
                grantee: grantee.clone(),
                permission,
            });
        }
        Ok(())
    }

    /// Write one key/value pair into an account's detail blob, recording the
    /// writer. Rewriting an existing (writer, key) replaces the value.
    pub fn set_account_detail(
        &mut self,
        account: &AccountId,
        writer: &str,
        key: &str,
        value: &str,
    ) -> Result<(), WsvError> {
        if !self.accounts.contains_key(account) {
            return Err(WsvError::AccountNotFound {
                id: account.clone(),
            });
        }
        self.details
            .entry(account.clone())
            .or_default()
            .entry(writer.to_owned())
            .or_default()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Point lookup of an account.
    #[must_use]
    pub fn get_account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Roles attached to an account, empty when none.
    #[must_use]
    pub fn get_account_roles(&self, id: &AccountId) -> Vec<RoleId> {
        self.account_roles
            .get(id)
            .map(|roles| roles.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Permission set of a role.
    #[must_use]
    pub fn get_role_permissions(&self, role: &RoleId) -> Option<RolePermissionSet> {
        self.roles.get(role).copied()
    }

    /// Point lookup of a domain.
    #[must_use]
    pub fn get_domain(&self, id: &DomainId) -> Option<&Domain> {
        self.domains.get(id)
    }

    /// Point lookup of an asset.
    #[must_use]
    pub fn get_asset(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.get(id)
    }

    /// Point lookup of one balance row.
    #[must_use]
    pub fn get_account_asset(
        &self,
        account: &AccountId,
        asset: &AssetId,
    ) -> Option<&AccountAsset> {
        self.account_assets
            .get(&(account.clone(), asset.clone()))
    }

    /// All balance rows of one account, in asset order.
    #[must_use]
    pub fn get_account_assets(&self, account: &AccountId) -> Vec<&AccountAsset> {
        self.account_assets
            .range((account.clone(), AssetId::new("", ""))..)
            .take_while(|((a, _), _)| a == account)
            .map(|(_, row)| row)
            .collect()
    }

    /// All registered peers, in key order.
    #[must_use]
    pub fn get_peers(&self) -> Vec<&Peer> {
        self.peers.values().collect()
    }

    /// Signatory keys attached to an account. `None` for unknown accounts.
    #[must_use]
    pub fn get_signatories(&self, account: &AccountId) -> Option<Vec<PublicKey>> {
        if !self.accounts.contains_key(account) {
            return None;
        }
        Some(
            self.account_signatories
                .get(account)
                .map(|keys| keys.iter().copied().collect())
                .unwrap_or_default(),
        )
    }

    /// True if `grantor` has granted `grantee` the scoped permission.
    #[must_use]
    pub fn has_account_grantable_permission(
        &self,
        grantor: &AccountId,
        grantee: &AccountId,
        permission: GrantablePermission,
    ) -> bool {
        self.grants
            .contains(&(grantor.clone(), grantee.clone(), permission))
    }

    /// Union of all role permissions an account holds.
    #[must_use]
    pub fn get_account_permissions(&self, account: &AccountId) -> RolePermissionSet {
        self.get_account_roles(account)
            .iter()
            .filter_map(|role| self.roles.get(role))
            .fold(RolePermissionSet::empty(), |acc, set| acc.union(set))
    }

    /// Account detail retrieval with four modes, selected by the optional
    /// `writer` and `key` arguments:
    ///
    /// - neither: the full detail tree, `{writer: {key: value}}`
    /// - writer only: that writer's pairs, `{key: value}`
    /// - key only: that key across all writers, `{writer: value}`
    /// - both: the single value, as a JSON string
    ///
    /// `None` when the account does not exist.
    #[must_use]
    pub fn get_account_detail(
        &self,
        account: &AccountId,
        writer: Option<&str>,
        key: Option<&str>,
    ) -> Option<Value> {
        if !self.accounts.contains_key(account) {
            return None;
        }
        let empty = BTreeMap::new();
        let tree = self.details.get(account).unwrap_or(&empty);
        let value = match (writer, key) {
            (None, None) => {
                let mut by_writer = Map::new();
                for (w, pairs) in tree {
                    by_writer.insert(w.clone(), pairs_to_object(pairs));
                }
                Value::Object(by_writer)
            }
            (Some(w), None) => tree.get(w).map(pairs_to_object).unwrap_or_else(|| json!({})),
            (None, Some(k)) => {
                let mut by_writer = Map::new();
                for (w, pairs) in tree {
                    if let Some(v) = pairs.get(k) {
                        by_writer.insert(w.clone(), Value::String(v.clone()));
                    }
                }
                Value::Object(by_writer)
            }
            (Some(w), Some(k)) => tree
                .get(w)
                .and_then(|pairs| pairs.get(k))
                .map(|v| Value::String(v.clone()))
                .unwrap_or(Value::Null),
        };
        Some(value)
    }
}

fn pairs_to_object(pairs: &BTreeMap<String, String>) -> Value {
    Value::Object(
        pairs
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Amount;

    fn seeded() -> WorldStateView {
        let mut wsv = WorldStateView::new();
        wsv.insert_domain(Domain {
            id: "test".into(),
            default_role: "user".into(),
        })
        .unwrap();
        wsv.insert_role("user".into()).unwrap();
        wsv.insert_account(Account::new(AccountId::new("admin", "test")))
            .unwrap();
        wsv.insert_asset(Asset {
            id: AssetId::new("coin", "test"),
            domain_id: "test".into(),
            precision: 2,
        })
        .unwrap();
        wsv
    }

    #[test]
    fn account_requires_existing_domain() {
        let mut wsv = WorldStateView::new();
        let err = wsv
            .insert_account(Account::new(AccountId::new("a", "nowhere")))
            .unwrap_err();
        assert!(matches!(err, WsvError::DomainNotFound { .. }));
    }

    #[test]
    fn asset_requires_existing_domain() {
        let mut wsv = seeded();
        let err = wsv
            .insert_asset(Asset {
                id: AssetId::new("coin", "nowhere"),
                domain_id: "nowhere".into(),
                precision: 0,
            })
            .unwrap_err();
        assert!(matches!(err, WsvError::DomainNotFound { .. }));
        assert!(wsv.get_asset(&AssetId::new("coin", "nowhere")).is_none());
    }

    #[test]
    fn duplicate_inserts_are_constraint_errors() {
        let mut wsv = seeded();
        assert!(matches!(
            wsv.insert_account(Account::new(AccountId::new("admin", "test"))),
            Err(WsvError::AccountAlreadyExists { .. })
        ));
        assert!(matches!(
            wsv.insert_domain(Domain {
                id: "test".into(),
                default_role: "user".into()
            }),
            Err(WsvError::DomainAlreadyExists { .. })
        ));
        assert!(matches!(
            wsv.insert_role("user".into()),
            Err(WsvError::RoleAlreadyExists { .. })
        ));
    }

    #[test]
    fn upsert_account_asset_creates_then_replaces() {
        let mut wsv = seeded();
        let account = AccountId::new("admin", "test");
        let asset = AssetId::new("coin", "test");
        let first = AccountAsset {
            account_id: account.clone(),
            asset_id: asset.clone(),
            balance: "1.00".parse::<Amount>().unwrap(),
        };
        wsv.upsert_account_asset(first).unwrap();
        let second = AccountAsset {
            account_id: account.clone(),
            asset_id: asset.clone(),
            balance: "2.50".parse::<Amount>().unwrap(),
        };
        wsv.upsert_account_asset(second).unwrap();
        let row = wsv.get_account_asset(&account, &asset).unwrap();
        assert_eq!(row.balance.to_string(), "2.50");
    }

    #[test]
    fn signatory_refcounting_blocks_premature_delete() {
        let mut wsv = seeded();
        let account = AccountId::new("admin", "test");
        let key = [1u8; 32];
        wsv.insert_signatory(key).unwrap();
        wsv.insert_account_signatory(&account, key).unwrap();
        assert!(matches!(
            wsv.delete_signatory(&key),
            Err(WsvError::SignatoryStillReferenced { .. })
        ));
        wsv.delete_account_signatory(&account, &key).unwrap();
        wsv.delete_signatory(&key).unwrap();
    }

    #[test]
    fn grant_twice_is_rejected_and_leaves_relation_unchanged() {
        let mut wsv = seeded();
        wsv.insert_account(Account::new(AccountId::new("bob", "test")))
            .unwrap();
        let grantor = AccountId::new("admin", "test");
        let grantee = AccountId::new("bob", "test");
        wsv.insert_account_grantable_permission(
            &grantor,
            &grantee,
            GrantablePermission::SetQuorum,
        )
        .unwrap();
        assert!(matches!(
            wsv.insert_account_grantable_permission(
                &grantor,
                &grantee,
                GrantablePermission::SetQuorum,
            ),
            Err(WsvError::GrantAlreadyPresent { .. })
        ));
        assert!(wsv.has_account_grantable_permission(
            &grantor,
            &grantee,
            GrantablePermission::SetQuorum
        ));
    }

    #[test]
    fn peer_delete_round_trip() {
        let mut wsv = seeded();
        let peer = Peer {
            public_key: [7u8; 32],
            address: "10.0.0.1:50541".into(),
        };
        wsv.insert_peer(peer.clone()).unwrap();
        assert!(matches!(
            wsv.insert_peer(peer),
            Err(WsvError::PeerAlreadyExists { .. })
        ));
        wsv.delete_peer(&[7u8; 32]).unwrap();
        assert!(wsv.get_peers().is_empty());
        assert!(matches!(
            wsv.delete_peer(&[7u8; 32]),
            Err(WsvError::PeerNotFound { .. })
        ));
    }

    #[test]
    fn detail_retrieval_modes() {
        let mut wsv = seeded();
        let account = AccountId::new("admin", "test");
        wsv.set_account_detail(&account, "admin@test", "age", "30")
            .unwrap();
        wsv.set_account_detail(&account, "admin@test", "city", "kyoto")
            .unwrap();
        wsv.set_account_detail(&account, GENESIS_WRITER, "age", "0")
            .unwrap();

        let all = wsv.get_account_detail(&account, None, None).unwrap();
        assert_eq!(all["admin@test"]["age"], "30");
        assert_eq!(all[GENESIS_WRITER]["age"], "0");

        let by_writer = wsv
            .get_account_detail(&account, Some("admin@test"), None)
            .unwrap();
        assert_eq!(by_writer["city"], "kyoto");

        let by_key = wsv.get_account_detail(&account, None, Some("age")).unwrap();
        assert_eq!(by_key["admin@test"], "30");
        assert_eq!(by_key[GENESIS_WRITER], "0");

        let single = wsv
            .get_account_detail(&account, Some(GENESIS_WRITER), Some("age"))
            .unwrap();
        assert_eq!(single, "0");

        assert!(wsv
            .get_account_detail(&AccountId::new("ghost", "test"), None, None)
            .is_none());
    }

    #[test]
    fn account_assets_are_scoped_to_the_account() {
        let mut wsv = seeded();
        wsv.insert_account(Account::new(AccountId::new("bob", "test")))
            .unwrap();
        let coin = AssetId::new("coin", "test");
        for (name, balance) in [("admin", "1.00"), ("bob", "3.00")] {
            wsv.upsert_account_asset(AccountAsset {
                account_id: AccountId::new(name, "test"),
                asset_id: coin.clone(),
                balance: balance.parse::<Amount>().unwrap(),
            })
            .unwrap();
        }
        let admin_rows = wsv.get_account_assets(&AccountId::new("admin", "test"));
        assert_eq!(admin_rows.len(), 1);
        assert_eq!(admin_rows[0].balance.to_string(), "1.00");
    }
}
