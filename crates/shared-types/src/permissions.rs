//! # Permission Model
//!
//! Authorization is two-tier. Role permissions are global: an account holds
//! them through its roles and they authorize commands on any account.
//! Grantable permissions are scoped: one account grants another the right to
//! act on the grantor's own resources.
//!
//! Both sets are closed enums; a role's permissions are stored as a bitset.

use serde::{Deserialize, Serialize};

/// Role-based (global) permissions, one bit each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Permission {
    AddAssetQuantity = 0,
    SubtractAssetQuantity = 1,
    AddPeer = 2,
    AddSignatory = 3,
    RemoveSignatory = 4,
    AppendRole = 5,
    DetachRole = 6,
    CreateAccount = 7,
    CreateAsset = 8,
    CreateDomain = 9,
    CreateRole = 10,
    SetQuorum = 11,
    SetAccountDetail = 12,
    Transfer = 13,
    Receive = 14,
    GrantAddSignatory = 15,
    GrantRemoveSignatory = 16,
    GrantSetQuorum = 17,
    GrantSetAccountDetail = 18,
    GrantTransfer = 19,
}

impl Permission {
    /// Number of permissions in the closed set.
    pub const COUNT: u8 = 20;

    /// All permissions, in bit order.
    pub const ALL: [Permission; Self::COUNT as usize] = [
        Permission::AddAssetQuantity,
        Permission::SubtractAssetQuantity,
        Permission::AddPeer,
        Permission::AddSignatory,
        Permission::RemoveSignatory,
        Permission::AppendRole,
        Permission::DetachRole,
        Permission::CreateAccount,
        Permission::CreateAsset,
        Permission::CreateDomain,
        Permission::CreateRole,
        Permission::SetQuorum,
        Permission::SetAccountDetail,
        Permission::Transfer,
        Permission::Receive,
        Permission::GrantAddSignatory,
        Permission::GrantRemoveSignatory,
        Permission::GrantSetQuorum,
        Permission::GrantSetAccountDetail,
        Permission::GrantTransfer,
    ];

    fn bit(self) -> u32 {
        1u32 << (self as u8)
    }
}

/// Permissions one account can grant another over its own resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantablePermission {
    AddSignatory,
    RemoveSignatory,
    SetQuorum,
    SetAccountDetail,
    Transfer,
}

impl GrantablePermission {
    /// The role permission the grantor must hold to grant this.
    #[must_use]
    pub fn required_to_grant(self) -> Permission {
        match self {
            GrantablePermission::AddSignatory => Permission::GrantAddSignatory,
            GrantablePermission::RemoveSignatory => Permission::GrantRemoveSignatory,
            GrantablePermission::SetQuorum => Permission::GrantSetQuorum,
            GrantablePermission::SetAccountDetail => Permission::GrantSetAccountDetail,
            GrantablePermission::Transfer => Permission::GrantTransfer,
        }
    }
}

/// A set of role permissions, stored as a bitset over [`Permission`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissionSet(u32);

impl RolePermissionSet {
    /// The empty permission set.
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    /// Add a permission to the set.
    pub fn insert(&mut self, permission: Permission) {
        self.0 |= permission.bit();
    }

    /// True if the set contains the permission.
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    /// True if every permission in `self` is also in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &RolePermissionSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Union of two sets.
    #[must_use]
    pub fn union(&self, other: &RolePermissionSet) -> RolePermissionSet {
        RolePermissionSet(self.0 | other.0)
    }

    /// True if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate the contained permissions in bit order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        Permission::ALL
            .into_iter()
            .filter(move |p| self.contains(*p))
    }
}

impl FromIterator<Permission> for RolePermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = Self::empty();
        for p in iter {
            set.insert(p);
        }
        set
    }
}
