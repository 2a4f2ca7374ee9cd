//! # Genesis Builder
//!
//! Assembles the first block of a fresh chain: domains, roles, accounts and
//! assets seeded before any client transaction exists. Genesis commands are
//! applied without stateful validation, under a creator-less context, so the
//! builder's ordering (roles before accounts that use them) is the only
//! correctness rule the caller must follow.

use cl_storage::GENESIS_PARENT_HASH;
use shared_types::{
    AccountId, Block, Command, Permission, PublicKey, RolePermissionSet, Timestamp,
    Transaction, TransactionPayload,
};

/// Accumulates genesis commands into block 1.
#[derive(Debug, Default)]
pub struct GenesisBuilder {
    commands: Vec<Command>,
    created_at: Timestamp,
}

impl GenesisBuilder {
    /// Start an empty genesis block at the given creation time.
    #[must_use]
    pub fn new(created_at: Timestamp) -> Self {
        Self {
            commands: Vec::new(),
            created_at,
        }
    }

    /// Add a domain with its default role.
    #[must_use]
    pub fn domain(mut self, domain_id: &str, default_role: &str) -> Self {
        self.commands.push(Command::CreateDomain {
            domain_id: domain_id.to_owned(),
            default_role: default_role.to_owned(),
        });
        self
    }

    /// Add a role carrying a permission set.
    #[must_use]
    pub fn role(mut self, role_name: &str, permissions: &[Permission]) -> Self {
        self.commands.push(Command::CreateRole {
            role_name: role_name.to_owned(),
            permissions: permissions.iter().copied().collect::<RolePermissionSet>(),
        });
        self
    }

    /// Add an account with one signatory key.
    #[must_use]
    pub fn account(mut self, name: &str, domain_id: &str, public_key: PublicKey) -> Self {
        self.commands.push(Command::CreateAccount {
            account_name: name.to_owned(),
            domain_id: domain_id.to_owned(),
            public_key,
        });
        self
    }

    /// Attach an extra role to an account created earlier.
    #[must_use]
    pub fn attach_role(mut self, account: AccountId, role_name: &str) -> Self {
        self.commands.push(Command::AppendRole {
            account_id: account,
            role_name: role_name.to_owned(),
        });
        self
    }

    /// Add an asset definition.
    #[must_use]
    pub fn asset(mut self, name: &str, domain_id: &str, precision: u8) -> Self {
        self.commands.push(Command::CreateAsset {
            asset_name: name.to_owned(),
            domain_id: domain_id.to_owned(),
            precision,
        });
        self
    }

    /// Assemble block 1. The genesis transaction is unsigned; the apply
    /// prologue for genesis accepts it without signature checks.
    #[must_use]
    pub fn build(self) -> Block {
        let tx = Transaction {
            payload: TransactionPayload {
                creator: AccountId::new("genesis", "genesis"),
                commands: self.commands,
                created_at: self.created_at,
                quorum: 1,
                batch: None,
            },
            signatures: vec![],
        };
        Block {
            height: 1,
            prev_hash: GENESIS_PARENT_HASH,
            created_at: self.created_at,
            transactions: vec![tx],
            rejected_hashes: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_block_one_on_the_zero_parent() {
        let block = GenesisBuilder::new(1_700_000_000_000)
            .domain("test", "user")
            .role("user", &[])
            .role("admin", &[Permission::AddAssetQuantity])
            .account("admin", "test", [1u8; 32])
            .attach_role(AccountId::new("admin", "test"), "admin")
            .asset("coin", "test", 2)
            .build();

        assert_eq!(block.height, 1);
        assert_eq!(block.prev_hash, GENESIS_PARENT_HASH);
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.transactions[0].payload.commands.len(), 6);
    }
}
