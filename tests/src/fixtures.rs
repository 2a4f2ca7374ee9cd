//! Shared test fixtures: a seeded chain and signed transaction builders.

use node_runtime::GenesisBuilder;
use shared_types::{
    AccountId, AssetId, Amount, Block, Command, Permission, Transaction,
    TransactionPayload, TransactionSignature,
};

/// Fixed creation time so hashes are stable across a test.
pub const T0: u64 = 1_700_000_000_000;

/// `admin@test`, the seeded operator account.
#[must_use]
pub fn admin() -> AccountId {
    AccountId::new("admin", "test")
}

/// `bob@test`, a plain seeded account.
#[must_use]
pub fn bob() -> AccountId {
    AccountId::new("bob", "test")
}

/// `coin#test` at precision 1.
#[must_use]
pub fn coin() -> AssetId {
    AssetId::new("coin", "test")
}

/// Genesis block: domain `test`, an operator role on `admin@test`, a
/// receiver role as the domain default, and `coin#test` at precision 1.
#[must_use]
pub fn genesis() -> Block {
    GenesisBuilder::new(T0)
        .domain("test", "user")
        .role("user", &[Permission::Receive])
        .role(
            "operator",
            &[
                Permission::AddAssetQuantity,
                Permission::SubtractAssetQuantity,
                Permission::Transfer,
                Permission::Receive,
                Permission::CreateAccount,
                Permission::CreateAsset,
                Permission::CreateDomain,
                Permission::AddSignatory,
                Permission::SetQuorum,
                Permission::GrantSetAccountDetail,
            ],
        )
        .account("admin", "test", [1u8; 32])
        .attach_role(admin(), "operator")
        .account("bob", "test", [2u8; 32])
        .asset("coin", "test", 1)
        .build()
}

/// A signed transaction from `admin@test`.
#[must_use]
pub fn signed_tx(commands: Vec<Command>, created_at: u64, quorum: u32) -> Transaction {
    Transaction {
        payload: TransactionPayload {
            creator: admin(),
            commands,
            created_at,
            quorum,
            batch: None,
        },
        signatures: vec![TransactionSignature {
            public_key: [1u8; 32],
            signature: [0u8; 64],
        }],
    }
}

/// An `AddAssetQuantity` of `amount` (already at the asset scale) for admin.
#[must_use]
pub fn credit_tx(amount: &str, created_at: u64) -> Transaction {
    signed_tx(
        vec![Command::AddAssetQuantity {
            account_id: admin(),
            asset_id: coin(),
            amount: amount.parse::<Amount>().expect("amount literal"),
        }],
        created_at,
        1,
    )
}

/// Serialize a transaction the way clients submit it.
#[must_use]
pub fn encode(tx: &Transaction) -> Vec<u8> {
    bincode::serialize(tx).expect("transaction serializes")
}
