//! # Block Index
//!
//! Secondary indices over committed blocks: transaction presence by hash,
//! plus (account) and (account, asset) references used to answer "which
//! transactions touched this balance". Maintained append-only alongside the
//! block store.

use std::collections::{HashMap, HashSet};

use shared_types::{AccountId, AssetId, Block, Command, Hash};

/// Indexes committed transactions for point lookups.
#[derive(Debug, Clone, Default)]
pub struct BlockIndex {
    tx_hashes: HashSet<Hash>,
    by_account: HashMap<AccountId, Vec<Hash>>,
    by_account_asset: HashMap<(AccountId, AssetId), Vec<Hash>>,
}

impl BlockIndex {
    /// An empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every transaction of a committed block.
    pub fn index_block(&mut self, block: &Block) {
        for tx in &block.transactions {
            let hash = tx.hash();
            self.tx_hashes.insert(hash);
            self.by_account
                .entry(tx.payload.creator.clone())
                .or_default()
                .push(hash);
            for command in &tx.payload.commands {
                for key in asset_references(command) {
                    self.by_account_asset.entry(key).or_default().push(hash);
                }
            }
        }
    }

    /// True if a committed block contains the transaction.
    #[must_use]
    pub fn has_transaction(&self, hash: &Hash) -> bool {
        self.tx_hashes.contains(hash)
    }

    /// Hashes of transactions created by an account, in commit order.
    #[must_use]
    pub fn account_transactions(&self, account: &AccountId) -> &[Hash] {
        self.by_account
            .get(account)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Hashes of transactions that touched an (account, asset) balance.
    #[must_use]
    pub fn account_asset_transactions(
        &self,
        account: &AccountId,
        asset: &AssetId,
    ) -> &[Hash] {
        self.by_account_asset
            .get(&(account.clone(), asset.clone()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// The (account, asset) balance rows a command touches.
fn asset_references(command: &Command) -> Vec<(AccountId, AssetId)> {
    match command {
        Command::AddAssetQuantity {
            account_id,
            asset_id,
            ..
        }
        | Command::SubtractAssetQuantity {
            account_id,
            asset_id,
            ..
        } => vec![(account_id.clone(), asset_id.clone())],
        Command::TransferAsset {
            src_account_id,
            dest_account_id,
            asset_id,
            ..
        } => vec![
            (src_account_id.clone(), asset_id.clone()),
            (dest_account_id.clone(), asset_id.clone()),
        ],
        _ => Vec::new(),
    }
}
