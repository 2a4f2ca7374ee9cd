//! The block commit pipeline across cl-state, cl-execution and cl-storage:
//! atomicity, chain advancement, retrievability and the prepare/commit race.

use crate::fixtures::{admin, bob, coin, credit_tx, encode, genesis, signed_tx, T0};
use cl_storage::{Storage, StorageError};
use shared_types::{Amount, AssetId, Block, Command};

fn bootstrapped() -> Storage {
    let storage = Storage::new();
    let mut mutable = storage.create_mutable_storage();
    assert!(mutable.apply(genesis(), |block, _, top| {
        block.height == 1 && block.prev_hash == *top
    }));
    storage.commit(mutable).expect("genesis commit");
    storage
}

fn block_with(storage: &Storage, transactions: Vec<shared_types::Transaction>) -> Block {
    Block {
        height: storage.height() + 1,
        prev_hash: storage.top_hash(),
        created_at: T0 + storage.height(),
        transactions,
        rejected_hashes: vec![],
    }
}

#[test]
fn applied_block_advances_top_hash_and_indexes_transactions() {
    let storage = bootstrapped();
    let tx = credit_tx("1.0", T0 + 1);
    let tx_hash = tx.hash();
    let block = block_with(&storage, vec![tx]);
    let block_hash = block.hash();

    let mut mutable = storage.create_mutable_storage();
    assert!(mutable.apply(block, |b, _, top| b.prev_hash == *top));
    storage.commit(mutable).expect("commit");

    assert_eq!(storage.top_hash(), block_hash);
    assert!(storage.has_transaction(&tx_hash));
    assert_eq!(storage.account_transactions(&admin()), vec![tx_hash]);
    assert_eq!(
        storage.account_asset_transactions(&admin(), &coin()),
        vec![tx_hash]
    );
    let view = storage.view();
    assert_eq!(
        view.get_account_asset(&admin(), &coin())
            .expect("balance row")
            .balance
            .to_string(),
        "1.0"
    );
}

#[test]
fn two_tx_block_with_poisoned_second_tx_leaves_no_effects() {
    let storage = bootstrapped();
    let good = credit_tx("1.0", T0 + 1);
    let bad = signed_tx(
        vec![Command::AddAssetQuantity {
            account_id: admin(),
            asset_id: AssetId::new("ghost", "test"),
            amount: "1.0".parse::<Amount>().unwrap(),
        }],
        T0 + 2,
        1,
    );
    let good_hash = good.hash();
    let block = block_with(&storage, vec![good, bad]);
    let pre_top = storage.top_hash();

    let mut mutable = storage.create_mutable_storage();
    assert!(!mutable.apply(block, |b, _, top| b.prev_hash == *top));
    storage.commit(mutable).expect("empty commit is a no-op");

    // Neither transaction's effects are visible, including the good one's.
    assert_eq!(storage.top_hash(), pre_top);
    assert_eq!(storage.height(), 1);
    assert!(!storage.has_transaction(&good_hash));
    assert!(storage
        .view()
        .get_account_asset(&admin(), &coin())
        .is_none());
    // Genesis effects are intact.
    assert!(storage.view().get_account(&admin()).is_some());
}

#[test]
fn speculative_sequence_preserves_earlier_blocks_on_later_failure() {
    let storage = bootstrapped();
    let mut mutable = storage.create_mutable_storage();

    let first = block_with(&storage, vec![credit_tx("2.0", T0 + 1)]);
    assert!(mutable.apply(first.clone(), |b, _, top| b.prev_hash == *top));

    // Second candidate fails; the first stays folded in the unit of work.
    let poisoned = Block {
        height: first.height + 1,
        prev_hash: first.hash(),
        created_at: T0 + 2,
        transactions: vec![signed_tx(
            vec![Command::SubtractAssetQuantity {
                account_id: admin(),
                asset_id: coin(),
                amount: "9.0".parse::<Amount>().unwrap(),
            }],
            T0 + 3,
            1,
        )],
        rejected_hashes: vec![],
    };
    assert!(!mutable.apply(poisoned, |b, _, top| b.prev_hash == *top));
    assert_eq!(mutable.top_hash(), first.hash());
    assert_eq!(
        mutable
            .wsv()
            .get_account_asset(&admin(), &coin())
            .expect("first block's credit")
            .balance
            .to_string(),
        "2.0"
    );

    storage.commit(mutable).expect("commit");
    assert_eq!(storage.height(), 2);
}

#[test]
fn transfer_scenario_round_trips_through_a_block() {
    let storage = bootstrapped();
    let transactions = vec![
        credit_tx("5.0", T0 + 1),
        signed_tx(
            vec![Command::TransferAsset {
                src_account_id: admin(),
                dest_account_id: bob(),
                asset_id: coin(),
                description: "settlement".into(),
                amount: "2.5".parse::<Amount>().unwrap(),
            }],
            T0 + 2,
            1,
        ),
    ];
    let block = block_with(&storage, transactions);
    let mut mutable = storage.create_mutable_storage();
    assert!(mutable.apply(block, |b, _, top| b.prev_hash == *top));
    storage.commit(mutable).expect("commit");

    let view = storage.view();
    assert_eq!(
        view.get_account_asset(&admin(), &coin())
            .unwrap()
            .balance
            .to_string(),
        "2.5"
    );
    assert_eq!(
        view.get_account_asset(&bob(), &coin())
            .unwrap()
            .balance
            .to_string(),
        "2.5"
    );
}

#[test]
fn prepared_block_survives_only_if_head_is_unchanged() {
    let storage = bootstrapped();

    let candidate = block_with(&storage, vec![credit_tx("1.0", T0 + 1)]);
    let rival = block_with(&storage, vec![credit_tx("7.0", T0 + 9)]);

    let prepared = storage.prepare_block(candidate).expect("prepare");

    // A rival block lands first through the ordinary path.
    let mut mutable = storage.create_mutable_storage();
    assert!(mutable.apply(rival, |b, _, top| b.prev_hash == *top));
    storage.commit(mutable).expect("rival commit");

    let err = storage.commit_prepared(prepared).unwrap_err();
    assert!(matches!(err, StorageError::StalePreparedState { .. }));

    // The rival's effect is the only one visible.
    assert_eq!(storage.height(), 2);
    assert_eq!(
        storage
            .view()
            .get_account_asset(&admin(), &coin())
            .unwrap()
            .balance
            .to_string(),
        "7.0"
    );

    // Re-preparing against the new head succeeds.
    let retry = block_with(&storage, vec![credit_tx("1.0", T0 + 1)]);
    let prepared = storage.prepare_block(retry).expect("re-prepare");
    storage.commit_prepared(prepared).expect("commit prepared");
    assert_eq!(storage.height(), 3);
}

#[test]
fn committed_blocks_round_trip_through_serialization() {
    let storage = bootstrapped();
    let block = storage.get_block(1).expect("no corruption").expect("exists");
    let bytes = encode(&block.transactions[0]);
    let decoded: shared_types::Transaction = bincode::deserialize(&bytes).expect("decodes");
    assert_eq!(decoded.hash(), block.transactions[0].hash());
}
