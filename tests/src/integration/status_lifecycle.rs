//! Status ledger behavior across the bus and the cache: monotonicity under
//! concurrent publishers, per-subscriber ordering, and the processor's
//! event translation feeding the gateway's cache listener.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::thread_rng;
use tokio::time::timeout;

use shared_bus::{StatusBus, StatusCache, StatusFilter};
use shared_types::{TransactionStatus, TxStatus};

fn lifecycle_updates(hash: [u8; 32]) -> Vec<TransactionStatus> {
    vec![
        TransactionStatus::stateless_success(hash),
        TransactionStatus::mst_pending(hash),
        TransactionStatus::enough_signatures(hash),
        TransactionStatus::stateful_success(hash),
        TransactionStatus::committed(hash),
    ]
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_shuffled_publishers_converge_to_max_ordinal() {
    let cache = Arc::new(StatusCache::new());
    let hash = [1u8; 32];

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        let mut updates = lifecycle_updates(hash);
        updates.shuffle(&mut thread_rng());
        tasks.push(tokio::spawn(async move {
            for update in updates {
                cache.insert_if_newer(update);
                tokio::task::yield_now().await;
            }
        }));
    }
    for task in tasks {
        task.await.expect("publisher task");
    }

    assert_eq!(cache.find(&hash).expect("cached").status, TxStatus::Committed);
}

#[tokio::test]
async fn every_subscriber_sees_publish_order() {
    let bus = Arc::new(StatusBus::new());
    let hash = [2u8; 32];
    let mut subscribers: Vec<_> = (0..3)
        .map(|_| bus.subscribe(StatusFilter::hash(hash)))
        .collect();

    for update in lifecycle_updates(hash) {
        bus.publish(update);
    }

    for sub in &mut subscribers {
        let mut seen = Vec::new();
        for _ in 0..5 {
            let status = timeout(Duration::from_millis(200), sub.recv())
                .await
                .expect("timeout")
                .expect("closed");
            seen.push(status.status);
        }
        assert_eq!(
            seen,
            vec![
                TxStatus::StatelessValidationSuccess,
                TxStatus::MstPending,
                TxStatus::EnoughSignaturesCollected,
                TxStatus::StatefulValidationSuccess,
                TxStatus::Committed,
            ]
        );
    }
}

#[tokio::test]
async fn late_subscriber_misses_nothing_thanks_to_the_cache() {
    let bus = Arc::new(StatusBus::new());
    let cache = Arc::new(StatusCache::new());
    let hash = [3u8; 32];

    // A listener mirrors the bus into the cache, the way the gateway does.
    let mut listener_sub = bus.subscribe(StatusFilter::all());
    let listener_cache = Arc::clone(&cache);
    let listener = tokio::spawn(async move {
        while let Some(status) = listener_sub.recv().await {
            listener_cache.insert_if_newer(status);
        }
    });

    for update in lifecycle_updates(hash) {
        bus.publish(update);
    }
    // Let the listener drain.
    tokio::time::sleep(Duration::from_millis(50)).await;

    // A client subscribing now sees nothing on the bus, but the cache
    // already holds the terminal status.
    let mut late = bus.subscribe(StatusFilter::hash(hash));
    assert!(late.try_recv().expect("open bus").is_none());
    assert_eq!(cache.find(&hash).expect("cached").status, TxStatus::Committed);

    drop(bus);
    listener.await.expect("listener ends when bus drops");
}

#[tokio::test]
async fn stale_redelivery_never_regresses_visible_status() {
    let cache = StatusCache::new();
    let hash = [4u8; 32];

    cache.insert_if_newer(TransactionStatus::committed(hash));
    // Re-delivery of every earlier status in the lifecycle.
    for update in lifecycle_updates(hash) {
        cache.insert_if_newer(update);
    }
    assert_eq!(cache.find(&hash).expect("cached").status, TxStatus::Committed);
}
