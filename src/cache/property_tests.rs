//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the hit/miss partition and the single-compute
//! guarantee of the batch accessor over arbitrary key sets.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::{compute_fn, BatchAccessor, RefreshCoordinator};
use crate::store::{CacheStore, MemoryStore};

// == Test Configuration ==
const TEST_EXPIRY: Duration = Duration::from_secs(300);
const TEST_WINDOW: Duration = Duration::from_secs(60);
const SEEDED_TTL: Duration = Duration::from_secs(60);

// == Strategies ==
/// Generates valid cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,32}"
}

/// Generates payloads, including empty ones
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

/// Generates requested keys plus the subset already cached, with values
fn partition_strategy() -> impl Strategy<Value = (HashSet<String>, HashMap<String, String>)> {
    prop::collection::hash_set(valid_key_strategy(), 0..24).prop_flat_map(|keys| {
        let ordered: Vec<String> = keys.iter().cloned().collect();
        let len = ordered.len();
        (
            Just(keys),
            prop::collection::vec((any::<bool>(), value_strategy()), len).prop_map(
                move |flags| {
                    ordered
                        .iter()
                        .zip(flags)
                        .filter(|(_, (cached, _))| *cached)
                        .map(|(key, (_, value))| (key.clone(), value))
                        .collect::<HashMap<_, _>>()
                },
            ),
        )
    })
}

async fn seeded_store(cached: &HashMap<String, String>) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (key, value) in cached {
        store.write_with_expiry(key, value, SEEDED_TTL.as_secs()).await.unwrap();
    }
    store
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // *For any* key set K with a cached subset H, fetch_batch returns H
    // unchanged and calls compute exactly once with K \ H (never when empty).
    #[test]
    fn prop_batch_partition((keys, cached) in partition_strategy()) {
        tokio_test::block_on(async {
            let store = seeded_store(&cached).await;
            let accessor = BatchAccessor::new(store.clone());

            let calls: Mutex<Vec<HashSet<String>>> = Mutex::new(Vec::new());
            let origin = compute_fn(|missing, batch| {
                calls.lock().unwrap().push(missing.clone());
                for key in missing {
                    batch.write(key.clone(), format!("computed:{}", key));
                }
                Ok(())
            });

            let results = accessor
                .fetch_batch(&keys, TEST_EXPIRY, Some(&origin))
                .await
                .unwrap();

            let expected_misses: HashSet<String> = keys
                .iter()
                .filter(|k| !cached.contains_key(*k))
                .cloned()
                .collect();
            let calls = calls.into_inner().unwrap();

            if expected_misses.is_empty() {
                prop_assert!(calls.is_empty(), "compute called without misses");
            } else {
                prop_assert_eq!(calls.len(), 1, "compute must run once per batch");
                prop_assert_eq!(&calls[0], &expected_misses);
            }

            prop_assert_eq!(results.len(), keys.len());
            for (key, value) in &cached {
                prop_assert_eq!(results.get(key), Some(value));
            }
            for key in &expected_misses {
                let expected = format!("computed:{}", key);
                prop_assert_eq!(results.get(key), Some(&expected));
            }

            let stats = store.stats().await;
            prop_assert_eq!(stats.bulk_reads, if keys.is_empty() { 0 } else { 1 });
            Ok(())
        })?;
    }

    // *For any* key set, every hit is re-written with the fetch expiry.
    #[test]
    fn prop_hits_written_back((keys, cached) in partition_strategy()) {
        tokio_test::block_on(async {
            let store = seeded_store(&cached).await;
            let accessor = BatchAccessor::new(store.clone());

            accessor.fetch_batch(&keys, TEST_EXPIRY, None).await.unwrap();

            for key in cached.keys() {
                let remaining = store.ttl_remaining(key).await.unwrap();
                prop_assert!(remaining > SEEDED_TTL, "hit '{}' kept its old TTL", key);
            }
            let stats = store.stats().await;
            prop_assert_eq!(stats.writes as usize, cached.len() * 2);
            Ok(())
        })?;
    }

    // *For any* key set, a fresh refresh window elects the caller, who
    // computes the full set regardless of what is cached.
    #[test]
    fn prop_refresher_computes_full_set((keys, cached) in partition_strategy()) {
        prop_assume!(!keys.is_empty());
        tokio_test::block_on(async {
            let store = seeded_store(&cached).await;
            let coordinator =
                RefreshCoordinator::new(BatchAccessor::new(store.clone()), store.clone());

            let calls: Mutex<Vec<HashSet<String>>> = Mutex::new(Vec::new());
            let origin = compute_fn(|requested, batch| {
                calls.lock().unwrap().push(requested.clone());
                for key in requested {
                    batch.write(key.clone(), "refreshed");
                }
                Ok(())
            });

            let results = coordinator
                .fetch_with_refresh("refresh-lock/prop", TEST_WINDOW, &keys, TEST_EXPIRY, &origin)
                .await
                .unwrap();

            let calls = calls.into_inner().unwrap();
            prop_assert_eq!(calls.len(), 1);
            prop_assert_eq!(&calls[0], &keys);
            prop_assert!(results.values().all(|v| v == "refreshed"));
            for key in &keys {
                let peeked = store.peek(key).await;
                prop_assert_eq!(peeked.as_deref(), Some("refreshed"));
                let remaining = store.ttl_remaining(key).await.unwrap();
                prop_assert!(remaining > SEEDED_TTL, "'{}' not written with the fetch expiry", key);
            }
            Ok(())
        })?;
    }
}
