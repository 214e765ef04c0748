//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a plain `HashMap` model.

use proptest::prelude::*;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::cache::{StoreConfig, TtlStore};

// == Test Configuration ==
const LONG_TTL: Duration = Duration::from_secs(300);
const SLOW_SWEEP: Duration = Duration::from_secs(3600);

// == Helpers ==
fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn block_on<F: Future>(future: F) -> F::Output {
    runtime().block_on(future)
}

fn new_store(ttl: Duration) -> TtlStore<String> {
    TtlStore::new(
        StoreConfig {
            ttl,
            eviction_interval: SLOW_SWEEP,
        },
        &CancellationToken::new(),
    )
}

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any interleaving of set/get/delete behaves like a HashMap while nothing expires
    #[test]
    fn prop_matches_hashmap_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        block_on(async {
            let store = new_store(LONG_TTL);
            let mut model: HashMap<String, String> = HashMap::new();

            for op in ops {
                match op {
                    CacheOp::Set { key, value } => {
                        store.set(key.clone(), value.clone()).await;
                        model.insert(key, value);
                    }
                    CacheOp::Get { key } => {
                        prop_assert_eq!(store.get(&key).await, model.get(&key).cloned());
                    }
                    CacheOp::Delete { key } => {
                        store.delete(&key).await;
                        model.remove(&key);
                    }
                }
            }

            prop_assert_eq!(store.len().await, model.len());
            Ok(())
        })?;
    }

    // Delete hides a key regardless of what happened to it before
    #[test]
    fn prop_delete_always_misses(
        ops in prop::collection::vec(cache_op_strategy(), 0..30),
        key in key_strategy()
    ) {
        block_on(async {
            let store = new_store(LONG_TTL);
            for op in ops {
                match op {
                    CacheOp::Set { key, value } => store.set(key, value).await,
                    CacheOp::Get { key } => {
                        let _ = store.get(&key).await;
                    }
                    CacheOp::Delete { key } => store.delete(&key).await,
                }
            }

            store.delete(&key).await;
            prop_assert_eq!(store.get(&key).await, None);
            Ok(())
        })?;
    }

    // A sweep never touches live entries
    #[test]
    fn prop_delete_expired_keeps_live_entries(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 0..20)
    ) {
        block_on(async {
            let store = new_store(LONG_TTL);
            for (key, value) in &entries {
                store.set(key.clone(), value.clone()).await;
            }

            prop_assert_eq!(store.delete_expired().await, 0);
            for (key, value) in &entries {
                let stored = store.get(key).await;
                prop_assert_eq!(stored.as_ref(), Some(value));
            }
            Ok(())
        })?;
    }

    // With a zero TTL nothing is ever visible, and one sweep clears the table
    #[test]
    fn prop_zero_ttl_never_visible(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 1..20)
    ) {
        block_on(async {
            let store = new_store(Duration::ZERO);
            for (key, value) in &entries {
                store.set(key.clone(), value.clone()).await;
                prop_assert_eq!(store.get(key).await, None);
            }

            prop_assert_eq!(store.delete_expired().await, entries.len());
            prop_assert!(store.is_empty().await);
            Ok(())
        })?;
    }
}

// Fewer cases for the time-sensitive check
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in value_strategy()) {
        block_on(async {
            let store = new_store(Duration::from_millis(50));

            store.set(key.clone(), value.clone()).await;
            prop_assert_eq!(store.get(&key).await, Some(value));

            tokio::time::sleep(Duration::from_millis(80)).await;

            prop_assert_eq!(store.get(&key).await, None);
            Ok(())
        })?;
    }
}
