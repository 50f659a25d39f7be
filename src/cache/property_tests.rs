//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the TTL cache and key derivation against
//! arbitrary operation sequences and parameter sets.

use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::cache::{derive_key, TtlCache};

// == Test Configuration ==
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,16}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

/// Generates a sequence of cache operations for testing
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

fn params_strategy() -> impl Strategy<Value = BTreeMap<String, u32>> {
    prop::collection::btree_map(key_strategy(), any::<u32>(), 0..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hits and misses match a model map replayed alongside the cache.
    #[test]
    fn prop_cache_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut cache = TtlCache::new(TEST_DEFAULT_TTL);
        let mut model: HashMap<String, String> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key.clone(), value.clone(), None);
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    let got = cache.get(&key);
                    prop_assert_eq!(got.as_ref(), model.get(&key));
                    if got.is_some() {
                        expected_hits += 1;
                    } else {
                        expected_misses += 1;
                    }
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(cache.delete(&key), model.remove(&key).is_some());
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_entries, model.len());
    }

    // A delete always wins over a fill that started before it.
    #[test]
    fn prop_fill_after_delete_is_dropped(key in key_strategy(), value in value_strategy()) {
        let mut cache = TtlCache::new(TEST_DEFAULT_TTL);
        let epoch = cache.epoch();

        cache.delete(&key);

        prop_assert!(!cache.set_if_epoch(key.clone(), value, None, epoch));
        prop_assert_eq!(cache.get(&key), None);
    }

    // Sweeping live entries removes nothing, and a second sweep is a no-op.
    #[test]
    fn prop_cleanup_keeps_live_entries(keys in prop::collection::hash_set(key_strategy(), 0..20)) {
        let mut cache = TtlCache::new(TEST_DEFAULT_TTL);
        for key in &keys {
            cache.set(key.clone(), 1u8, None);
        }

        prop_assert_eq!(cache.cleanup(), 0);
        prop_assert_eq!(cache.cleanup(), 0);
        prop_assert_eq!(cache.len(), keys.len());
    }

    // Insertion order never changes the derived key.
    #[test]
    fn prop_key_ignores_field_order(params in params_strategy()) {
        let forward: HashMap<&String, &u32> = params.iter().collect();
        let backward: HashMap<&String, &u32> = params.iter().rev().collect();

        prop_assert_eq!(
            derive_key("p", &forward).unwrap(),
            derive_key("p", &backward).unwrap()
        );
    }

    // Different parameter sets never share a key.
    #[test]
    fn prop_distinct_params_distinct_keys(a in params_strategy(), b in params_strategy()) {
        let key_a = derive_key("p", &a).unwrap();
        let key_b = derive_key("p", &b).unwrap();

        prop_assert_eq!(a == b, key_a == key_b);
    }
}
