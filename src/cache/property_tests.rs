//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check memory accounting and expiry behavior over
//! arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{CacheStore, SizeEstimate};
use crate::error::CacheError;

// == Test Configuration ==
const TEST_MAX_MEMORY: u64 = 1024 * 1024;

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

/// Generates values of varying size
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,128}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
    Flush,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => Just(CacheOp::Flush),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any operation sequence under any ceiling, the store agrees with a
    // simple model: same keys, same total size, same accept/reject decisions.
    #[test]
    fn prop_accounting_matches_model(
        max_memory in 1u64..512,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let store = CacheStore::new(max_memory);
        let mut model: HashMap<String, u64> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    let size = value.estimated_size();
                    let others: u64 = model
                        .iter()
                        .filter(|(k, _)| **k != key)
                        .map(|(_, s)| *s)
                        .sum();
                    let accepted = store.set(key.clone(), value, Duration::ZERO).is_ok();
                    prop_assert_eq!(accepted, others + size <= max_memory);
                    if accepted {
                        model.insert(key, size);
                    }
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key).is_some(), model.contains_key(&key));
                }
                CacheOp::Delete { key } => {
                    store.delete(&key);
                    model.remove(&key);
                }
                CacheOp::Flush => {
                    store.flush();
                    model.clear();
                }
            }

            prop_assert_eq!(store.current_size(), model.values().sum::<u64>());
            prop_assert_eq!(store.len(), model.len());
        }
    }

    // Setting a key twice leaves exactly the second value's size charged.
    #[test]
    fn prop_overwrite_accounting(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let store = CacheStore::new(TEST_MAX_MEMORY);

        store.set(key.clone(), value1, Duration::ZERO).unwrap();
        store.set(key.clone(), value2.clone(), Duration::ZERO).unwrap();

        prop_assert_eq!(store.current_size(), value2.len() as u64);
        prop_assert_eq!(store.get(&key), Some(value2));
        prop_assert_eq!(store.len(), 1);
    }

    // A value larger than the whole ceiling is refused and changes nothing.
    #[test]
    fn prop_overflow_rejection_leaves_table_unchanged(
        existing in prop::collection::vec((key_strategy(), "[a-z]{0,8}"), 0..5),
        key in key_strategy(),
        excess in 1usize..64
    ) {
        let max_memory = 64u64;
        let store = CacheStore::new(max_memory);
        for (k, v) in existing {
            let _ = store.set(k, v.to_string(), Duration::ZERO);
        }

        let size_before = store.current_size();
        let len_before = store.len();
        let value_before = store.get(&key);

        let oversized = "x".repeat(max_memory as usize + excess);
        let result = store.set(key.clone(), oversized, Duration::ZERO);

        let is_overflow = matches!(result, Err(CacheError::MemoryOverflow { .. }));
        prop_assert!(is_overflow);
        prop_assert_eq!(store.current_size(), size_before);
        prop_assert_eq!(store.len(), len_before);
        prop_assert_eq!(store.get(&key), value_before);
    }

    // Deleting an absent key is a no-op.
    #[test]
    fn prop_delete_idempotence(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 0..10),
        missing in "[x-z]{3}"
    ) {
        let store = CacheStore::new(TEST_MAX_MEMORY);
        for (k, v) in entries {
            store.set(k, v, Duration::ZERO).unwrap();
        }

        let size_before = store.current_size();
        let len_before = store.len();

        prop_assert!(!store.delete(&missing));
        prop_assert!(!store.delete(&missing));
        prop_assert_eq!(store.current_size(), size_before);
        prop_assert_eq!(store.len(), len_before);
    }

    // After flush nothing is left and nothing is retrievable.
    #[test]
    fn prop_flush_completeness(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..20)
    ) {
        let store = CacheStore::new(TEST_MAX_MEMORY);
        for (k, v) in &entries {
            store.set(k.clone(), v.clone(), Duration::from_secs(60)).unwrap();
        }

        store.flush();

        prop_assert_eq!(store.len(), 0);
        prop_assert_eq!(store.current_size(), 0);
        for (k, _) in &entries {
            prop_assert_eq!(store.get(k), None);
        }
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // A timed entry is readable before its TTL and gone after it; permanent
    // entries alongside it are untouched by both lazy expiry and the sweep.
    #[test]
    fn prop_ttl_and_permanent_entries(
        timed in prop::collection::vec(value_strategy(), 1..5),
        permanent in prop::collection::vec(value_strategy(), 1..5)
    ) {
        let store = CacheStore::new(TEST_MAX_MEMORY);
        let ttl = Duration::from_millis(60);

        for (i, v) in timed.iter().enumerate() {
            store.set(format!("timed_{}", i), v.clone(), ttl).unwrap();
        }
        for (i, v) in permanent.iter().enumerate() {
            store.set(format!("perm_{}", i), v.clone(), Duration::ZERO).unwrap();
        }

        prop_assert_eq!(store.get("timed_0"), Some(timed[0].clone()));

        sleep(Duration::from_millis(120));

        prop_assert_eq!(store.get("timed_0"), None);
        prop_assert_eq!(store.remove_expired(), timed.len() - 1);

        for (i, v) in permanent.iter().enumerate() {
            prop_assert_eq!(store.get(&format!("perm_{}", i)), Some(v.clone()));
        }
        let permanent_size: u64 = permanent.iter().map(|v| v.len() as u64).sum();
        prop_assert_eq!(store.current_size(), permanent_size);
    }
}

// == Property Test for Error Response Format ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error renders as JSON with an "error" string field.
    #[test]
    fn prop_error_response_format(
        message in "[a-zA-Z0-9 _-]{1,100}",
        size in 1u64..1_000_000
    ) {
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            CacheError::NotFound(message.clone()),
            CacheError::InvalidRequest(message.clone()),
            CacheError::MemoryOverflow { key: message.clone(), size, max_memory: size - 1 },
        ];

        for error in error_variants {
            let expected_msg = error.to_string();
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = tokio_test::block_on(to_bytes(response.into_body(), usize::MAX)).unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");

            prop_assert_eq!(json["error"].as_str(), Some(expected_msg.as_str()));
        }
    }
}

// == Property Test for Concurrent Operation Correctness ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // Concurrent tasks never leave the counter out of step with the entries.
    #[test]
    fn prop_concurrent_accounting(
        operations in prop::collection::vec(cache_op_strategy(), 10..60)
    ) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .build()
            .unwrap();

        let store = Arc::new(CacheStore::<String>::new(TEST_MAX_MEMORY));

        rt.block_on(async {
            let handles: Vec<_> = operations
                .into_iter()
                .map(|op| {
                    let store = Arc::clone(&store);
                    tokio::spawn(async move {
                        match op {
                            CacheOp::Set { key, value } => {
                                let _ = store.set(key, value, Duration::ZERO);
                            }
                            CacheOp::Get { key } => {
                                if let Some(value) = store.get(&key) {
                                    assert!(value.len() <= 128, "Value should be intact");
                                }
                            }
                            CacheOp::Delete { key } => {
                                store.delete(&key);
                            }
                            CacheOp::Flush => {
                                store.flush();
                            }
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.await.expect("Task should not panic");
            }
        });

        let letters = ["a", "b", "c", "d", "e"];
        let mut keys: Vec<String> = letters.iter().map(|s| s.to_string()).collect();
        for a in letters {
            for b in letters {
                keys.push(format!("{}{}", a, b));
            }
        }
        let live: u64 = keys
            .iter()
            .filter_map(|k| store.get(k))
            .map(|v| v.len() as u64)
            .sum();

        prop_assert_eq!(store.current_size(), live);
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    // SetMaxMemory("1KB"), two 900-byte writes: the second is refused.
    #[test]
    fn test_one_kilobyte_ceiling_example() {
        let store: CacheStore<String> = CacheStore::new(0);
        store.set_max_memory("1KB");

        assert!(store.set("a", "x".repeat(900), Duration::ZERO).is_ok());
        assert_eq!(store.len(), 1);

        assert!(store.set("b", "x".repeat(900), Duration::ZERO).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_error_status_codes() {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let test_cases = vec![
            (CacheError::NotFound("key".to_string()), StatusCode::NOT_FOUND),
            (CacheError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (
                CacheError::MemoryOverflow {
                    key: "key".to_string(),
                    size: 10,
                    max_memory: 5,
                },
                StatusCode::INSUFFICIENT_STORAGE,
            ),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(
                response.status(),
                expected_status,
                "Error should map to correct HTTP status"
            );
        }
    }
}
