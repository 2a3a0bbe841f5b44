//! Property-Based Tests for Memoized Calls
//!
//! Properties:
//! - A memoized call returns exactly what the bare function returns
//! - The second identical call is served from the store
//! - Invalid identifiers are rejected before the function runs

use std::sync::Arc;

use fncache_test_utils::generators::{identifier, invalid_identifier, pair_args};
use fncache_test_utils::{
    recorded_memory_store, Counted, EntryKey, KeyError, MemoError, Memoized, TempDiskStore,
};
use proptest::prelude::*;

fn describe(n: i64, label: String) -> String {
    format!("{label}:{}", n.wrapping_mul(3))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_memory_call_matches_bare_function(id in identifier(), (n, label) in pair_args()) {
        let (store, sink) = recorded_memory_store();
        let wrapped = Memoized::new(store, id.as_str(), describe);

        let expected = describe(n, label.clone());
        prop_assert_eq!(wrapped.call((n, label.clone())).unwrap(), expected.clone());
        prop_assert_eq!(wrapped.call((n, label)).unwrap(), expected);
        prop_assert_eq!(sink.misses(), 1);
        prop_assert_eq!(sink.hits(), 1);
    }

    #[test]
    fn prop_disk_call_runs_function_once(id in identifier(), (n, label) in pair_args()) {
        let fixture = TempDiskStore::new();
        let counted = Counted::new(describe);
        let runs = counted.counter();
        let wrapped = Memoized::new(Arc::clone(&fixture.store), id.as_str(), counted);

        let first = wrapped.call((n, label.clone())).unwrap();
        let second = wrapped.call((n, label.clone())).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(runs.load(std::sync::atomic::Ordering::SeqCst), 1);

        let key = EntryKey::derive(&id, &(n, label)).unwrap();
        prop_assert_eq!(fixture.records(), vec![key.record_name()]);
    }

    #[test]
    fn prop_invalid_identifier_never_computes(id in invalid_identifier(), n in any::<i64>()) {
        let (store, sink) = recorded_memory_store();
        let wrapped = Memoized::new(store, id.as_str(), |x: i64| -> i64 {
            panic!("must not run for {x}")
        });

        let err = wrapped.call((n,)).unwrap_err();
        let is_invalid = matches!(err, MemoError::Key(KeyError::InvalidIdentifier { .. }));
        prop_assert!(is_invalid);
        prop_assert!(sink.events().is_empty());
    }
}
