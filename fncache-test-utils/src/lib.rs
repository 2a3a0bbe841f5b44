//! fncache Test Utilities
//!
//! Centralized test infrastructure for the fncache workspace:
//! - Sample pure functions
//! - Store fixtures wired to a recording sink
//! - A call-counting combinator
//! - Proptest generators for identifiers and argument lists

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

// Re-export core types for convenience
pub use fncache_core::{
    CacheEvent, EntryKey, Fingerprint, KeyError, Location, MemoError, MemoResult, RecordingSink,
    RegistryError, StorageError,
};
pub use fncache_memoize::{Callable, CallableExt, Logged, Memoized, Registry};
pub use fncache_storage::{CacheStats, DiskStore, MemoryStore, ValueStore};

// ============================================================================
// SAMPLE FUNCTIONS
// ============================================================================

/// Naive Fibonacci. Exponential without a cache.
pub fn fib(n: u64) -> u64 {
    if n < 2 {
        n
    } else {
        fib(n - 1) + fib(n - 2)
    }
}

/// Multiply every element by `factor`.
pub fn times(v: Vec<i32>, factor: i32) -> Vec<i32> {
    v.into_iter().map(|i| i * factor).collect()
}

// ============================================================================
// STORE FIXTURES
// ============================================================================

/// A disk store in a fresh temporary directory.
///
/// The directory is removed when the fixture is dropped, so keep it alive for
/// as long as the store is used.
pub struct TempDiskStore {
    pub store: Arc<DiskStore>,
    pub sink: RecordingSink,
    _dir: TempDir,
}

impl TempDiskStore {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let sink = RecordingSink::new();
        let store = DiskStore::open(dir.path().join("cache"))
            .expect("Failed to open disk store")
            .with_sink(Arc::new(sink.clone()));
        Self {
            store: Arc::new(store),
            sink,
            _dir: dir,
        }
    }

    /// Names of records currently on disk.
    pub fn records(&self) -> Vec<String> {
        self.store.records().expect("Failed to list records")
    }
}

impl Default for TempDiskStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A memory store wired to a fresh recording sink.
pub fn recorded_memory_store() -> (Arc<MemoryStore>, RecordingSink) {
    let sink = RecordingSink::new();
    let store = MemoryStore::new().with_sink(Arc::new(sink.clone()));
    (Arc::new(store), sink)
}

// ============================================================================
// COMBINATORS
// ============================================================================

/// Counts how many times the wrapped callable actually runs.
///
/// Clones share the counter.
#[derive(Clone)]
pub struct Counted<C> {
    inner: C,
    calls: Arc<AtomicUsize>,
}

impl<C> Counted<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A handle that reads the counter after `self` has been moved into a
    /// wrapper.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl<C, A> Callable<A> for Counted<C>
where
    C: Callable<A>,
{
    type Output = C::Output;

    fn invoke(&self, args: A) -> C::Output {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.invoke(args)
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use proptest::prelude::*;

    /// Identifiers that are valid record names.
    pub fn identifier() -> impl Strategy<Value = String> {
        "[a-zA-Z_][a-zA-Z0-9_-]{0,23}"
    }

    /// Identifiers every store must reject.
    pub fn invalid_identifier() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just(".".to_string()),
            Just("..".to_string()),
            "[a-z]{1,8}/[a-z]{1,8}",
            "[a-z]{1,8}\\\\[a-z]{1,8}",
            "\\.[a-z]{1,8}",
            Just("f".repeat(fncache_core::MAX_IDENTIFIER_LEN + 1)),
        ]
    }

    /// Two-argument lists of mixed types.
    pub fn pair_args() -> impl Strategy<Value = (i64, String)> {
        (any::<i64>(), "[a-z0-9 ]{0,16}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fib_values() {
        assert_eq!(fib(0), 0);
        assert_eq!(fib(1), 1);
        assert_eq!(fib(10), 55);
        assert_eq!(fib(12), 144);
    }

    #[test]
    fn test_counted_counts_invocations() {
        let counted = Counted::new(|x: i32| x + 1);
        assert_eq!(counted.invoke((1,)), 2);
        assert_eq!(counted.invoke((2,)), 3);
        assert_eq!(counted.calls(), 2);
    }

    #[test]
    fn test_temp_disk_store_starts_empty() {
        let fixture = TempDiskStore::new();
        assert!(fixture.records().is_empty());
        assert!(fixture.sink.events().is_empty());
    }
}
