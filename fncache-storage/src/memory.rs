//! Volatile store: an in-process table of type-tagged values.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use fncache_core::{CacheEvent, EntryKey, EventSink, Location, StorageError, TracingSink};

use crate::traits::{CacheStats, StatsCounters, ValueStore};

/// A stored value plus the name of its type, for mismatch reports.
struct Slot {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// In-memory store holding values of any `Clone + Send + Sync + 'static` type.
///
/// One table serves every result type. Asking for a key with a different
/// type than the one stored fails with [`StorageError::TypeMismatch`].
///
/// The table lock is held only for the lookup or the insert, never while the
/// wrapped function runs, so memoized functions may recurse into the store.
pub struct MemoryStore {
    table: RwLock<HashMap<EntryKey, Slot>>,
    sink: Arc<dyn EventSink>,
    counters: StatsCounters,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
            sink: Arc::new(TracingSink),
            counters: StatsCounters::default(),
        }
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Number of entries. A poisoned table counts as empty.
    pub fn len(&self) -> usize {
        self.table.read().map(|table| table.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any value is stored under `key`, whatever its type.
    pub fn contains(&self, key: &EntryKey) -> bool {
        self.table
            .read()
            .map(|table| table.contains_key(key))
            .unwrap_or(false)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValueStore<T> for MemoryStore
where
    T: Clone + Send + Sync + 'static,
{
    fn lookup(&self, key: &EntryKey) -> Result<Option<T>, StorageError> {
        let table = self.table.read().map_err(|_| StorageError::LockPoisoned)?;
        let Some(slot) = table.get(key) else {
            return Ok(None);
        };

        match slot.value.downcast_ref::<T>() {
            Some(value) => Ok(Some(value.clone())),
            None => Err(StorageError::TypeMismatch {
                key: key.record_name(),
                expected: type_name::<T>().to_string(),
                found: slot.type_name.to_string(),
            }),
        }
    }

    fn store(&self, key: &EntryKey, value: &T) -> Result<(), StorageError> {
        let slot = Slot {
            type_name: type_name::<T>(),
            value: Box::new(value.clone()),
        };
        self.table
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(key.clone(), slot);
        self.counters.record_write();
        Ok(())
    }

    fn location(&self, _key: &EntryKey) -> Location {
        Location::Memory
    }

    fn emit(&self, event: CacheEvent) {
        self.counters.observe(&event);
        self.sink.record(&event);
    }

    fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fncache_core::{MemoError, RecordingSink};
    use std::cell::Cell;

    fn key(identifier: &str, n: i32) -> EntryKey {
        EntryKey::derive(identifier, &(n,)).unwrap()
    }

    #[test]
    fn test_store_and_lookup() {
        let store = MemoryStore::new();
        let k = key("double", 4);

        store.store(&k, &8i32).unwrap();
        let value: Option<i32> = store.lookup(&k).unwrap();
        assert_eq!(value, Some(8));
        assert_eq!(store.len(), 1);
        assert!(store.contains(&k));
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let store = MemoryStore::new();
        let value: Option<String> = store.lookup(&key("missing", 0)).unwrap();
        assert!(value.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_type_mismatch_detected() {
        let store = MemoryStore::new();
        let k = EntryKey::seeded("answer", 42).unwrap();
        store.store(&k, &42i64).unwrap();

        let err = ValueStore::<String>::lookup(&store, &k).unwrap_err();
        assert_eq!(
            err,
            StorageError::TypeMismatch {
                key: "answer-42".to_string(),
                expected: type_name::<String>().to_string(),
                found: "i64".to_string(),
            }
        );
    }

    #[test]
    fn test_type_mismatch_surfaces_from_get_or_compute() {
        let store = MemoryStore::new();
        let k = EntryKey::seeded("answer", 42).unwrap();
        store.store(&k, &42i64).unwrap();

        let err = store
            .get_or_compute(&k, || "forty-two".to_string())
            .unwrap_err();
        assert!(matches!(
            err,
            MemoError::Storage(StorageError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_get_or_compute_emits_memory_events() {
        let sink = RecordingSink::new();
        let store = MemoryStore::new().with_sink(Arc::new(sink.clone()));
        let k = key("square", 12);
        let calls = Cell::new(0);

        for _ in 0..3 {
            let value = store
                .get_or_compute(&k, || {
                    calls.set(calls.get() + 1);
                    144
                })
                .unwrap();
            assert_eq!(value, 144);
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(sink.misses(), 1);
        assert_eq!(sink.hits(), 2);
        assert!(sink.events().iter().all(|e| matches!(
            e,
            CacheEvent::Hit { location: Location::Memory, .. }
                | CacheEvent::Miss { location: Location::Memory, .. }
        )));

        let stats = ValueStore::<i32>::stats(&store);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.writes, 1);
    }

    #[test]
    fn test_values_without_serde() {
        #[derive(Clone, Debug, PartialEq)]
        struct Handle(Arc<str>);

        let store = MemoryStore::new();
        let k = key("handle", 1);
        store.store(&k, &Handle("h".into())).unwrap();
        let value: Option<Handle> = store.lookup(&k).unwrap();
        assert_eq!(value, Some(Handle("h".into())));
    }

    #[test]
    fn test_distinct_identifiers_do_not_collide() {
        let store = MemoryStore::new();
        let a = EntryKey::seeded("a", 7).unwrap();
        let b = EntryKey::seeded("b", 7).unwrap();

        store.store(&a, &1u8).unwrap();
        store.store(&b, &2u8).unwrap();

        assert_eq!(ValueStore::<u8>::lookup(&store, &a).unwrap(), Some(1));
        assert_eq!(ValueStore::<u8>::lookup(&store, &b).unwrap(), Some(2));
    }

    #[test]
    fn test_shared_across_threads() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let k = key("thread", i);
                    store.get_or_compute(&k, || i * 10).unwrap()
                })
            })
            .collect();

        let results: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![0, 10, 20, 30]);
        assert_eq!(store.len(), 4);
    }
}
