//! The value store capability and cache statistics.
//!
//! A store maps [`EntryKey`]s to results of one value type `T`. The trait is
//! generic over `T` rather than its methods so each backend can state its own
//! requirements: the durable store needs serde, the volatile store needs
//! `Clone + 'static`.

use std::sync::atomic::{AtomicU64, Ordering};

use fncache_core::{CacheEvent, EntryKey, Location, MemoError, MemoResult, StorageError};

/// Storage for memoized results of type `T`.
///
/// # Contract
///
/// - `lookup` never invokes the wrapped function.
/// - `store` overwrites silently. The wrapper calls it at most once per miss.
/// - `get_or_compute` is the composite primitive the wrapper relies on.
///
/// Implementations are `Send + Sync`, but two concurrent misses for the same
/// key both compute and the last write wins.
pub trait ValueStore<T>: Send + Sync {
    /// Return the stored result for `key`, if any.
    fn lookup(&self, key: &EntryKey) -> Result<Option<T>, StorageError>;

    /// Persist `value` under `key`.
    fn store(&self, key: &EntryKey, value: &T) -> Result<(), StorageError>;

    /// Where the entry for `key` lives (or would live).
    fn location(&self, key: &EntryKey) -> Location;

    /// Deliver an event to this store's counters and sink.
    fn emit(&self, event: CacheEvent);

    /// Current hit/miss statistics.
    fn stats(&self) -> CacheStats;

    /// Return the stored result, or compute, store and return it.
    ///
    /// A failed `store` does not fail the call: the computed value is
    /// returned and a [`CacheEvent::StoreFailed`] is emitted instead.
    fn get_or_compute<F>(&self, key: &EntryKey, compute: F) -> MemoResult<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.lookup(key)? {
            self.emit(CacheEvent::Hit {
                identifier: key.identifier().to_string(),
                location: self.location(key),
            });
            return Ok(value);
        }

        let value = compute();
        self.emit(CacheEvent::Miss {
            identifier: key.identifier().to_string(),
            location: self.location(key),
        });
        self.persist(key, &value);
        Ok(value)
    }

    /// Like [`ValueStore::get_or_compute`] for fallible functions.
    ///
    /// An `Err` from `compute` is returned untouched and nothing is stored.
    fn get_or_try_compute<E, F>(&self, key: &EntryKey, compute: F) -> Result<T, E>
    where
        E: From<MemoError>,
        F: FnOnce() -> Result<T, E>,
    {
        let cached = self
            .lookup(key)
            .map_err(|e| E::from(MemoError::from(e)))?;
        if let Some(value) = cached {
            self.emit(CacheEvent::Hit {
                identifier: key.identifier().to_string(),
                location: self.location(key),
            });
            return Ok(value);
        }

        let value = compute()?;
        self.emit(CacheEvent::Miss {
            identifier: key.identifier().to_string(),
            location: self.location(key),
        });
        self.persist(key, &value);
        Ok(value)
    }

    /// Store `value`, reporting a failure as an event rather than an error.
    fn persist(&self, key: &EntryKey, value: &T) {
        if let Err(error) = self.store(key, value) {
            self.emit(CacheEvent::StoreFailed {
                identifier: key.identifier().to_string(),
                location: self.location(key),
                error,
            });
        }
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of results written.
    pub writes: u64,
    /// Number of results that could not be written.
    pub store_failures: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Lock-free counters behind [`CacheStats`].
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    store_failures: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn observe(&self, event: &CacheEvent) {
        let counter = match event {
            CacheEvent::Hit { .. } => &self.hits,
            CacheEvent::Miss { .. } => &self.misses,
            CacheEvent::StoreFailed { .. } => &self.store_failures,
            CacheEvent::Registered { .. } => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}
