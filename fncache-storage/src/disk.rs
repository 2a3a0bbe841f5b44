//! Durable store: one file per entry under a root directory.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   fib-11400714819323198485     # one record per (identifier, fingerprint)
//!   times-5209481306212468651
//! ```
//!
//! No sharding into subdirectories. Records are written to a temporary file
//! in the root and renamed into place, so a reader sees either the previous
//! record or the complete new one.
//!
//! # Record Format
//!
//! A `postcard`-encoded envelope holding the Rust type name of the stored
//! value and the value's own `postcard` encoding. The type name lets a lookup
//! for the wrong type fail cleanly instead of decoding garbage. Only
//! round-trip fidelity within one build is promised.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fncache_core::{
    CacheEvent, DiskStoreConfig, EntryKey, EventSink, Location, MemoResult, StorageError,
    TracingSink,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::traits::{CacheStats, StatsCounters, ValueStore};

/// Prefix of in-flight temporary files. Never a record name.
const TEMP_PREFIX: &str = ".fncache-";

#[derive(Serialize, Deserialize)]
struct Record {
    type_name: String,
    payload: Vec<u8>,
}

/// File-system backed store.
///
/// # Example
///
/// ```ignore
/// use fncache_storage::{DiskStore, ValueStore};
///
/// let store = DiskStore::open("/tmp/fncache")?;
/// let key = EntryKey::derive("fib", &(10u64,))?;
/// let value: u64 = store.get_or_compute(&key, || fib(10))?;
/// ```
pub struct DiskStore {
    root: PathBuf,
    sync_writes: bool,
    sink: Arc<dyn EventSink>,
    counters: StatsCounters,
}

impl DiskStore {
    /// Open a store from configuration, creating the root if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The current directory cannot be determined (default root)
    /// - The root directory cannot be created
    pub fn new(config: DiskStoreConfig) -> MemoResult<Self> {
        config.validate()?;
        let root = config.resolve_root()?;
        fs::create_dir_all(&root).map_err(|e| StorageError::io(&root, &e))?;

        tracing::debug!(root = %root.display(), "opened disk store");

        Ok(Self {
            root,
            sync_writes: config.sync_writes,
            sink: Arc::new(TracingSink),
            counters: StatsCounters::default(),
        })
    }

    /// Open a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> MemoResult<Self> {
        Self::new(DiskStoreConfig::new().with_root(root))
    }

    /// Open a store rooted at `<cwd>/cache`.
    pub fn in_current_dir() -> MemoResult<Self> {
        Self::new(DiskStoreConfig::default())
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record for `key`.
    pub fn record_path(&self, key: &EntryKey) -> PathBuf {
        self.root.join(key.record_name())
    }

    /// Whether a record exists for `key`.
    pub fn contains(&self, key: &EntryKey) -> bool {
        self.record_path(key).is_file()
    }

    /// Names of all records currently in the root, sorted.
    pub fn records(&self) -> MemoResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| StorageError::io(&self.root, &e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.root, &e))?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(TEMP_PREFIX) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.root)
            .map_err(|e| StorageError::io(&self.root, &e))?;

        tmp.write_all(bytes)
            .map_err(|e| StorageError::io(tmp.path(), &e))?;
        if self.sync_writes {
            tmp.as_file()
                .sync_all()
                .map_err(|e| StorageError::io(tmp.path(), &e))?;
        }

        tmp.persist(path)
            .map_err(|e| StorageError::io(path, &e.error))?;
        Ok(())
    }
}

impl<T> ValueStore<T> for DiskStore
where
    T: Serialize + DeserializeOwned,
{
    fn lookup(&self, key: &EntryKey) -> Result<Option<T>, StorageError> {
        let path = self.record_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&path, &e)),
        };

        let record: Record =
            postcard::from_bytes(&bytes).map_err(|e| StorageError::Deserialization {
                location: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let expected = std::any::type_name::<T>();
        if record.type_name != expected {
            return Err(StorageError::Deserialization {
                location: path.display().to_string(),
                reason: format!(
                    "record holds {}, requested {}",
                    record.type_name, expected
                ),
            });
        }

        let value = postcard::from_bytes(&record.payload).map_err(|e| {
            StorageError::Deserialization {
                location: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Some(value))
    }

    fn store(&self, key: &EntryKey, value: &T) -> Result<(), StorageError> {
        let path = self.record_path(key);
        let serialization_error = |e: postcard::Error| StorageError::Serialization {
            location: path.display().to_string(),
            reason: e.to_string(),
        };

        let record = Record {
            type_name: std::any::type_name::<T>().to_string(),
            payload: postcard::to_stdvec(value).map_err(serialization_error)?,
        };
        let bytes = postcard::to_stdvec(&record).map_err(serialization_error)?;

        self.write_atomic(&path, &bytes)?;
        self.counters.record_write();
        Ok(())
    }

    fn location(&self, key: &EntryKey) -> Location {
        Location::File(self.record_path(key))
    }

    fn emit(&self, event: CacheEvent) {
        self.counters.observe(&event);
        self.sink.record(&event);
    }

    fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}
