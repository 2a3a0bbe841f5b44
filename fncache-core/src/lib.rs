//! fncache Core - Keys, Errors, Events
//!
//! Pure data and small helpers shared by every other crate: the key deriver,
//! argument lists, the error taxonomy, the event surface and configuration.

pub mod args;
pub mod config;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod key;

pub use args::ArgList;
pub use config::{DiskStoreConfig, DEFAULT_DIR_NAME};
pub use error::{ConfigError, KeyError, MemoError, MemoResult, RegistryError, StorageError};
pub use event::{CacheEvent, EventSink, FanoutSink, Location, RecordingSink, TracingSink};
pub use fingerprint::{combine, hash_value, Fingerprint, SEED};
pub use key::{EntryKey, ANONYMOUS, MAX_IDENTIFIER_LEN};
