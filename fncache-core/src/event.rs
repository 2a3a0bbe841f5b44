//! Informational events emitted by stores and the registry.
//!
//! Events are fire-and-forget: a sink observes them but can never change the
//! outcome of the call that produced them. [`TracingSink`] forwards every
//! event to `tracing`; [`RecordingSink`] keeps them for later inspection.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StorageError;

/// Where a cache entry lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// In-process table.
    Memory,
    /// Durable record on disk.
    File(PathBuf),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Memory => f.write_str("memory"),
            Location::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A cache event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A stored result was returned without calling the function.
    Hit {
        identifier: String,
        location: Location,
    },
    /// The function was called and its result handed to the store.
    Miss {
        identifier: String,
        location: Location,
    },
    /// A function was registered for self-referential calls.
    Registered { identifier: String, tag: String },
    /// A freshly computed result could not be persisted. The caller still
    /// received the value.
    StoreFailed {
        identifier: String,
        location: Location,
        error: StorageError,
    },
}

impl CacheEvent {
    pub fn identifier(&self) -> &str {
        match self {
            CacheEvent::Hit { identifier, .. }
            | CacheEvent::Miss { identifier, .. }
            | CacheEvent::Registered { identifier, .. }
            | CacheEvent::StoreFailed { identifier, .. } => identifier,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, CacheEvent::Hit { .. })
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, CacheEvent::Miss { .. })
    }
}

/// Consumer of cache events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &CacheEvent);
}

/// Forwards events to `tracing`. This is the default sink everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &CacheEvent) {
        match event {
            CacheEvent::Hit {
                identifier,
                location,
            } => {
                tracing::info!(identifier = %identifier, location = %location, "cache hit");
            }
            CacheEvent::Miss {
                identifier,
                location,
            } => {
                tracing::info!(identifier = %identifier, location = %location, "cache miss");
            }
            CacheEvent::Registered { identifier, tag } => {
                tracing::info!(identifier = %identifier, tag = %tag, "registered in registry");
            }
            CacheEvent::StoreFailed {
                identifier,
                location,
                error,
            } => {
                tracing::warn!(
                    identifier = %identifier,
                    location = %location,
                    error = %error,
                    "failed to persist computed result"
                );
            }
        }
    }
}

/// Keeps every event in order. Cloning shares the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<CacheEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<CacheEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn hits(&self) -> usize {
        self.events().iter().filter(|e| e.is_hit()).count()
    }

    pub fn misses(&self) -> usize {
        self.events().iter().filter(|e| e.is_miss()).count()
    }

    pub fn registrations(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, CacheEvent::Registered { .. }))
            .count()
    }

    pub fn store_failures(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, CacheEvent::StoreFailed { .. }))
            .count()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &CacheEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Fans one event out to several sinks.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutSink {
    fn record(&self, event: &CacheEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}
