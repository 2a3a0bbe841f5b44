//! fncache Memoize - Wrappers and Registry
//!
//! Turns any pure function into a self-caching callable:
//!
//! ```ignore
//! use fncache_memoize::{cached, Memoized, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//!
//! // One-off call, identifier taken from the function path.
//! let n = cached!(store, fib, 30u64)?;
//!
//! // Reusable wrapper.
//! let fib = Memoized::new(store, "fib", fib);
//! let n = fib.call((30u64,))?;
//! ```
//!
//! Recursive functions memoize their own calls through the [`Registry`]:
//!
//! ```ignore
//! fn mfib(n: u64) -> u64 {
//!     if n < 2 {
//!         return n;
//!     }
//!     call_memoized::<MemoryStore, _, _>("mfib", mfib, (n - 1,)).unwrap_or(0)
//!         + call_memoized::<MemoryStore, _, _>("mfib", mfib, (n - 2,)).unwrap_or(0)
//! }
//!
//! let mfib = register_or_get("mfib", &store, "mfib", mfib);
//! assert_eq!(mfib.call((12u64,))?, 144);
//! ```

pub mod callable;
pub mod combinators;
pub mod memoized;
pub mod registry;

pub use callable::{Callable, CallableExt};
pub use combinators::Logged;
pub use memoized::Memoized;
pub use registry::{call_memoized, register_or_get, Registry};

// Re-export the pieces every caller needs alongside a wrapper
pub use fncache_core::{
    ArgList, CacheEvent, DiskStoreConfig, EntryKey, EventSink, Fingerprint, Location, MemoError,
    MemoResult, RecordingSink, TracingSink, ANONYMOUS,
};
pub use fncache_storage::{CacheStats, DiskStore, MemoryStore, ValueStore};

/// Memoize a single call, using the function's path as identifier.
///
/// `cached!(store, fib, 10u64)` is `Memoized::new(store.clone(), "fib", fib).call((10u64,))`.
/// `$store` must be an `Arc` of a store.
#[macro_export]
macro_rules! cached {
    ($store:expr, $func:path $(, $arg:expr)* $(,)?) => {
        $crate::Memoized::new(
            ::std::sync::Arc::clone(&$store),
            stringify!($func),
            $func,
        )
        .call(($($arg,)*))
    };
}
