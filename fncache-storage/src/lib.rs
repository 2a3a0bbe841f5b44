//! fncache Storage - Value Stores
//!
//! The [`ValueStore`] capability and its two backends:
//! - [`DiskStore`]: durable, one serialized record per entry
//! - [`MemoryStore`]: volatile, type-tagged values in an in-process table

pub mod disk;
pub mod memory;
pub mod traits;

pub use disk::DiskStore;
pub use memory::MemoryStore;
pub use traits::{CacheStats, ValueStore};
