//! Cache Module
//!
//! Building blocks of the read-through cache: TTL entries, canonical keys
//! and request coalescing.

mod coalesce;
mod entry;
mod key;
mod stats;
mod ttl;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use coalesce::RequestCoalescer;
pub use entry::{CacheEntry, MAX_TTL};
pub use key::{derive_key, CacheKey, KeyError};
pub use stats::CacheStats;
pub use ttl::TtlCache;
