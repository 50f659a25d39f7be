//! TTL Cache Module
//!
//! Keyed table of [`CacheEntry`] values with a per-instance default TTL,
//! lazy eviction on read and an explicit sweep.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats};

// == TTL Cache ==
/// In-memory cache whose entries expire after a time-to-live.
///
/// Each instance carries its own default TTL so that volatile query shapes
/// (filtered lists, pages) can expire sooner than stable ones (single items).
#[derive(Debug)]
pub struct TtlCache<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// TTL applied when `set` is called without one
    default_ttl: Duration,
    /// Bumped on every delete/clear
    epoch: u64,
    /// Performance statistics
    stats: CacheStats,
}

impl<T: Clone> TtlCache<T> {
    // == Constructor ==
    /// Creates an empty cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
            epoch: 0,
            stats: CacheStats::new(),
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// `ttl` overrides the instance default for this entry only.
    pub fn set(&mut self, key: impl Into<String>, value: T, ttl: Option<Duration>) {
        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));
        self.entries.insert(key.into(), entry);
        self.stats.set_total_entries(self.entries.len());
    }

    /// Stores `value` only if nothing was invalidated since `epoch` was read.
    ///
    /// Returns whether the value was stored.
    pub fn set_if_epoch(
        &mut self,
        key: impl Into<String>,
        value: T,
        ttl: Option<Duration>,
        epoch: u64,
    ) -> bool {
        if self.epoch != epoch {
            return false;
        }
        self.set(key, value, ttl);
        true
    }

    // == Get ==
    /// Returns the cached value if present and not expired.
    ///
    /// An expired entry is removed on the spot and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.record_hit();
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expired(1);
            self.stats.set_total_entries(self.entries.len());
        }
        self.stats.record_miss();
        None
    }

    /// Returns the live entry without touching statistics or evicting.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<T>> {
        self.entries.get(key).filter(|entry| !entry.is_expired())
    }

    // == Delete ==
    /// Removes the entry for `key`. Returns whether one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.epoch += 1;
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.record_invalidated(1);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.epoch += 1;
        self.stats.record_invalidated(self.entries.len());
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Cleanup ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - self.entries.len();
        self.stats.record_expired(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    /// Invalidation generation, see [`set_if_epoch`](Self::set_if_epoch).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
