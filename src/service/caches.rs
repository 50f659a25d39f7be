//! Cache instances owned by the listing service
//!
//! One slot per query shape, each pairing a TTL cache with the coalescer
//! for fetches that will fill it.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheStats, RequestCoalescer, TtlCache};
use crate::error::{Error, Result};
use crate::models::{Listing, ListingPage};

// == Cache Slot ==
pub struct CacheSlot<T> {
    name: &'static str,
    cache: Mutex<TtlCache<T>>,
    flights: RequestCoalescer<T, Error>,
}

impl<T> CacheSlot<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, default_ttl: Duration) -> Self {
        Self {
            name,
            cache: Mutex::new(TtlCache::new(default_ttl)),
            flights: RequestCoalescer::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Locks the cache. A poisoned lock is reported, not recovered.
    pub fn lock(&self) -> Result<MutexGuard<'_, TtlCache<T>>> {
        self.cache
            .lock()
            .map_err(|_| Error::Poisoned(self.name.to_string()))
    }

    pub fn flights(&self) -> &RequestCoalescer<T, Error> {
        &self.flights
    }

    /// Drops the entry for `key` and detaches any fetch filling it.
    pub fn invalidate_key(&self, key: &str) -> Result<()> {
        self.flights.forget(key);
        self.lock()?.delete(key);
        debug!(cache = self.name, key, "Cache entry invalidated");
        Ok(())
    }

    /// Drops every entry and detaches every fetch.
    pub fn invalidate_all(&self) -> Result<()> {
        let detached = self.flights.forget_all();
        self.lock()?.clear();
        debug!(cache = self.name, detached, "Cache cleared");
        Ok(())
    }

    pub fn stats(&self) -> Result<CacheStats> {
        Ok(self.lock()?.stats())
    }
}

// == Listing Caches ==
/// Default TTL of the all-listings and filtered-listings cache.
pub const LISTINGS_TTL: Duration = Duration::from_secs(5 * 60);

/// Default TTL of the single-listing cache.
pub const LISTING_TTL: Duration = Duration::from_secs(10 * 60);

/// Default TTL of the paginated-listings cache.
pub const PAGINATED_TTL: Duration = Duration::from_secs(3 * 60);

/// The three listing caches.
///
/// List results change with any write, so they get shorter TTLs than
/// single-item lookups.
pub struct ListingCaches {
    /// `listings::all` and `filterListings::...`
    pub listings: Arc<CacheSlot<Vec<Listing>>>,
    /// `listing::{id}`, including cached misses
    pub listing: Arc<CacheSlot<Option<Listing>>>,
    /// `paginatedListings::...`
    pub paginated: Arc<CacheSlot<ListingPage>>,
}

impl ListingCaches {
    pub fn new(listings_ttl: Duration, listing_ttl: Duration, paginated_ttl: Duration) -> Self {
        Self {
            listings: Arc::new(CacheSlot::new("listings", listings_ttl)),
            listing: Arc::new(CacheSlot::new("listing", listing_ttl)),
            paginated: Arc::new(CacheSlot::new("paginated", paginated_ttl)),
        }
    }

    /// Fetches currently in flight across all slots.
    pub fn in_flight(&self) -> usize {
        self.listings.flights().in_flight()
            + self.listing.flights().in_flight()
            + self.paginated.flights().in_flight()
    }
}

impl Default for ListingCaches {
    fn default() -> Self {
        Self::new(LISTINGS_TTL, LISTING_TTL, PAGINATED_TTL)
    }
}
