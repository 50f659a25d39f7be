//! Listing Service
//!
//! Cache-aware access to listings. Reads go cache -> coalescer -> store;
//! writes go to the store and then invalidate before reporting success.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::{derive_key, CacheKey, CacheStats};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    Listing, ListingFilter, ListingPage, ListingPatch, NewListing, PageQuery, ReadOptions,
};
use crate::service::caches::{CacheSlot, ListingCaches, LISTINGS_TTL, LISTING_TTL, PAGINATED_TTL};
use crate::service::invalidation::{listing_key, InvalidationCoordinator};
use crate::store::{DocumentStore, StoreResult};

/// Key prefix of the filtered-listings cache.
pub const FILTER_PREFIX: &str = "filterListings";

/// Key prefix of the paginated-listings cache.
pub const PAGINATED_PREFIX: &str = "paginatedListings";

// == Cache Settings ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub listings_ttl: Duration,
    pub listing_ttl: Duration,
    pub paginated_ttl: Duration,
    /// Fail on underivable cache keys instead of falling back to a unique key
    pub strict_keys: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            listings_ttl: LISTINGS_TTL,
            listing_ttl: LISTING_TTL,
            paginated_ttl: PAGINATED_TTL,
            strict_keys: cfg!(debug_assertions),
        }
    }
}

impl From<&Config> for CacheSettings {
    fn from(config: &Config) -> Self {
        Self {
            listings_ttl: Duration::from_secs(config.listings_ttl),
            listing_ttl: Duration::from_secs(config.listing_ttl),
            paginated_ttl: Duration::from_secs(config.paginated_ttl),
            strict_keys: config.strict_cache_keys,
        }
    }
}

/// Entry counts and hit figures per cache, plus coalesced fetches in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatsSnapshot {
    pub listings: CacheStats,
    pub listing: CacheStats,
    pub paginated: CacheStats,
    pub in_flight: usize,
}

// == Listing Service ==
/// The listing data-access layer.
///
/// Constructed once at startup and shared by handle; tests build a fresh one
/// each.
pub struct ListingService {
    store: Arc<dyn DocumentStore>,
    caches: Arc<ListingCaches>,
    invalidator: InvalidationCoordinator,
    strict_keys: bool,
}

impl ListingService {
    pub fn new(store: Arc<dyn DocumentStore>, settings: CacheSettings) -> Self {
        let caches = Arc::new(ListingCaches::new(
            settings.listings_ttl,
            settings.listing_ttl,
            settings.paginated_ttl,
        ));
        Self {
            store,
            invalidator: InvalidationCoordinator::new(Arc::clone(&caches)),
            caches,
            strict_keys: settings.strict_keys,
        }
    }

    pub fn from_config(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self::new(store, CacheSettings::from(config))
    }

    // == Reads ==

    /// All listings, newest first.
    pub async fn get_listings(&self, opts: ReadOptions) -> Result<Vec<Listing>> {
        let key = CacheKey::new("listings", "all");
        self.read_through(&self.caches.listings, key, opts, |store| async move {
            store.fetch_all().await
        })
        .await
    }

    /// A single listing. Misses are cached too, so repeated lookups of a
    /// missing id do not reach the store until the entry expires.
    pub async fn get_listing_by_id(&self, id: &str, opts: ReadOptions) -> Result<Option<Listing>> {
        if id.trim().is_empty() {
            return Err(Error::InvalidRequest("Listing id cannot be empty".to_string()));
        }

        let id = id.to_string();
        let key = listing_key(&id);
        self.read_through(&self.caches.listing, key, opts, |store| async move {
            store.fetch_by_id(&id).await
        })
        .await
    }

    /// Active listings matching `filter`, newest first.
    pub async fn filter_listings(
        &self,
        filter: &ListingFilter,
        opts: ReadOptions,
    ) -> Result<Vec<Listing>> {
        if let Some(msg) = filter.validate() {
            return Err(Error::InvalidRequest(msg));
        }

        let filter = filter.clone().normalized();
        let key = self.key_for(FILTER_PREFIX, &filter)?;
        self.read_through(&self.caches.listings, key, opts, |store| async move {
            store.fetch_filtered(&filter).await
        })
        .await
    }

    /// One page of listings. The page size is clamped before keying so
    /// equivalent requests share an entry.
    pub async fn get_listings_paginated(
        &self,
        query: &PageQuery,
        opts: ReadOptions,
    ) -> Result<ListingPage> {
        let query = query.clone().normalized();
        let key = self.key_for(PAGINATED_PREFIX, &query)?;
        self.read_through(&self.caches.paginated, key, opts, |store| async move {
            store.fetch_page(&query).await
        })
        .await
    }

    // == Writes ==

    /// Creates a listing and returns its id.
    pub async fn create_listing(&self, listing: NewListing) -> Result<String> {
        if let Some(msg) = listing.validate() {
            return Err(Error::InvalidRequest(msg));
        }

        let id = self.store.create(listing).await.map_err(|err| {
            warn!(error = %err, "Creating listing failed");
            Error::Store(err)
        })?;
        self.invalidator.invalidate(Some(&id))?;

        info!(id = %id, "Listing created");
        Ok(id)
    }

    /// Applies `patch` to listing `id`. Returns `false` if it does not exist.
    pub async fn update_listing(&self, id: &str, patch: ListingPatch) -> Result<bool> {
        if let Some(msg) = patch.validate() {
            return Err(Error::InvalidRequest(msg));
        }

        let updated = self.store.update(id, patch).await.map_err(|err| {
            warn!(id, error = %err, "Updating listing failed");
            Error::Store(err)
        })?;
        self.invalidator.invalidate(Some(id))?;

        info!(id, updated, "Listing updated");
        Ok(updated)
    }

    /// Deletes listing `id`. Returns `false` if it does not exist.
    pub async fn delete_listing(&self, id: &str) -> Result<bool> {
        let deleted = self.store.delete(id).await.map_err(|err| {
            warn!(id, error = %err, "Deleting listing failed");
            Error::Store(err)
        })?;
        self.invalidator.invalidate(Some(id))?;

        info!(id, deleted, "Listing deleted");
        Ok(deleted)
    }

    // == Cache Management ==

    /// Invalidates caches for a change the service did not make itself.
    pub fn invalidate(&self, id: Option<&str>) -> Result<()> {
        self.invalidator.invalidate(id)
    }

    /// Drops all cached data and in-flight fetches.
    pub fn clear_all_caches(&self) -> Result<()> {
        self.invalidator.clear_all()?;
        info!("All listing caches cleared");
        Ok(())
    }

    /// Sweeps expired entries from every cache. Returns the number removed.
    pub fn cleanup_expired(&self) -> Result<usize> {
        Ok(self.caches.listings.lock()?.cleanup()
            + self.caches.listing.lock()?.cleanup()
            + self.caches.paginated.lock()?.cleanup())
    }

    /// Entry counts per cache and the number of coalesced fetches in flight.
    pub fn cache_stats(&self) -> Result<CacheStatsSnapshot> {
        Ok(CacheStatsSnapshot {
            listings: self.caches.listings.stats()?,
            listing: self.caches.listing.stats()?,
            paginated: self.caches.paginated.stats()?,
            in_flight: self.caches.in_flight(),
        })
    }

    // == Internals ==

    /// Cache lookup, then a coalesced fetch that fills the cache on success.
    ///
    /// The fill is skipped if the cache was invalidated while the fetch was
    /// running, so a fetch that raced a write cannot store pre-write data.
    async fn read_through<T, F, Fut>(
        &self,
        slot: &Arc<CacheSlot<T>>,
        key: CacheKey,
        opts: ReadOptions,
        fetch: F,
    ) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(Arc<dyn DocumentStore>) -> Fut,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
    {
        if !opts.skip_cache {
            let cached = slot.lock()?.get(key.as_str());
            if let Some(value) = cached {
                debug!(cache = slot.name(), key = %key, "Cache hit");
                return Ok(value);
            }
        }

        let epoch = slot.lock()?.epoch();
        let store = Arc::clone(&self.store);
        let fill = Arc::clone(slot);
        let flight = key.clone();

        slot.flights()
            .dedupe(flight.as_str(), move || {
                let pending = fetch(store);
                async move {
                    debug!(cache = fill.name(), key = %key, "Fetching from store");
                    let value = pending.await.map_err(|err| {
                        warn!(cache = fill.name(), key = %key, error = %err, "Fetch failed");
                        Error::Store(err)
                    })?;

                    let stored = fill
                        .lock()?
                        .set_if_epoch(key.as_str(), value.clone(), None, epoch);
                    if !stored {
                        debug!(cache = fill.name(), key = %key, "Fetch raced an invalidation, not cached");
                    }
                    Ok::<T, Error>(value)
                }
            })
            .await
    }

    /// Derives a key, or falls back to a unique one when not strict.
    fn key_for<P: Serialize>(&self, prefix: &str, params: &P) -> Result<CacheKey> {
        match derive_key(prefix, params) {
            Ok(key) => Ok(key),
            Err(err) if self.strict_keys => Err(Error::KeyDerivation(err.to_string())),
            Err(err) => {
                error!(error = %err, "Cache key derivation failed, result will not be shared");
                Ok(CacheKey::unique(prefix))
            }
        }
    }
}
