//! Invalidation Coordinator
//!
//! Clears every cache entry a listing mutation could have made stale.

use std::sync::Arc;

use tracing::{debug, error};

use crate::cache::CacheKey;
use crate::error::{Error, Result};
use crate::service::caches::ListingCaches;

/// Prefix of single-listing cache keys.
pub const LISTING_PREFIX: &str = "listing";

/// Key of the cached single-listing lookup for `id`.
pub fn listing_key(id: &str) -> CacheKey {
    CacheKey::new(LISTING_PREFIX, id)
}

// == Invalidation Coordinator ==
/// Runs after every successful create/update/delete, before the mutation
/// reports success.
///
/// List-shaped caches are not keyed by id, and any of their entries could
/// have matched the record before or after the write, so they are always
/// cleared in full. The single-item cache only loses the mutated id.
#[derive(Clone)]
pub struct InvalidationCoordinator {
    caches: Arc<ListingCaches>,
}

impl InvalidationCoordinator {
    pub fn new(caches: Arc<ListingCaches>) -> Self {
        Self { caches }
    }

    // == Invalidate ==
    /// Invalidates after a mutation of `id`, or of unknown records when `None`.
    ///
    /// Every step is attempted; the first failure is returned as
    /// [`Error::Invalidation`].
    pub fn invalidate(&self, id: Option<&str>) -> Result<()> {
        let outcome = [
            self.caches.listings.invalidate_all(),
            self.caches.paginated.invalidate_all(),
            match id {
                Some(id) => self.caches.listing.invalidate_key(listing_key(id).as_str()),
                None => self.caches.listing.invalidate_all(),
            },
        ]
        .into_iter()
        .collect::<Result<Vec<()>>>();

        match outcome {
            Ok(_) => {
                debug!(id = id.unwrap_or("*"), "Listing caches invalidated");
                Ok(())
            }
            Err(err) => {
                error!(id = id.unwrap_or("*"), error = %err, "Listing cache invalidation failed");
                Err(Error::invalidation(err))
            }
        }
    }

    /// Drops every cached value and in-flight fetch, e.g. on session teardown.
    pub fn clear_all(&self) -> Result<()> {
        self.invalidate(None)
    }
}
