//! Service Module
//!
//! The cache-aware listing access layer and the invalidation that keeps it
//! fresh after writes.

mod caches;
mod invalidation;
mod listings;

pub use caches::{CacheSlot, ListingCaches, LISTINGS_TTL, LISTING_TTL, PAGINATED_TTL};
pub use invalidation::{listing_key, InvalidationCoordinator, LISTING_PREFIX};
pub use listings::{
    CacheSettings, CacheStatsSnapshot, ListingService, FILTER_PREFIX, PAGINATED_PREFIX,
};
