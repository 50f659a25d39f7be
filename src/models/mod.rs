//! Listing domain types and the DTOs used by the HTTP API.

pub mod filter;
pub mod listing;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use filter::{
    DateRange, LandSizeRange, ListingFilter, ListingPage, PageQuery, PriceRange,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use listing::{
    Coordinates, Listing, ListingPatch, ListingStatus, ListingType, NewListing, PropertyCategory,
    Tenure,
};
pub use requests::ReadOptions;
pub use responses::{
    CacheReport, ClearResponse, CreateResponse, HealthResponse, MutationResponse, StatsResponse,
};
