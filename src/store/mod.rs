//! Document Store Module
//!
//! The collaborator the cache sits in front of: an asynchronous, fallible
//! store of listing records.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Listing, ListingFilter, ListingPage, ListingPatch, NewListing, PageQuery};

pub use memory::MemoryStore;

// == Store Error ==
/// Failure reported by a document store call.
///
/// `Clone` so one failed fetch can be handed to every coalesced waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not be reached
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    /// The backend did not answer in time
    #[error("Document store timed out: {0}")]
    Timeout(String),

    /// The backend rejected the request
    #[error("Invalid store request: {0}")]
    InvalidInput(String),

    /// Any other backend failure
    #[error("Document store error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Document Store ==
/// Listing persistence as seen by the cache layer.
///
/// Every call may be slow and may fail; the cache never retries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All listings, newest first.
    async fn fetch_all(&self) -> StoreResult<Vec<Listing>>;

    /// A single listing, `None` if it does not exist.
    async fn fetch_by_id(&self, id: &str) -> StoreResult<Option<Listing>>;

    /// Active listings matching `filter`, newest first.
    async fn fetch_filtered(&self, filter: &ListingFilter) -> StoreResult<Vec<Listing>>;

    /// One page of listings, newest first.
    async fn fetch_page(&self, query: &PageQuery) -> StoreResult<ListingPage>;

    /// Stores a new listing and returns its id.
    async fn create(&self, listing: NewListing) -> StoreResult<String>;

    /// Applies `patch`. Returns `false` if no listing has that id.
    async fn update(&self, id: &str, patch: ListingPatch) -> StoreResult<bool>;

    /// Removes a listing. Returns `false` if no listing has that id.
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}
