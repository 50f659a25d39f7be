//! Listing Cache - a read-through cache in front of a listing document store
//!
//! Provides TTL caching, canonical cache keys, coalescing of concurrent
//! identical fetches and synchronous invalidation after writes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{Error, Result};
pub use service::{CacheSettings, ListingService};
pub use store::{DocumentStore, MemoryStore, StoreError};
pub use tasks::spawn_cleanup_task;
