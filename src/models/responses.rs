//! Response DTOs for the listing API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::service::CacheStatsSnapshot;

/// Response body for a successful create (POST /listings)
#[derive(Debug, Clone, Serialize)]
pub struct CreateResponse {
    pub message: String,
    pub id: String,
}

impl CreateResponse {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            message: format!("Listing '{}' created successfully", id),
            id,
        }
    }
}

/// Response body for update and delete
#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    /// Success message
    pub message: String,
    /// The listing that was changed
    pub id: String,
}

impl MutationResponse {
    pub fn updated(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            message: format!("Listing '{}' updated successfully", id),
            id,
        }
    }

    pub fn deleted(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            message: format!("Listing '{}' deleted successfully", id),
            id,
        }
    }
}

/// Figures for one cache instance.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub invalidated: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<&CacheStats> for CacheReport {
    fn from(stats: &CacheStats) -> Self {
        Self {
            size: stats.total_entries,
            hits: stats.hits,
            misses: stats.misses,
            expired: stats.expired,
            invalidated: stats.invalidated,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub listings_cache: CacheReport,
    pub listing_cache: CacheReport,
    pub paginated_cache: CacheReport,
    /// Fetches currently shared by coalesced callers
    pub pending_requests: usize,
}

impl From<CacheStatsSnapshot> for StatsResponse {
    fn from(snapshot: CacheStatsSnapshot) -> Self {
        Self {
            listings_cache: CacheReport::from(&snapshot.listings),
            listing_cache: CacheReport::from(&snapshot.listing),
            paginated_cache: CacheReport::from(&snapshot.paginated),
            pending_requests: snapshot.in_flight,
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "All caches cleared".to_string(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
