//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Default TTL in seconds of the all/filtered listings cache
    pub listings_ttl: u64,
    /// Default TTL in seconds of the single-listing cache
    pub listing_ttl: u64,
    /// Default TTL in seconds of the paginated listings cache
    pub paginated_ttl: u64,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Reject queries whose cache key cannot be derived
    pub strict_cache_keys: bool,
    /// Load demo listings into the in-memory store at startup
    pub seed_demo_data: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `LISTINGS_TTL` - List/filter cache TTL in seconds (default: 300)
    /// - `LISTING_TTL` - Single listing cache TTL in seconds (default: 600)
    /// - `PAGINATED_TTL` - Page cache TTL in seconds (default: 180)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `STRICT_CACHE_KEYS` - true/false (default: true in debug builds)
    /// - `SEED_DEMO_DATA` - true/false (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            listings_ttl: env_or("LISTINGS_TTL", defaults.listings_ttl),
            listing_ttl: env_or("LISTING_TTL", defaults.listing_ttl),
            paginated_ttl: env_or("PAGINATED_TTL", defaults.paginated_ttl),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            strict_cache_keys: env_or("STRICT_CACHE_KEYS", defaults.strict_cache_keys),
            seed_demo_data: env_or("SEED_DEMO_DATA", defaults.seed_demo_data),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            listings_ttl: 300,
            listing_ttl: 600,
            paginated_ttl: 180,
            cleanup_interval: 300,
            strict_cache_keys: cfg!(debug_assertions),
            seed_demo_data: true,
        }
    }
}
