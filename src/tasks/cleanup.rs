//! Cache Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::service::ListingService;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// Lazy eviction only removes entries that are read again; this bounds the
/// memory held by keys nobody asks for anymore. The sweep only deletes
/// expired entries, so it never conflicts with concurrent fills.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let service = Arc::new(ListingService::new(store, CacheSettings::default()));
/// let cleanup_handle = spawn_cleanup_task(service.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(service: Arc<ListingService>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval.as_secs()
        );

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match service.cleanup_expired() {
                Ok(0) => debug!("Cache sweep: no expired entries found"),
                Ok(removed) => info!("Cache sweep: removed {} expired entries", removed),
                Err(err) => error!(error = %err, "Cache sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReadOptions;
    use crate::service::CacheSettings;
    use crate::store::{DocumentStore, MemoryStore};

    fn service(listings_ttl: Duration) -> Arc<ListingService> {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::with_demo_listings());
        Arc::new(ListingService::new(
            store,
            CacheSettings {
                listings_ttl,
                ..CacheSettings::default()
            },
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_removes_expired_entries() {
        let service = service(Duration::from_secs(1));
        service.get_listings(ReadOptions::cached()).await.unwrap();
        assert_eq!(service.cache_stats().unwrap().listings.total_entries, 1);

        let handle = spawn_cleanup_task(service.clone(), Duration::from_secs(2));

        // Let the paused clock run past the TTL and one sweep
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(service.cache_stats().unwrap().listings.total_entries, 0);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_preserves_valid_entries() {
        let service = service(Duration::from_secs(3600));
        service.get_listings(ReadOptions::cached()).await.unwrap();

        let handle = spawn_cleanup_task(service.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(service.cache_stats().unwrap().listings.total_entries, 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(service(Duration::from_secs(1)), Duration::from_secs(1));

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
