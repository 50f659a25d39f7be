//! API Handlers
//!
//! HTTP request handlers for the listing endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    ClearResponse, CreateResponse, HealthResponse, Listing, ListingFilter, ListingPage,
    ListingPatch, MutationResponse, NewListing, PageQuery, ReadOptions, StatsResponse,
};
use crate::service::ListingService;
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// The service does its own locking, so handlers only hold a handle.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ListingService>,
}

impl AppState {
    pub fn new(service: Arc<ListingService>) -> Self {
        Self { service }
    }

    /// Creates a new AppState from configuration, fronting `store`.
    pub fn from_config(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self::new(Arc::new(ListingService::from_config(store, config)))
    }
}

// == Reads ==

/// Handler for GET /listings
pub async fn list_handler(
    State(state): State<AppState>,
    Query(opts): Query<ReadOptions>,
) -> Result<Json<Vec<Listing>>> {
    let listings = state.service.get_listings(opts).await?;
    Ok(Json(listings))
}

/// Handler for POST /listings/search
///
/// The filter travels in the body since ranges do not fit a query string.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(opts): Query<ReadOptions>,
    Json(filter): Json<ListingFilter>,
) -> Result<Json<Vec<Listing>>> {
    let listings = state.service.filter_listings(&filter, opts).await?;
    Ok(Json(listings))
}

/// Handler for GET /listings/page
pub async fn page_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Query(opts): Query<ReadOptions>,
) -> Result<Json<ListingPage>> {
    let page = state.service.get_listings_paginated(&query, opts).await?;
    Ok(Json(page))
}

/// Handler for GET /listings/:id
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(opts): Query<ReadOptions>,
) -> Result<Json<Listing>> {
    state
        .service
        .get_listing_by_id(&id, opts)
        .await?
        .map(Json)
        .ok_or(Error::NotFound(id))
}

// == Writes ==

/// Handler for POST /listings
pub async fn create_handler(
    State(state): State<AppState>,
    Json(listing): Json<NewListing>,
) -> Result<(StatusCode, Json<CreateResponse>)> {
    let id = state.service.create_listing(listing).await?;
    Ok((StatusCode::CREATED, Json(CreateResponse::new(id))))
}

/// Handler for PATCH /listings/:id
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ListingPatch>,
) -> Result<Json<MutationResponse>> {
    if !state.service.update_listing(&id, patch).await? {
        return Err(Error::NotFound(id));
    }
    Ok(Json(MutationResponse::updated(id)))
}

/// Handler for DELETE /listings/:id
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>> {
    if !state.service.delete_listing(&id).await? {
        return Err(Error::NotFound(id));
    }
    Ok(Json(MutationResponse::deleted(id)))
}

// == Cache Management ==

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let snapshot = state.service.cache_stats()?;
    Ok(Json(StatsResponse::from(snapshot)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    state.service.clear_all_caches()?;
    Ok(Json(ClearResponse::cleared()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingType, PropertyCategory};
    use crate::store::MemoryStore;

    fn test_state() -> AppState {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::with_demo_listings());
        AppState::from_config(store, &Config::default())
    }

    #[tokio::test]
    async fn test_create_then_get_handler() {
        let state = test_state();

        let listing = NewListing::new(
            "Corner lot",
            1_200_000.0,
            "Ipoh",
            PropertyCategory::Land,
            ListingType::Sale,
        );
        let (status, Json(created)) = create_handler(State(state.clone()), Json(listing))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(fetched) = get_handler(
            State(state),
            Path(created.id.clone()),
            Query(ReadOptions::default()),
        )
        .await
        .unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, "Corner lot");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let state = test_state();

        let result = get_handler(
            State(state),
            Path("ghost".to_string()),
            Query(ReadOptions::default()),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound(id)) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();

        let Json(response) = delete_handler(State(state.clone()), Path("demo-1".to_string()))
            .await
            .unwrap();
        assert_eq!(response.id, "demo-1");

        // Second delete has nothing to remove
        let result = delete_handler(State(state), Path("demo-1".to_string())).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let state = test_state();

        let result = update_handler(
            State(state),
            Path("ghost".to_string()),
            Json(ListingPatch::default()),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stats_handler_counts_entries() {
        let state = test_state();

        list_handler(State(state.clone()), Query(ReadOptions::default()))
            .await
            .unwrap();

        let Json(stats) = stats_handler(State(state)).await.unwrap();
        assert_eq!(stats.listings_cache.size, 1);
        assert_eq!(stats.listings_cache.misses, 1);
        assert_eq!(stats.pending_requests, 0);
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let state = test_state();

        list_handler(State(state.clone()), Query(ReadOptions::default()))
            .await
            .unwrap();
        clear_handler(State(state.clone())).await.unwrap();

        let Json(stats) = stats_handler(State(state)).await.unwrap();
        assert_eq!(stats.listings_cache.size, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let Json(response) = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
