//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use listing_cache::{api::create_router, AppState, Config, DocumentStore, MemoryStore};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::with_demo_listings());
    create_router(AppState::from_config(store, &Config::default()))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// == Read Endpoint Tests ==

#[tokio::test]
async fn test_list_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, get("/listings")).await;

    assert_eq!(status, StatusCode::OK);
    let listings = json.as_array().unwrap();
    assert_eq!(listings.len(), 2);
    // Same timestamp, so the later insert comes first
    assert_eq!(listings[0]["id"], "demo-2");
}

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();

    let (status, json) = send(&app, get("/listings/demo-1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "demo-1");
    assert_eq!(json["category"], "Industrial");
    assert_eq!(json["listing_type"], "SALE");
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, get("/listings/nonexistent")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nonexistent"));
}

#[tokio::test]
async fn test_search_endpoint() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        with_json(
            "POST",
            "/listings/search",
            r#"{"category":"Office","location":"penang"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let listings = json.as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["id"], "demo-2");
}

#[tokio::test]
async fn test_search_by_land_size() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        with_json(
            "POST",
            "/listings/search",
            r#"{"land_size_range":{"min":1000,"max":5000}}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let listings = json.as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["land_size"], "2,500 sqft");
}

#[tokio::test]
async fn test_page_endpoint_walks_cursor() {
    let app = create_test_app();

    let (status, first) = send(&app, get("/listings/page?page_size=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["listings"].as_array().unwrap().len(), 1);
    assert_eq!(first["has_more"], true);

    let cursor = first["next_page_cursor"].as_str().unwrap().to_string();
    let (status, second) = send(&app, get(&format!("/listings/page?page_size=1&cursor={cursor}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(second["listings"][0]["id"], first["listings"][0]["id"]);
}

#[tokio::test]
async fn test_page_endpoint_unknown_cursor() {
    let app = create_test_app();

    let (status, _) = send(&app, get("/listings/page?cursor=ghost")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == Write Endpoint Tests ==

#[tokio::test]
async fn test_create_endpoint() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        with_json(
            "POST",
            "/listings",
            r#"{"title":"Shop lot","price":850000,"location":"Kuantan","category":"Commercial","listing_type":"RENT"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let id = json["id"].as_str().unwrap().to_string();

    let (status, json) = send(&app, get(&format!("/listings/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Shop lot");
    assert_eq!(json["status"], "active");
}

#[tokio::test]
async fn test_create_endpoint_rejects_blank_title() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        with_json(
            "POST",
            "/listings",
            r#"{"title":" ","price":1,"location":"Kuantan","category":"Land","listing_type":"SALE"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_is_visible_through_cache() {
    let app = create_test_app();

    // Warm every cache the listing appears in
    send(&app, get("/listings")).await;
    send(&app, get("/listings/demo-1")).await;
    send(&app, get("/listings/page")).await;

    let (status, _) = send(&app, with_json("PATCH", "/listings/demo-1", r#"{"price":999}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, item) = send(&app, get("/listings/demo-1")).await;
    assert_eq!(item["price"], 999.0);

    let (_, all) = send(&app, get("/listings")).await;
    let updated = all
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["id"] == "demo-1")
        .unwrap();
    assert_eq!(updated["price"], 999.0);

    let (_, page) = send(&app, get("/listings/page")).await;
    assert!(page["listings"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l["id"] == "demo-1" && l["price"] == 999.0));
}

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();
    send(&app, get("/listings/demo-2")).await;

    let (status, json) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/listings/demo-2")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("demo-2"));

    let (status, _) = send(&app, get("/listings/demo-2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_endpoint_not_found() {
    let app = create_test_app();

    let (status, _) = send(&app, with_json("PATCH", "/listings/ghost", r#"{"price":1}"#)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = app
        .oneshot(with_json("POST", "/listings", "not json"))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == Cache Management Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    send(&app, get("/listings/demo-1")).await;
    send(&app, get("/listings/demo-1")).await;

    let (status, json) = send(&app, get("/stats")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["listing_cache"]["hits"], 1);
    assert_eq!(json["listing_cache"]["misses"], 1);
    assert_eq!(json["listing_cache"]["size"], 1);
    assert_eq!(json["pending_requests"], 0);
}

#[tokio::test]
async fn test_skip_cache_bypasses_lookup() {
    let app = create_test_app();

    send(&app, get("/listings")).await;
    send(&app, get("/listings?skip_cache=true")).await;

    let (_, json) = send(&app, get("/stats")).await;
    // The bypassed read neither hit nor missed
    assert_eq!(json["listings_cache"]["hits"], 0);
    assert_eq!(json["listings_cache"]["misses"], 1);
}

#[tokio::test]
async fn test_clear_cache_endpoint() {
    let app = create_test_app();
    send(&app, get("/listings")).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, json) = send(&app, get("/stats")).await;
    assert_eq!(json["listings_cache"]["size"], 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
