//! API Module
//!
//! HTTP handlers and routing for the listing REST API.
//!
//! # Endpoints
//! - `GET /listings` - All listings
//! - `POST /listings/search` - Listings matching a filter
//! - `GET /listings/page` - One page of listings
//! - `GET /listings/:id` - A single listing
//! - `POST /listings` - Create a listing
//! - `PATCH /listings/:id` - Update a listing
//! - `DELETE /listings/:id` - Delete a listing
//! - `GET /stats` - Cache statistics
//! - `DELETE /cache` - Clear every cache
//! - `GET /health` - Health check endpoint
//!
//! Every read accepts `?skip_cache=true`.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
