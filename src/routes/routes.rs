//! Defines routes for the bucket gateway.
//!
//! ## Structure
//! - **Listing endpoint**
//!   - `POST /api/children` — list folders and files under a prefix
//!
//! - **Object serving**
//!   - `GET /` and `GET /{*path}` — stream an object by its request path
//!     (the root path falls back to the configured index document)
//!
//! - **Probes**
//!   - `GET /healthz`, `GET /readyz`
//!
//! The per-client rate-limit gate is layered over the whole table, so a
//! denied client gets a 429 before any handler logic runs.

use crate::{
    handlers::{
        children_handlers::list_children,
        health_handlers::{healthz, readyz},
        object_handlers::serve_object,
    },
    services::{
        bucket_service::BucketService,
        rate_limiter::{RateLimiter, rate_limit},
    },
};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

/// Build and return the router.
///
/// The router carries shared state (`BucketService`) to all handlers; the
/// limiter travels with the middleware layer instead.
pub fn routes(limiter: Arc<RateLimiter>) -> Router<BucketService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // listing endpoint
        .route("/api/children", post(list_children))
        // direct object serving, root included
        .route("/", get(serve_object))
        .route("/{*path}", get(serve_object))
        .layer(middleware::from_fn_with_state(limiter, rate_limit))
}
