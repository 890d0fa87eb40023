//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET    /{code}`          - Short link redirect
//! - `POST   /verify-password` - Password check for protected links
//! - `POST   /links`           - Link creation
//! - `DELETE /links/{id}`      - Explicit deletion
//! - `GET    /health`          - Health check: store, cache, task queue
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api;
use crate::api::middleware::tracing;
use crate::state::AppState;

/// Routes with state applied and request tracing, without path normalization.
pub fn router(state: AppState) -> Router {
    api::routes::routes()
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
