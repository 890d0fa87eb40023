//! API route configuration.

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::api::handlers::{
    create_link_handler, delete_link_handler, health_handler, redirect_handler,
    verify_password_handler,
};
use crate::state::AppState;

/// All routes of the service.
///
/// # Endpoints
///
/// - `GET    /health`          - Component health
/// - `POST   /links`           - Create a short link
/// - `DELETE /links/{id}`      - Delete a link and its clicks
/// - `POST   /verify-password` - Unlock a protected link
/// - `GET    /{code}`          - Redirect
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/links", post(create_link_handler))
        .route("/links/{id}", delete(delete_link_handler))
        .route("/verify-password", post(verify_password_handler))
        .route("/{code}", get(redirect_handler))
}
