//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: `SELECT 1`
/// 2. **Cache**: backend ping (the `none` backend is always healthy)
/// 3. **Task Queue**: open, with remaining capacity
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = if state.link_service.health_check().await {
        CheckStatus::ok("Connected")
    } else {
        CheckStatus::error("Store unreachable")
    };

    let backend = state.cache.backend();
    let cache = if state.cache.health_check().await {
        CheckStatus::ok(format!("Backend: {backend}"))
    } else {
        CheckStatus::error(format!("Backend {backend} unreachable"))
    };

    let task_queue = if state.scheduler.is_closed() {
        CheckStatus::error("Task queue is closed")
    } else {
        CheckStatus::ok(format!(
            "Capacity: {}/{}",
            state.scheduler.capacity(),
            state.scheduler.max_capacity()
        ))
    };

    let all_healthy = database.is_ok() && cache.is_ok() && task_queue.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks {
            database,
            cache,
            task_queue,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
