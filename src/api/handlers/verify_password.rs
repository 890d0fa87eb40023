//! Handler for unlocking password-protected links.

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use validator::Validate;

use crate::api::dto::verify_password::{VerifyPasswordRequest, VerifyPasswordResponse};
use crate::api::handlers::outcome::outcome_error;
use crate::domain::outcome::Outcome;
use crate::domain::request_context::RequestContext;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Verifies a protected link's password and redirects on success.
///
/// # Endpoint
///
/// `POST /verify-password`
///
/// # Request Body
///
/// ```json
/// { "short_code": "abc123", "password": "hunter2" }
/// ```
///
/// # Response
///
/// 307 with a `Location` header and `{"destination": "..."}` so that both
/// browsers and script clients can follow it. The click is recorded only
/// after a successful check.
///
/// # Errors
///
/// - 400 Bad Request if the link is not protected or the body is invalid
/// - 401 Unauthorized on a wrong password
/// - 404 Not Found for unknown or exhausted links
/// - 410 Gone for expired links
pub async fn verify_password_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<VerifyPasswordRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let context = RequestContext::new(client_ip(&headers, Some(addr), state.behind_proxy));

    let outcome = state
        .resolution_service
        .resolve_protected(&payload.short_code, &payload.password, context)
        .await?;

    match outcome {
        Outcome::Redirect { destination } => Ok((
            StatusCode::TEMPORARY_REDIRECT,
            [(header::LOCATION, destination.clone())],
            Json(VerifyPasswordResponse { destination }),
        )
            .into_response()),
        other => Err(outcome_error(&payload.short_code, &other)),
    }
}
