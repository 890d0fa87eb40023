//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    response::Redirect,
};
use serde_json::json;
use std::net::SocketAddr;

use crate::api::handlers::outcome::outcome_error;
use crate::domain::outcome::Outcome;
use crate::domain::request_context::RequestContext;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::code_generator::is_well_formed;

/// Redirects a short code to its destination.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Reject malformed codes without touching cache or store
/// 2. Resolve the code (cache first, store on miss)
/// 3. Click accounting or lazy deletion is enqueued by the resolver
/// 4. Return 307 Temporary Redirect
///
/// Protected links redirect to `{FRONTEND_BASE_URL}/secure/{code}` and record
/// no click until the password is verified.
///
/// # Errors
///
/// - 404 Not Found for unknown, malformed or exhausted codes
/// - 410 Gone for expired links
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Redirect, AppError> {
    if !is_well_formed(&code) {
        return Err(AppError::not_found(
            "Short link not found",
            json!({ "code": code }),
        ));
    }

    let context = RequestContext::new(client_ip(&headers, Some(addr), state.behind_proxy));

    let outcome = state.resolution_service.resolve(&code, context).await?;

    match outcome {
        Outcome::Redirect { destination } => Ok(Redirect::temporary(&destination)),
        Outcome::RedirectToPasswordPrompt => {
            Ok(Redirect::temporary(&state.password_prompt_url(&code)))
        }
        other => Err(outcome_error(&code, &other)),
    }
}
