//! Handlers for link management endpoints (create, delete).

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, LinkResponse};
use crate::application::services::{CreateLink, DeleteMode, DeleteTarget};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::expiry::parse_expiry;

/// Header carrying the anonymous owner's identity.
pub const GUEST_HEADER: &str = "x-guest-uuid";

/// Creates a short link for the calling owner.
///
/// # Endpoint
///
/// `POST /links`
///
/// # Headers
///
/// - `X-Guest-UUID` (required): the owner's identity
///
/// # Request Body
///
/// ```json
/// {
///   "destination": "https://example.com",
///   "is_protected": true,
///   "password": "hunter2",
///   "expires_at": "2030-01-01",
///   "click_limit": 10
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request for a missing owner header, invalid body or bad expiry
/// - 403 Forbidden once the owner reached their link limit
/// - 409 Conflict if the owner already shortened this destination
pub async fn create_link_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let owner_id = owner_from_headers(&headers)?;

    let expires_at = match payload.expires_at.as_deref() {
        Some(raw) => Some(parse_expiry(raw).ok_or_else(|| {
            AppError::bad_request(
                "Invalid expiry, expected YYYY-MM-DD or RFC 3339",
                json!({ "expires_at": raw }),
            )
        })?),
        None => None,
    };

    let link = state
        .link_service
        .create_link(CreateLink {
            owner_id,
            destination: payload.destination,
            is_protected: payload.is_protected,
            password: payload.password,
            expires_at,
            click_limit: payload.click_limit,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Deletes a link, its clicks and its cache entry.
///
/// # Endpoint
///
/// `DELETE /links/{id}`
///
/// # Errors
///
/// - 400 Bad Request if `id` is not a UUID
/// - 404 Not Found if no link has this id
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::bad_request("Invalid link id", json!({ "id": id })))?;

    state
        .deletion_coordinator
        .delete_link(DeleteTarget::Id(id), DeleteMode::Explicit)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn owner_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let raw = headers
        .get(GUEST_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::bad_request("Missing X-Guest-UUID header", json!({ "header": GUEST_HEADER }))
        })?;

    Uuid::parse_str(raw.trim()).map_err(|_| {
        AppError::bad_request("Invalid X-Guest-UUID header", json!({ "header": GUEST_HEADER }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_owner_from_headers() {
        let owner = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            GUEST_HEADER,
            HeaderValue::from_str(&owner.to_string()).unwrap(),
        );

        assert_eq!(owner_from_headers(&headers).unwrap(), owner);
    }

    #[test]
    fn test_owner_header_missing_or_invalid() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            owner_from_headers(&headers).unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );

        headers.insert(GUEST_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert_eq!(
            owner_from_headers(&headers).unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
