//! Short link creation.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{derive_short_code, is_reserved};
use crate::utils::password::hash_password;
use crate::utils::url_normalizer::normalize_url;

/// Attempts at finding a free code before giving up.
const MAX_CODE_ATTEMPTS: i64 = 10;

/// Validated input for [`LinkService::create_link`].
#[derive(Debug, Clone)]
pub struct CreateLink {
    pub owner_id: Uuid,
    pub destination: String,
    pub is_protected: bool,
    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_limit: Option<i32>,
}

/// Service for creating and retrieving short links.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    owner_link_limit: Option<i64>,
}

impl LinkService {
    /// `owner_link_limit` caps how many links a single owner may hold.
    pub fn new(links: Arc<dyn LinkRepository>, owner_link_limit: Option<i64>) -> Self {
        Self {
            links,
            owner_link_limit,
        }
    }

    /// Creates a short link for an owner.
    ///
    /// # Code Generation
    ///
    /// The code for an owner's `n`th link is derived from `(owner_id, n)`.
    /// On collision (or a reserved code) the next index is tried, up to
    /// [`MAX_CODE_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a bad destination, a past expiry, a
    ///   negative click limit, or a protected link without a password
    /// - [`AppError::Conflict`] if the owner already shortened this destination
    /// - [`AppError::Forbidden`] if the owner reached their link limit
    pub async fn create_link(&self, input: CreateLink) -> Result<ShortLink, AppError> {
        let destination = normalize_url(&input.destination).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        if let Some(expires_at) = input.expires_at
            && expires_at <= Utc::now()
        {
            return Err(AppError::bad_request(
                "Expiry must be in the future",
                json!({ "expires_at": expires_at }),
            ));
        }

        if let Some(limit) = input.click_limit
            && limit < 1
        {
            return Err(AppError::bad_request(
                "Click limit must be at least 1",
                json!({ "click_limit": limit }),
            ));
        }

        let password_hash = match (input.is_protected, input.password.as_deref()) {
            (true, Some(pw)) if !pw.is_empty() => Some(hash_password(pw).map_err(|e| {
                AppError::internal("Failed to hash password", json!({ "reason": e.to_string() }))
            })?),
            (true, _) => {
                return Err(AppError::bad_request(
                    "Protected links require a password",
                    json!({}),
                ));
            }
            (false, _) => None,
        };

        if self
            .links
            .find_by_owner_and_destination(input.owner_id, &destination)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "URL already shortened by this owner",
                json!({ "destination": destination }),
            ));
        }

        let existing = self.links.count_by_owner(input.owner_id).await?;
        if let Some(limit) = self.owner_link_limit
            && existing >= limit
        {
            return Err(AppError::forbidden(
                "Link limit reached",
                json!({ "limit": limit }),
            ));
        }

        for index in (existing + 1)..=(existing + MAX_CODE_ATTEMPTS) {
            let short_code = derive_short_code(input.owner_id, index);
            if is_reserved(&short_code) {
                continue;
            }

            let new_link = NewShortLink {
                short_code,
                destination: destination.clone(),
                owner_id: input.owner_id,
                is_protected: input.is_protected,
                password_hash: password_hash.clone(),
                expires_at: input.expires_at,
                click_limit: input.click_limit,
            };

            match self.links.create(new_link).await {
                Ok(link) => {
                    info!(short_code = %link.short_code, owner_id = %link.owner_id, "Link created");
                    return Ok(link);
                }
                Err(AppError::Conflict { .. }) => {
                    // Either the code is taken or a concurrent request stored
                    // the same destination; the next lookup tells them apart.
                    if self
                        .links
                        .find_by_owner_and_destination(input.owner_id, &destination)
                        .await?
                        .is_some()
                    {
                        return Err(AppError::conflict(
                            "URL already shortened by this owner",
                            json!({ "destination": destination }),
                        ));
                    }
                    warn!(index, "Short code collision, trying next index");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate a unique short code",
            json!({ "attempts": MAX_CODE_ATTEMPTS }),
        ))
    }

    pub async fn health_check(&self) -> bool {
        self.links.health_check().await
    }
}
