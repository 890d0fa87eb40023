//! DTOs for link creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::ShortLink;

/// Request body for `POST /links`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[serde(alias = "long_url")]
    #[validate(length(min = 1, max = 2048))]
    pub destination: String,

    #[serde(default)]
    pub is_protected: bool,

    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,

    /// `YYYY-MM-DD` or RFC 3339.
    pub expires_at: Option<String>,

    #[validate(range(min = 1))]
    pub click_limit: Option<i32>,
}

/// A created link. The password hash is never returned.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub short_code: String,
    pub destination: String,
    pub owner_id: Uuid,
    pub is_protected: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_limit: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<ShortLink> for LinkResponse {
    fn from(link: ShortLink) -> Self {
        Self {
            id: link.id,
            short_code: link.short_code,
            destination: link.destination,
            owner_id: link.owner_id,
            is_protected: link.is_protected,
            expires_at: link.expires_at,
            click_limit: link.click_limit,
            created_at: link.created_at,
        }
    }
}
