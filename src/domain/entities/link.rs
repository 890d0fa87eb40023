//! Short link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::snapshot::LinkSnapshot;

/// A shortened URL with its access policy.
///
/// `click_limit` is the number of redirects the link will still serve. It only
/// ever decreases, and a link whose limit reaches zero is deleted.
#[derive(Debug, Clone)]
pub struct ShortLink {
    pub id: Uuid,
    pub short_code: String,
    pub destination: String,
    pub owner_id: Uuid,
    pub is_protected: bool,
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_limit: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    /// Returns true if the link has passed its expiry time at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e <= now)
    }

    /// Returns true if the link has no redirects left.
    pub fn is_exhausted(&self) -> bool {
        self.click_limit.is_some_and(|limit| limit <= 0)
    }

    /// Builds the cacheable policy view of this link.
    ///
    /// The password hash is deliberately left out: it never enters the cache.
    pub fn snapshot(&self) -> LinkSnapshot {
        LinkSnapshot {
            link_id: self.id,
            destination: self.destination.clone(),
            expires_at: self.expires_at,
            click_limit: self.click_limit,
            is_protected: self.is_protected,
        }
    }
}

/// Input data for creating a new short link.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub short_code: String,
    pub destination: String,
    pub owner_id: Uuid,
    pub is_protected: bool,
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_limit: Option<i32>,
}

impl NewShortLink {
    /// Materializes the record with a fresh id and creation timestamp.
    pub fn into_link(self, id: Uuid, created_at: DateTime<Utc>) -> ShortLink {
        ShortLink {
            id,
            short_code: self.short_code,
            destination: self.destination,
            owner_id: self.owner_id,
            is_protected: self.is_protected,
            password_hash: self.password_hash,
            expires_at: self.expires_at,
            click_limit: self.click_limit,
            created_at,
        }
    }
}
