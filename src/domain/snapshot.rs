//! Typed cache snapshot of a short link's redirect policy.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

const FIELD_LINK_ID: &str = "link_id";
const FIELD_DESTINATION: &str = "destination";
const FIELD_EXPIRES_AT: &str = "expires_at";
/// Hash field updated in place after every click-limit decrement.
pub const FIELD_CLICK_LIMIT: &str = "click_limit";
const FIELD_IS_PROTECTED: &str = "is_protected";

/// Everything the resolution path needs to decide a redirect.
///
/// Built either from a [`crate::domain::entities::ShortLink`] read from the store
/// or from cached hash fields via [`LinkSnapshot::from_fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSnapshot {
    pub link_id: Uuid,
    pub destination: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_limit: Option<i32>,
    pub is_protected: bool,
}

/// Result of evaluating a snapshot's policy at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Expired,
    Exhausted,
    PasswordRequired,
    Allowed,
}

impl LinkSnapshot {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e <= now)
    }

    pub fn is_exhausted(&self) -> bool {
        self.click_limit.is_some_and(|limit| limit <= 0)
    }

    /// Applies the policy checks in order: expiry, click limit, password.
    pub fn verdict(&self, now: DateTime<Utc>) -> Verdict {
        if self.is_expired_at(now) {
            Verdict::Expired
        } else if self.is_exhausted() {
            Verdict::Exhausted
        } else if self.is_protected {
            Verdict::PasswordRequired
        } else {
            Verdict::Allowed
        }
    }

    /// Time-to-live for a cache entry written at `now`.
    ///
    /// The entry never outlives the link's expiry and is capped at `default_ttl`.
    /// Returns `None` when the link is already expired and must not be cached.
    pub fn cache_ttl(&self, now: DateTime<Utc>, default_ttl: Duration) -> Option<Duration> {
        match self.expires_at {
            Some(expires_at) => {
                let remaining = (expires_at - now).to_std().ok()?;
                if remaining.is_zero() {
                    return None;
                }
                Some(remaining.min(default_ttl))
            }
            None => Some(default_ttl),
        }
    }

    /// Flattens the snapshot into hash fields. Absent optionals are omitted.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            (FIELD_LINK_ID, self.link_id.to_string()),
            (FIELD_DESTINATION, self.destination.clone()),
            (
                FIELD_IS_PROTECTED,
                if self.is_protected { "1" } else { "0" }.to_string(),
            ),
        ];

        if let Some(expires_at) = self.expires_at {
            fields.push((FIELD_EXPIRES_AT, expires_at.to_rfc3339()));
        }
        if let Some(limit) = self.click_limit {
            fields.push((FIELD_CLICK_LIMIT, limit.to_string()));
        }

        fields
    }

    /// Rebuilds a snapshot from hash fields.
    ///
    /// Returns `None` if a required field is missing or any field fails to
    /// parse; callers treat that as a cache miss.
    pub fn from_fields(fields: &HashMap<String, String>) -> Option<Self> {
        let link_id = fields.get(FIELD_LINK_ID)?.parse().ok()?;
        let destination = fields.get(FIELD_DESTINATION)?.clone();
        let is_protected = match fields.get(FIELD_IS_PROTECTED)?.as_str() {
            "1" => true,
            "0" => false,
            _ => return None,
        };

        let expires_at = match fields.get(FIELD_EXPIRES_AT) {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .ok()?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        let click_limit = match fields.get(FIELD_CLICK_LIMIT) {
            Some(raw) => Some(raw.parse().ok()?),
            None => None,
        };

        Some(Self {
            link_id,
            destination,
            expires_at,
            click_limit,
            is_protected,
        })
    }
}
