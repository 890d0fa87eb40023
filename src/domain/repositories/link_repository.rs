//! Repository trait for short link data access.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;

/// Durable store for short links. This is the single source of truth; the
/// cache only ever mirrors it.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryStore`] - In-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken or the
    /// owner already shortened this destination.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its short code.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Finds a link by its id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ShortLink>, AppError>;

    /// Finds an owner's existing link to the same destination.
    async fn find_by_owner_and_destination(
        &self,
        owner_id: Uuid,
        destination: &str,
    ) -> Result<Option<ShortLink>, AppError>;

    /// Counts links created by an owner.
    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, AppError>;

    /// Atomically decrements the click limit of a link that still has clicks left.
    ///
    /// Must be a single conditional update so concurrent redirects never lose a
    /// decrement and the counter never drops below zero.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(remaining))` after a successful decrement
    /// - `Ok(None)` if the link is gone, unlimited, or already at zero
    async fn decrement_click_limit(&self, id: Uuid) -> Result<Option<i32>, AppError>;

    /// Deletes every click owned by the link, then the link row, as one unit.
    ///
    /// # Returns
    ///
    /// The deleted link's short code, or `None` if no row matched.
    async fn delete_with_clicks(&self, id: Uuid) -> Result<Option<String>, AppError>;

    /// Checks that the store is reachable.
    async fn health_check(&self) -> bool;
}
