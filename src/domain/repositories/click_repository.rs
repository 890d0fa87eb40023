//! Repository trait for click event storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;

/// Store for recorded clicks.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryStore`] - In-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Inserts a click for a link.
    async fn insert_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Counts clicks recorded for a link.
    async fn count_by_link_id(&self, link_id: Uuid) -> Result<i64, AppError>;
}
