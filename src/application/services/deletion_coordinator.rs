//! Cascading deletion of a link from store and cache.

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Which link to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Id(Uuid),
    Code(String),
}

/// Who is asking.
///
/// `Explicit` is a user-facing delete request, where a missing link is an
/// error. `Lazy` is internal cleanup after a read found the link expired or
/// exhausted, where a missing link means someone else already cleaned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    Explicit,
    Lazy,
}

/// Removes a link's clicks, the link itself, then its cache entry.
pub struct DeletionCoordinator {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
}

impl DeletionCoordinator {
    pub fn new(links: Arc<dyn LinkRepository>, cache: Arc<dyn CacheService>) -> Self {
        Self { links, cache }
    }

    /// Deletes a link by id or short code.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if a link was deleted, `Ok(false)` if it was already gone
    /// (lazy mode only).
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] in explicit mode when no link matches
    /// - [`AppError::Internal`] on store failure
    pub async fn delete_link(
        &self,
        target: DeleteTarget,
        mode: DeleteMode,
    ) -> Result<bool, AppError> {
        let (link_id, known_code) = match &target {
            DeleteTarget::Id(id) => (Some(*id), None),
            DeleteTarget::Code(code) => {
                let id = self.links.find_by_code(code).await?.map(|l| l.id);
                (id, Some(code.clone()))
            }
        };

        let deleted_code = match link_id {
            Some(id) => self.links.delete_with_clicks(id).await?,
            None => None,
        };

        // A code target may still have a stale entry even if the row is gone.
        if let Some(code) = deleted_code.as_deref().or(known_code.as_deref()) {
            self.evict(code).await;
        }

        match (deleted_code, mode) {
            (Some(code), _) => {
                info!(short_code = %code, mode = ?mode, "Link deleted");
                Ok(true)
            }
            (None, DeleteMode::Lazy) => {
                debug!(link = ?target, "Link already deleted");
                Ok(false)
            }
            (None, DeleteMode::Explicit) => Err(AppError::not_found(
                "Short link not found",
                match target {
                    DeleteTarget::Id(id) => json!({ "id": id }),
                    DeleteTarget::Code(code) => json!({ "short_code": code }),
                },
            )),
        }
    }

    /// Lazy cleanup when both id and code are already known.
    ///
    /// Always evicts `short_code`, even if the row was already gone.
    pub async fn purge(&self, link_id: Uuid, short_code: &str) -> Result<bool, AppError> {
        let deleted = self.links.delete_with_clicks(link_id).await?;
        self.evict(short_code).await;

        if deleted.is_some() {
            info!(short_code, "Link purged");
        }
        Ok(deleted.is_some())
    }

    async fn evict(&self, short_code: &str) {
        if let Err(e) = self.cache.invalidate(short_code).await {
            warn!(short_code, error = %e, "Failed to evict cache entry");
        }
    }
}
