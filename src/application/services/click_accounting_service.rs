//! Deferred click recording and click-limit accounting.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::services::DeletionCoordinator;
use crate::domain::entities::NewClick;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::domain::request_context::RequestContext;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::geo::GeoResolver;

const INSERT_ATTEMPTS: usize = 3;

/// What happened to a link's click limit after a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitUpdate {
    /// The link has no click limit.
    Unlimited,
    /// Decremented; this many redirects remain.
    Remaining(i32),
    /// Decremented to zero and the link was deleted.
    Exhausted,
    /// The store no longer has the link; its cache entry was evicted.
    Gone,
    /// Nothing to decrement because the store failed.
    Skipped,
}

/// Runs after a redirect was served. Never called on the request path.
///
/// Every step is best effort. Failures are logged and swallowed.
pub struct ClickAccountingService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
    cache: Arc<dyn CacheService>,
    deletion: Arc<DeletionCoordinator>,
    geo: GeoResolver,
}

impl ClickAccountingService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        clicks: Arc<dyn ClickRepository>,
        cache: Arc<dyn CacheService>,
        deletion: Arc<DeletionCoordinator>,
        geo: GeoResolver,
    ) -> Self {
        Self {
            links,
            clicks,
            cache,
            deletion,
            geo,
        }
    }

    /// Records a click, then decrements the link's click limit if it has one.
    ///
    /// The two writes are independent: a failed insert does not stop the
    /// decrement, since the redirect was already served. If the store reports
    /// the link gone, the cached snapshot that served the redirect is stale
    /// and gets evicted.
    pub async fn record_and_decrement(
        &self,
        link_id: Uuid,
        short_code: &str,
        has_click_limit: bool,
        context: &RequestContext,
    ) -> LimitUpdate {
        if let ClickWrite::LinkGone = self.record_click(link_id, context).await {
            self.evict_stale(short_code).await;
            return LimitUpdate::Gone;
        }

        if !has_click_limit {
            return LimitUpdate::Unlimited;
        }

        self.decrement(link_id, short_code).await
    }

    async fn record_click(&self, link_id: Uuid, context: &RequestContext) -> ClickWrite {
        let (country, flag) = self.geo.resolve(context.ip).await;
        let new_click = NewClick {
            short_link_id: link_id,
            country,
            flag,
            clicked_at: Utc::now(),
        };

        let strategy = ExponentialBackoff::from_millis(10)
            .max_delay(Duration::from_millis(500))
            .take(INSERT_ATTEMPTS - 1);

        // A missing link will not come back, so only other errors are retried.
        let result = RetryIf::spawn(
            strategy,
            || self.clicks.insert_click(new_click.clone()),
            |e: &AppError| !matches!(e, AppError::NotFound { .. }),
        )
        .await;

        match result {
            Ok(click) => {
                metrics::counter!("clicks_recorded_total").increment(1);
                debug!(%link_id, country = %click.country, "Click recorded");
                ClickWrite::Recorded
            }
            Err(AppError::NotFound { .. }) => {
                debug!(%link_id, "Link deleted before its click was recorded");
                ClickWrite::LinkGone
            }
            Err(e) => {
                warn!(%link_id, error = %e, "Failed to record click");
                ClickWrite::Failed
            }
        }
    }

    async fn decrement(&self, link_id: Uuid, short_code: &str) -> LimitUpdate {
        let remaining = match self.links.decrement_click_limit(link_id).await {
            Ok(Some(remaining)) => remaining,
            Ok(None) => {
                debug!(short_code, "No click limit left to decrement");
                self.evict_stale(short_code).await;
                return LimitUpdate::Gone;
            }
            Err(e) => {
                error!(short_code, error = %e, "Failed to decrement click limit");
                return LimitUpdate::Skipped;
            }
        };

        if remaining <= 0 {
            if let Err(e) = self.deletion.purge(link_id, short_code).await {
                error!(short_code, error = %e, "Failed to delete exhausted link");
            }
            return LimitUpdate::Exhausted;
        }

        if let Err(e) = self.cache.update_click_limit(short_code, remaining).await {
            warn!(short_code, error = %e, "Failed to update cached click limit");
        }
        LimitUpdate::Remaining(remaining)
    }

    async fn evict_stale(&self, short_code: &str) {
        if let Err(e) = self.cache.invalidate(short_code).await {
            warn!(short_code, error = %e, "Failed to evict stale cache entry");
        }
    }
}

enum ClickWrite {
    Recorded,
    LinkGone,
    Failed,
}
