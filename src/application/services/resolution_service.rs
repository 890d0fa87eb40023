//! Redirect resolution: cache, then store, then policy.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::domain::deferred_task::{DeferredTask, TaskScheduler};
use crate::domain::outcome::Outcome;
use crate::domain::repositories::LinkRepository;
use crate::domain::request_context::RequestContext;
use crate::domain::snapshot::{LinkSnapshot, Verdict};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::password::{PasswordError, verify_password};

/// Decides what a short code resolves to.
///
/// The request path does at most a cache read, a store read and a cache
/// write. Click accounting and lazy deletion are handed to the
/// [`TaskScheduler`] and never awaited.
pub struct ResolutionService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    scheduler: TaskScheduler,
    cache_ttl: Duration,
}

impl ResolutionService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        scheduler: TaskScheduler,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            links,
            cache,
            scheduler,
            cache_ttl,
        }
    }

    /// Resolves a short code for a plain `GET /{code}`.
    ///
    /// # Returns
    ///
    /// `Redirect`, `RedirectToPasswordPrompt`, `NotFound`, `Expired` or `Exhausted`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store read fails. Cache failures
    /// are never surfaced.
    pub async fn resolve(&self, code: &str, context: RequestContext) -> Result<Outcome, AppError> {
        let Some(snapshot) = self.load_snapshot(code).await? else {
            return Ok(self.finish(code, Outcome::NotFound));
        };

        let outcome = match snapshot.verdict(Utc::now()) {
            Verdict::Expired => {
                self.retire(code, &snapshot).await;
                Outcome::Expired
            }
            Verdict::Exhausted => {
                self.retire(code, &snapshot).await;
                Outcome::Exhausted
            }
            Verdict::PasswordRequired => Outcome::RedirectToPasswordPrompt,
            Verdict::Allowed => self.serve(code, snapshot, context),
        };

        Ok(self.finish(code, outcome))
    }

    /// Resolves a protected link after checking its password.
    ///
    /// Always reads the store; password hashes never enter the cache. The
    /// password is checked before expiry and click limit.
    ///
    /// # Returns
    ///
    /// `Redirect`, `WrongPassword`, `NotProtected`, `NotFound`, `Expired` or `Exhausted`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store read fails or the stored
    /// hash is unreadable.
    pub async fn resolve_protected(
        &self,
        code: &str,
        password: &str,
        context: RequestContext,
    ) -> Result<Outcome, AppError> {
        let Some(link) = self.links.find_by_code(code).await? else {
            return Ok(self.finish(code, Outcome::NotFound));
        };

        let hash = match (&link.password_hash, link.is_protected) {
            (Some(hash), true) => hash.clone(),
            _ => return Ok(self.finish(code, Outcome::NotProtected)),
        };

        if !check_password(password.to_string(), hash).await? {
            return Ok(self.finish(code, Outcome::WrongPassword));
        }

        let snapshot = link.snapshot();
        let outcome = match snapshot.verdict(Utc::now()) {
            Verdict::Expired => {
                self.retire(code, &snapshot).await;
                Outcome::Expired
            }
            Verdict::Exhausted => {
                self.retire(code, &snapshot).await;
                Outcome::Exhausted
            }
            Verdict::PasswordRequired | Verdict::Allowed => self.serve(code, snapshot, context),
        };

        Ok(self.finish(code, outcome))
    }

    /// Returns the cached snapshot, or reads the store and caches it.
    ///
    /// The cache write is awaited so the next resolve is served from cache.
    pub async fn load_snapshot(&self, code: &str) -> Result<Option<LinkSnapshot>, AppError> {
        match self.cache.get(code).await {
            Ok(Some(snapshot)) => return Ok(Some(snapshot)),
            Ok(None) => {}
            Err(e) => warn!(short_code = code, error = %e, "Cache read failed, using store"),
        }

        let Some(link) = self.links.find_by_code(code).await? else {
            return Ok(None);
        };

        let snapshot = link.snapshot();
        match snapshot.cache_ttl(Utc::now(), self.cache_ttl) {
            Some(ttl) => {
                if let Err(e) = self.cache.put(code, &snapshot, ttl).await {
                    warn!(short_code = code, error = %e, "Cache write failed");
                }
            }
            None => debug!(short_code = code, "Not caching expired link"),
        }

        Ok(Some(snapshot))
    }

    fn serve(&self, code: &str, snapshot: LinkSnapshot, context: RequestContext) -> Outcome {
        self.scheduler.schedule(DeferredTask::RecordClick {
            link_id: snapshot.link_id,
            short_code: code.to_string(),
            has_click_limit: snapshot.click_limit.is_some(),
            context,
        });

        Outcome::Redirect {
            destination: snapshot.destination,
        }
    }

    /// Evicts the entry now and schedules the store deletion.
    async fn retire(&self, code: &str, snapshot: &LinkSnapshot) {
        if let Err(e) = self.cache.invalidate(code).await {
            warn!(short_code = code, error = %e, "Cache eviction failed");
        }

        self.scheduler.schedule(DeferredTask::PurgeLink {
            link_id: snapshot.link_id,
            short_code: code.to_string(),
        });
    }

    fn finish(&self, code: &str, outcome: Outcome) -> Outcome {
        debug!(short_code = code, outcome = outcome.label(), "Resolved");
        metrics::counter!("redirect_outcomes_total", "outcome" => outcome.label()).increment(1);
        outcome
    }
}

/// Argon2 verification is CPU-bound; keep it off the async workers.
async fn check_password(password: String, hash: String) -> Result<bool, AppError> {
    let result = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            error!(error = %e, "Password verification task failed");
            AppError::internal("Password verification failed", json!({}))
        })?;

    result.map_err(|e: PasswordError| {
        error!(error = %e, "Stored password hash is unreadable");
        AppError::internal("Password verification failed", json!({}))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewShortLink, ShortLink};
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{MemoryCache, NullCache};
    use crate::utils::password::hash_password;
    use chrono::Duration as ChronoDuration;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn link(code: &str) -> ShortLink {
        NewShortLink {
            short_code: code.to_string(),
            destination: "https://example.com".to_string(),
            owner_id: Uuid::new_v4(),
            is_protected: false,
            password_hash: None,
            expires_at: None,
            click_limit: None,
        }
        .into_link(Uuid::new_v4(), Utc::now())
    }

    fn service_with(
        links: MockLinkRepository,
        cache: Arc<dyn CacheService>,
    ) -> (ResolutionService, mpsc::Receiver<DeferredTask>) {
        let (scheduler, rx) = TaskScheduler::channel(16);
        let svc = ResolutionService::new(Arc::new(links), cache, scheduler, Duration::from_secs(60));
        (svc, rx)
    }

    fn returning_link(link: ShortLink) -> MockLinkRepository {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .returning(move |_| Ok(Some(link.clone())));
        links
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().returning(|_| Ok(None));
        let (svc, mut rx) = service_with(links, Arc::new(NullCache::new()));

        let outcome = svc.resolve("nope", RequestContext::default()).await.unwrap();

        assert_eq!(outcome, Outcome::NotFound);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_redirect_schedules_click() {
        let l = link("abc123");
        let link_id = l.id;
        let (svc, mut rx) = service_with(returning_link(l), Arc::new(NullCache::new()));

        let outcome = svc.resolve("abc123", RequestContext::default()).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Redirect {
                destination: "https://example.com".to_string()
            }
        );
        assert!(matches!(
            rx.try_recv().unwrap(),
            DeferredTask::RecordClick { link_id: id, has_click_limit: false, .. } if id == link_id
        ));
    }

    #[tokio::test]
    async fn test_second_resolve_is_served_from_cache() {
        let mut links = MockLinkRepository::new();
        let l = link("abc123");
        links
            .expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(l.clone())));
        let (svc, _rx) = service_with(links, Arc::new(MemoryCache::new(10)));

        let first = svc.resolve("abc123", RequestContext::default()).await.unwrap();
        let second = svc.resolve("abc123", RequestContext::default()).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let mut past = link("old");
        past.expires_at = Some(Utc::now() - ChronoDuration::seconds(1));
        let (svc, mut rx) = service_with(returning_link(past), Arc::new(MemoryCache::new(10)));
        assert_eq!(
            svc.resolve("old", RequestContext::default()).await.unwrap(),
            Outcome::Expired
        );
        assert!(matches!(rx.try_recv().unwrap(), DeferredTask::PurgeLink { .. }));

        let mut future = link("new");
        future.expires_at = Some(Utc::now() + ChronoDuration::hours(1));
        let (svc, _rx) = service_with(returning_link(future), Arc::new(MemoryCache::new(10)));
        assert!(matches!(
            svc.resolve("new", RequestContext::default()).await.unwrap(),
            Outcome::Redirect { .. }
        ));
    }

    #[tokio::test]
    async fn test_zero_limit_is_exhausted_and_evicted() {
        let mut l = link("done");
        l.click_limit = Some(0);
        let cache = Arc::new(MemoryCache::new(10));
        cache
            .put("done", &l.snapshot(), Duration::from_secs(60))
            .await
            .unwrap();
        let (svc, mut rx) = service_with(MockLinkRepository::new(), cache.clone());

        let outcome = svc.resolve("done", RequestContext::default()).await.unwrap();

        assert_eq!(outcome, Outcome::Exhausted);
        assert!(cache.get("done").await.unwrap().is_none());
        assert!(matches!(rx.try_recv().unwrap(), DeferredTask::PurgeLink { .. }));
    }

    #[tokio::test]
    async fn test_protected_link_prompts_without_click() {
        let mut l = link("secret");
        l.is_protected = true;
        l.password_hash = Some("unused".to_string());
        let (svc, mut rx) = service_with(returning_link(l), Arc::new(NullCache::new()));

        let outcome = svc.resolve("secret", RequestContext::default()).await.unwrap();

        assert_eq!(outcome, Outcome::RedirectToPasswordPrompt);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        let (svc, _rx) = service_with(links, Arc::new(NullCache::new()));

        let result = svc.resolve("abc123", RequestContext::default()).await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_password_paths() {
        let mut protected = link("secret");
        protected.is_protected = true;
        protected.password_hash = Some(hash_password("open-sesame").unwrap());
        let (svc, mut rx) = service_with(returning_link(protected), Arc::new(NullCache::new()));

        assert_eq!(
            svc.resolve_protected("secret", "wrong", RequestContext::default())
                .await
                .unwrap(),
            Outcome::WrongPassword
        );
        assert!(rx.try_recv().is_err());

        assert!(matches!(
            svc.resolve_protected("secret", "open-sesame", RequestContext::default())
                .await
                .unwrap(),
            Outcome::Redirect { .. }
        ));
        assert!(matches!(rx.try_recv().unwrap(), DeferredTask::RecordClick { .. }));

        let (svc, _rx) = service_with(returning_link(link("plain")), Arc::new(NullCache::new()));
        assert_eq!(
            svc.resolve_protected("plain", "anything", RequestContext::default())
                .await
                .unwrap(),
            Outcome::NotProtected
        );
    }

    #[tokio::test]
    async fn test_malformed_hash_is_internal_error() {
        let mut l = link("broken");
        l.is_protected = true;
        l.password_hash = Some("not-a-phc-string".to_string());
        let (svc, _rx) = service_with(returning_link(l), Arc::new(NullCache::new()));

        let result = svc
            .resolve_protected("broken", "pw", RequestContext::default())
            .await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }
}
