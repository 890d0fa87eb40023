//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService};
use crate::domain::snapshot::LinkSnapshot;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Every lookup misses, so each resolution reads the store.
///
/// # Use Cases
///
/// - `CACHE_MAX_CAPACITY=0` to disable caching entirely
/// - Tests that must observe every store read
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get(&self, _short_code: &str) -> CacheResult<Option<LinkSnapshot>> {
        Ok(None)
    }

    async fn put(
        &self,
        _short_code: &str,
        _snapshot: &LinkSnapshot,
        _ttl: Duration,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn update_click_limit(&self, _short_code: &str, _click_limit: i32) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "none"
    }
}
