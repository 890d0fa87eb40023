//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::snapshot::LinkSnapshot;

/// Errors that can occur during cache operations.
///
/// Never escalated past the cache boundary: callers log them and fall back
/// to the store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Fast-path cache of link snapshots, keyed by short code.
///
/// Implementations must be thread-safe and fail open: an unreachable backend
/// behaves like an empty cache. The store stays authoritative; cached policy
/// data may be slightly stale.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis hashes with per-key TTL
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process moka cache
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the snapshot cached for a short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(snapshot))` on cache hit
    /// - `Ok(None)` on miss, on a malformed entry, or on backend error
    async fn get(&self, short_code: &str) -> CacheResult<Option<LinkSnapshot>>;

    /// Stores a snapshot that expires after `ttl`.
    ///
    /// Callers compute `ttl` with [`LinkSnapshot::cache_ttl`] so the entry never
    /// outlives the link.
    async fn put(&self, short_code: &str, snapshot: &LinkSnapshot, ttl: Duration)
    -> CacheResult<()>;

    /// Overwrites the cached click limit without touching any other field.
    ///
    /// Does nothing when no entry exists for `short_code`; a later miss
    /// repopulates it from the store.
    async fn update_click_limit(&self, short_code: &str, click_limit: i32) -> CacheResult<()>;

    /// Removes a cached snapshot.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
}
