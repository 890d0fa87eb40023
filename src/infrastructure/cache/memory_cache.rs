//! In-process cache backed by moka.

use super::service::{CacheResult, CacheService};
use crate::domain::snapshot::LinkSnapshot;
use async_trait::async_trait;
use moka::future::Cache;
use moka::ops::compute::Op;
use moka::policy::Expiry;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedSnapshot {
    snapshot: LinkSnapshot,
    ttl: Duration,
    /// False for in-place field updates, which keep the remaining TTL.
    reset_ttl: bool,
}

/// Per-entry expiry taken from the TTL passed to `put`.
struct SnapshotExpiry;

impl Expiry<String, CachedSnapshot> for SnapshotExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedSnapshot,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedSnapshot,
        _updated_at: Instant,
        duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        if value.reset_ttl {
            Some(value.ttl)
        } else {
            duration_until_expiry
        }
    }
}

/// Cache used when no Redis is configured.
///
/// Bounded by entry count; each entry expires after the TTL it was stored with.
pub struct MemoryCache {
    inner: Cache<String, CachedSnapshot>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(SnapshotExpiry)
            .build();

        debug!("MemoryCache initialized with max capacity: {}", max_capacity);
        Self { inner }
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, short_code: &str) -> CacheResult<Option<LinkSnapshot>> {
        match self.inner.get(short_code).await {
            Some(cached) => {
                debug!("Cache HIT: {}", short_code);
                Ok(Some(cached.snapshot))
            }
            None => {
                debug!("Cache MISS: {}", short_code);
                Ok(None)
            }
        }
    }

    async fn put(
        &self,
        short_code: &str,
        snapshot: &LinkSnapshot,
        ttl: Duration,
    ) -> CacheResult<()> {
        let cached = CachedSnapshot {
            snapshot: snapshot.clone(),
            ttl,
            reset_ttl: true,
        };
        self.inner.insert(short_code.to_string(), cached).await;
        debug!("Cache SET: {} (TTL: {:?})", short_code, ttl);
        Ok(())
    }

    async fn update_click_limit(&self, short_code: &str, click_limit: i32) -> CacheResult<()> {
        self.inner
            .entry_by_ref(short_code)
            .and_compute_with(|entry| async move {
                match entry {
                    Some(entry) => {
                        let mut cached = entry.into_value();
                        cached.snapshot.click_limit = Some(click_limit);
                        cached.reset_ttl = false;
                        Op::Put(cached)
                    }
                    None => Op::Nop,
                }
            })
            .await;
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.inner.invalidate(short_code).await;
        debug!("Cache INVALIDATE: {}", short_code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
