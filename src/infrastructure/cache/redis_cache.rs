//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::snapshot::{FIELD_CLICK_LIMIT, LinkSnapshot};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Sets a single hash field only if the key still exists, preserving its TTL.
const UPDATE_FIELD_IF_EXISTS: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    return 1
end
return 0
"#;

/// Redis cache storing each snapshot as a hash under `link:{code}`.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection reuse.
/// All operations are fail-open: errors are logged but don't propagate to callers.
pub struct RedisCache {
    client: ConnectionManager,
    key_prefix: String,
    update_script: Script,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: "link:".to_string(),
            update_script: Script::new(UPDATE_FIELD_IF_EXISTS),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, short_code: &str) -> String {
        format!("{}{}", self.key_prefix, short_code)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, short_code: &str) -> CacheResult<Option<LinkSnapshot>> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        match conn.hgetall::<_, HashMap<String, String>>(&key).await {
            Ok(fields) if fields.is_empty() => {
                debug!("Cache MISS: {}", short_code);
                Ok(None)
            }
            Ok(fields) => match LinkSnapshot::from_fields(&fields) {
                Some(snapshot) => {
                    debug!("Cache HIT: {}", short_code);
                    Ok(Some(snapshot))
                }
                None => {
                    warn!("Malformed cache entry for {}, ignoring", short_code);
                    Ok(None)
                }
            },
            Err(e) => {
                error!("Redis HGETALL error for {}: {}", short_code, e);
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
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();
        let fields = snapshot.to_fields();
        let ttl_ms = ttl.as_millis().max(1) as i64;

        // DEL first so optional fields absent from the new snapshot don't linger.
        let result = redis::pipe()
            .atomic()
            .del(&key)
            .hset_multiple(&key, &fields)
            .pexpire(&key, ttl_ms)
            .query_async::<()>(&mut conn)
            .await;

        match result {
            Ok(()) => {
                debug!("Cache SET: {} (TTL: {}ms)", short_code, ttl_ms);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", short_code, e);
                Ok(())
            }
        }
    }

    async fn update_click_limit(&self, short_code: &str, click_limit: i32) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        match self
            .update_script
            .key(&key)
            .arg(FIELD_CLICK_LIMIT)
            .arg(click_limit)
            .invoke_async::<i32>(&mut conn)
            .await
        {
            Ok(1) => {
                debug!("Cache UPDATE: {} click_limit={}", short_code, click_limit);
                Ok(())
            }
            Ok(_) => {
                debug!("Cache UPDATE skipped, no entry for {}", short_code);
                Ok(())
            }
            Err(e) => {
                warn!("Redis HSET error for {}: {}", short_code, e);
                Ok(())
            }
        }
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Cache INVALIDATE: {}", short_code);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", short_code, e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
