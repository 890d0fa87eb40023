//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache and geo setup, worker spawning, and
//! the Axum server lifecycle including graceful shutdown.

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::time::timeout;

use crate::config::Config;
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::geo::{GeoResolver, IpApiLookup};
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::{AppState, StateSettings};

/// How long in-flight deferred tasks may take to finish after shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Cache (Redis, in-process, or none)
/// - Geo resolver
/// - Background task worker
/// - Axum HTTP server
///
/// On SIGINT/SIGTERM the server stops accepting connections, finishes open
/// requests, then lets the worker drain queued tasks.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache = build_cache(&config).await;
    let geo = build_geo(&config);

    let pool = Arc::new(pool);
    let wiring = AppState::build(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgClickRepository::new(pool)),
        cache,
        geo,
        StateSettings {
            cache_ttl: config.cache_ttl(),
            queue_capacity: config.click_queue_capacity,
            frontend_base_url: config.frontend_base_url.clone(),
            behind_proxy: config.behind_proxy,
            owner_link_limit: config.owner_link_limit,
        },
    );

    let worker = tokio::spawn(
        wiring
            .worker
            .run(wiring.task_rx, config.click_worker_concurrency),
    );

    let app = app_router(wiring.state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    // The router owns every scheduler handle, so once serve returns the task
    // channel closes and the worker drains.
    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, draining deferred tasks");
    match timeout(DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => tracing::info!("Deferred tasks drained"),
        Ok(Err(e)) => tracing::error!(error = %e, "Task worker panicked"),
        Err(_) => tracing::error!(
            timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "Deferred task drain timed out"
        ),
    }

    Ok(())
}

async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Redis when configured and reachable, otherwise the in-process cache.
/// A zero `cache_max_capacity` disables the in-process cache.
async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Falling back.", e);
            }
        }
    }

    if config.cache_max_capacity == 0 {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    } else {
        tracing::info!(
            max_capacity = config.cache_max_capacity,
            "Cache enabled (in-process)"
        );
        Arc::new(MemoryCache::new(config.cache_max_capacity))
    }
}

fn build_geo(config: &Config) -> GeoResolver {
    let Some(template) = &config.geoip_api_url else {
        tracing::info!("Geo lookup disabled");
        return GeoResolver::disabled();
    };

    let timeout = config.geo_lookup_timeout();
    match IpApiLookup::new(template, timeout) {
        Ok(lookup) => GeoResolver::new(Arc::new(lookup), timeout),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build geo client, lookups disabled");
            GeoResolver::disabled()
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
