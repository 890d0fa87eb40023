#![allow(dead_code)]

use axum::extract::ConnectInfo;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;
use uuid::Uuid;

use snaplink::application::task_worker::TaskWorker;
use snaplink::domain::deferred_task::DeferredTask;
use snaplink::domain::entities::{NewShortLink, ShortLink};
use snaplink::domain::repositories::LinkRepository;
use snaplink::infrastructure::cache::{CacheService, MemoryCache, NullCache};
use snaplink::infrastructure::geo::GeoResolver;
use snaplink::infrastructure::persistence::InMemoryStore;
use snaplink::state::{AppState, StateSettings};
use snaplink::utils::password::hash_password;

pub const FRONTEND: &str = "https://app.example.com";

/// A fully wired service on top of the in-memory store.
///
/// Deferred tasks are not processed until [`TestApp::drain`] is called.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
    pub cache: Arc<dyn CacheService>,
    pub worker: Arc<TaskWorker>,
    pub rx: mpsc::Receiver<DeferredTask>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(MemoryCache::new(1_000)))
    }

    pub fn without_cache() -> Self {
        Self::with_cache(Arc::new(NullCache::new()))
    }

    pub fn with_cache(cache: Arc<dyn CacheService>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let wiring = AppState::build(
            store.clone(),
            store.clone(),
            cache.clone(),
            GeoResolver::disabled(),
            StateSettings {
                cache_ttl: Duration::from_secs(60),
                queue_capacity: 100,
                frontend_base_url: FRONTEND.to_string(),
                behind_proxy: false,
                owner_link_limit: Some(5),
            },
        );

        Self {
            state: wiring.state,
            store,
            cache,
            worker: wiring.worker,
            rx: wiring.task_rx,
        }
    }

    /// Runs every queued deferred task, in order.
    pub async fn drain(&mut self) -> usize {
        let mut executed = 0;
        while let Ok(task) = self.rx.try_recv() {
            self.worker.execute(task).await;
            executed += 1;
        }
        executed
    }

    pub async fn seed(&self, link: LinkSeed) -> ShortLink {
        self.store.create(link.into_new()).await.unwrap()
    }
}

/// Builder for links inserted straight into the store.
pub struct LinkSeed {
    code: String,
    destination: String,
    owner_id: Uuid,
    password: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    click_limit: Option<i32>,
}

impl LinkSeed {
    pub fn new(code: &str, destination: &str) -> Self {
        Self {
            code: code.to_string(),
            destination: destination.to_string(),
            owner_id: Uuid::new_v4(),
            password: None,
            expires_at: None,
            click_limit: None,
        }
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn click_limit(mut self, limit: i32) -> Self {
        self.click_limit = Some(limit);
        self
    }

    fn into_new(self) -> NewShortLink {
        NewShortLink {
            short_code: self.code,
            destination: self.destination,
            owner_id: self.owner_id,
            is_protected: self.password.is_some(),
            password_hash: self.password.map(|p| hash_password(&p).unwrap()),
            expires_at: self.expires_at,
            click_limit: self.click_limit,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// The full router with a fake peer address attached.
pub fn test_router(state: AppState) -> axum::Router {
    snaplink::routes::router(state).layer(MockConnectInfoLayer)
}
