//! Shared application state and service wiring.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::services::{
    ClickAccountingService, DeletionCoordinator, LinkService, ResolutionService,
};
use crate::application::task_worker::TaskWorker;
use crate::domain::deferred_task::{DeferredTask, TaskScheduler};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::geo::GeoResolver;

/// State injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub resolution_service: Arc<ResolutionService>,
    pub link_service: Arc<LinkService>,
    pub deletion_coordinator: Arc<DeletionCoordinator>,
    pub cache: Arc<dyn CacheService>,
    pub scheduler: TaskScheduler,
    /// Base of the password prompt page, without trailing slash.
    pub frontend_base_url: String,
    pub behind_proxy: bool,
}

/// Knobs that shape the wiring but aren't dependencies themselves.
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub cache_ttl: Duration,
    pub queue_capacity: usize,
    pub frontend_base_url: String,
    pub behind_proxy: bool,
    pub owner_link_limit: Option<i64>,
}

/// Everything [`AppState::build`] produces.
pub struct Wiring {
    pub state: AppState,
    pub worker: Arc<TaskWorker>,
    pub task_rx: mpsc::Receiver<DeferredTask>,
}

impl AppState {
    /// Wires services, scheduler and worker around the given store, cache and geo resolver.
    ///
    /// The caller spawns `worker.run(task_rx, ..)`. The task channel closes once
    /// every clone of the returned state is dropped.
    pub fn build(
        links: Arc<dyn LinkRepository>,
        clicks: Arc<dyn ClickRepository>,
        cache: Arc<dyn CacheService>,
        geo: GeoResolver,
        settings: StateSettings,
    ) -> Wiring {
        let (scheduler, task_rx) = TaskScheduler::channel(settings.queue_capacity);

        let deletion_coordinator = Arc::new(DeletionCoordinator::new(links.clone(), cache.clone()));
        let accounting = Arc::new(ClickAccountingService::new(
            links.clone(),
            clicks,
            cache.clone(),
            deletion_coordinator.clone(),
            geo,
        ));
        let worker = Arc::new(TaskWorker::new(accounting, deletion_coordinator.clone()));

        let resolution_service = Arc::new(ResolutionService::new(
            links.clone(),
            cache.clone(),
            scheduler.clone(),
            settings.cache_ttl,
        ));
        let link_service = Arc::new(LinkService::new(links, settings.owner_link_limit));

        let state = AppState {
            resolution_service,
            link_service,
            deletion_coordinator,
            cache,
            scheduler,
            frontend_base_url: settings.frontend_base_url,
            behind_proxy: settings.behind_proxy,
        };

        Wiring {
            state,
            worker,
            task_rx,
        }
    }

    /// Where a protected link's password prompt lives.
    pub fn password_prompt_url(&self, code: &str) -> String {
        format!("{}/secure/{}", self.frontend_base_url, code)
    }
}
