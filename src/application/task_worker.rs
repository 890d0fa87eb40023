//! Background executor for deferred tasks.

use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::application::services::{ClickAccountingService, DeletionCoordinator};
use crate::domain::deferred_task::DeferredTask;

/// Consumes [`DeferredTask`]s from the scheduler's channel.
///
/// Each task runs in its own tokio task, at most `concurrency` at a time. A
/// panicking or failing task is logged and never affects the others.
pub struct TaskWorker {
    accounting: Arc<ClickAccountingService>,
    deletion: Arc<DeletionCoordinator>,
}

impl TaskWorker {
    pub fn new(accounting: Arc<ClickAccountingService>, deletion: Arc<DeletionCoordinator>) -> Self {
        Self {
            accounting,
            deletion,
        }
    }

    /// Runs a single task to completion.
    pub async fn execute(&self, task: DeferredTask) {
        match task {
            DeferredTask::RecordClick {
                link_id,
                short_code,
                has_click_limit,
                context,
            } => {
                let update = self
                    .accounting
                    .record_and_decrement(link_id, &short_code, has_click_limit, &context)
                    .await;
                debug!(short_code, ?update, "Click accounted");
            }
            DeferredTask::PurgeLink {
                link_id,
                short_code,
            } => {
                if let Err(e) = self.deletion.purge(link_id, &short_code).await {
                    error!(short_code, error = %e, "Lazy deletion failed");
                }
            }
        }
    }

    /// Processes tasks until every sender is dropped, then waits for the
    /// tasks still in flight.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<DeferredTask>, concurrency: usize) {
        let permits = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut in_flight = JoinSet::new();

        info!(concurrency, "Task worker started");

        while let Some(task) = rx.recv().await {
            let Ok(permit) = permits.clone().acquire_owned().await else {
                break;
            };

            let worker = self.clone();
            in_flight.spawn(async move {
                worker.execute(task).await;
                drop(permit);
            });

            while let Some(done) = in_flight.try_join_next() {
                log_join_error(done);
            }
        }

        info!(pending = in_flight.len(), "Task queue closed, draining");
        while let Some(done) = in_flight.join_next().await {
            log_join_error(done);
        }
        info!("Task worker stopped");
    }
}

fn log_join_error(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Deferred task panicked");
    }
}
