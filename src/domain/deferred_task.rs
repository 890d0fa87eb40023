//! Work deferred past the redirect response.
//!
//! Handlers never await click recording or lazy deletion. They enqueue a
//! [`DeferredTask`] through a [`TaskScheduler`] and return; the background
//! worker ([`crate::application::task_worker`]) executes it later.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{error, warn};
use uuid::Uuid;

use crate::domain::request_context::RequestContext;

/// A unit of background work produced by the resolution path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredTask {
    /// Record a click and, if the link is limited, decrement its counter.
    RecordClick {
        link_id: Uuid,
        short_code: String,
        has_click_limit: bool,
        context: RequestContext,
    },
    /// Remove a link found expired or exhausted at read time.
    PurgeLink { link_id: Uuid, short_code: String },
}

impl DeferredTask {
    pub fn kind(&self) -> &'static str {
        match self {
            DeferredTask::RecordClick { .. } => "record_click",
            DeferredTask::PurgeLink { .. } => "purge_link",
        }
    }
}

/// Non-blocking handle for enqueueing deferred work.
///
/// Backed by a bounded channel. When the queue is full the task is dropped
/// and counted; the request that produced it is never delayed.
#[derive(Debug, Clone)]
pub struct TaskScheduler {
    sender: mpsc::Sender<DeferredTask>,
}

impl TaskScheduler {
    pub fn new(sender: mpsc::Sender<DeferredTask>) -> Self {
        Self { sender }
    }

    /// Creates a scheduler together with the receiving end for the worker.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DeferredTask>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Enqueues a task without waiting. Returns false if it was dropped.
    pub fn schedule(&self, task: DeferredTask) -> bool {
        match self.sender.try_send(task) {
            Ok(()) => true,
            Err(TrySendError::Full(task)) => {
                warn!(kind = task.kind(), "Deferred task queue full, dropping task");
                metrics::counter!("deferred_tasks_dropped_total", "reason" => "full").increment(1);
                false
            }
            Err(TrySendError::Closed(task)) => {
                error!(kind = task.kind(), "Deferred task queue closed, dropping task");
                metrics::counter!("deferred_tasks_dropped_total", "reason" => "closed")
                    .increment(1);
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Remaining free slots in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purge(code: &str) -> DeferredTask {
        DeferredTask::PurgeLink {
            link_id: Uuid::new_v4(),
            short_code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_schedule_delivers_task() {
        let (scheduler, mut rx) = TaskScheduler::channel(4);
        let task = purge("abc123");

        assert!(scheduler.schedule(task.clone()));
        assert_eq!(rx.recv().await, Some(task));
    }

    #[test]
    fn test_schedule_drops_when_full() {
        let (scheduler, _rx) = TaskScheduler::channel(1);

        assert!(scheduler.schedule(purge("one")));
        assert!(!scheduler.schedule(purge("two")));
        assert_eq!(scheduler.capacity(), 0);
    }

    #[test]
    fn test_schedule_drops_when_closed() {
        let (scheduler, rx) = TaskScheduler::channel(1);
        drop(rx);

        assert!(scheduler.is_closed());
        assert!(!scheduler.schedule(purge("late")));
    }
}
