//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository and
//! cache calls. Services consume trait objects and provide a clean API for
//! HTTP handlers and the task worker.
//!
//! # Available Services
//!
//! - [`services::ResolutionService`] - Redirect resolution and password checks
//! - [`services::ClickAccountingService`] - Deferred click recording and limit decrement
//! - [`services::DeletionCoordinator`] - Cascading deletion from store and cache
//! - [`services::LinkService`] - Short link creation
//! - [`task_worker::TaskWorker`] - Executes deferred tasks off the request path

pub mod services;
pub mod task_worker;
