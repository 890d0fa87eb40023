//! Domain layer containing business entities and contracts.
//!
//! Nothing in this layer talks to a database, cache or network directly.
//!
//! # Architecture
//!
//! - [`entities`] - Short links and clicks
//! - [`repositories`] - Durable store trait definitions
//! - [`snapshot`] - Typed cache view of a link's redirect policy
//! - [`outcome`] - Resolution outcomes
//! - [`request_context`] - Client metadata carried into background work
//! - [`deferred_task`] - Background work items and the non-blocking scheduler
//!
//! # Redirect Flow
//!
//! 1. HTTP handler asks the resolution service for an [`outcome::Outcome`]
//! 2. Policy is evaluated on a [`snapshot::LinkSnapshot`] (cache or store)
//! 3. Click accounting or lazy deletion is enqueued as a [`deferred_task::DeferredTask`]
//! 4. The response is sent; the worker processes the task afterwards

pub mod deferred_task;
pub mod entities;
pub mod outcome;
pub mod repositories;
pub mod request_context;
pub mod snapshot;
