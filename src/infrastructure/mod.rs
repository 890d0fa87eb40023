//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and geo lookup.
//!
//! # Modules
//!
//! - [`cache`] - Snapshot cache (Redis, in-process and no-op implementations)
//! - [`persistence`] - PostgreSQL and in-memory repository implementations
//! - [`geo`] - Geo-IP lookup for click attribution

pub mod cache;
pub mod geo;
pub mod persistence;
