//! Store implementations.
//!
//! Concrete implementations of the domain repository traits.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage, atomic click-limit decrement, cascading delete
//! - [`PgClickRepository`] - Click recording
//! - [`InMemoryStore`] - Both traits over in-process maps

pub mod memory_store;
pub mod pg_click_repository;
pub mod pg_link_repository;

pub use memory_store::InMemoryStore;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
