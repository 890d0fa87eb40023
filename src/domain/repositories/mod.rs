//! Repository trait definitions for the domain layer.
//!
//! These traits describe the durable store the resolution path depends on.
//! Implementations live in `crate::infrastructure::persistence`; mock
//! implementations are generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short link lookups, atomic click-limit decrement, deletion
//! - [`ClickRepository`] - Click recording and cascade cleanup

pub mod click_repository;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
