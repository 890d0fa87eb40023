//! Business logic services for the application layer.

pub mod click_accounting_service;
pub mod deletion_coordinator;
pub mod link_service;
pub mod resolution_service;

pub use click_accounting_service::{ClickAccountingService, LimitUpdate};
pub use deletion_coordinator::{DeleteMode, DeleteTarget, DeletionCoordinator};
pub use link_service::{CreateLink, LinkService};
pub use resolution_service::ResolutionService;
