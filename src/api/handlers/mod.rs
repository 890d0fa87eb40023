//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod links;
pub mod outcome;
pub mod redirect;
pub mod verify_password;

pub use health::health_handler;
pub use links::{create_link_handler, delete_link_handler};
pub use redirect::redirect_handler;
pub use verify_password::verify_password_handler;
