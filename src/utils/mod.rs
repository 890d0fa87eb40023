//! Helpers shared by the services and handlers.
//!
//! - [`code_generator`] - Short code derivation and validation
//! - [`url_normalizer`] - Destination URL normalization
//! - [`password`] - Argon2 hashing and verification
//! - [`client_ip`] - Client address resolution behind proxies
//! - [`expiry`] - Expiry timestamp parsing

pub mod client_ip;
pub mod code_generator;
pub mod expiry;
pub mod password;
pub mod url_normalizer;
