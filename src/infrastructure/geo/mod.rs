//! Geo-IP lookup for click attribution.
//!
//! - [`GeoLookup`] - Provider trait
//! - [`IpApiLookup`] - HTTP provider for ipapi.co-style JSON APIs
//! - [`GeoResolver`] - Timeout, private-address skip and sentinel fallback

mod ip_api;
mod resolver;

pub use ip_api::IpApiLookup;
pub use resolver::{GeoResolver, country_code_to_flag};

use async_trait::async_trait;
use std::net::IpAddr;

/// Country attributed to an IP address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLocation {
    pub country: String,
    pub country_code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Geo lookup request failed: {0}")]
    Request(String),
    #[error("Geo lookup returned an error: {0}")]
    Api(String),
    #[error("Geo lookup response missing field: {0}")]
    MissingField(&'static str),
}

/// A source of country information for IP addresses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, ip: IpAddr) -> Result<GeoLocation, GeoError>;
}
