//! HTTP geo lookup against an ipapi.co-compatible endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::trace;

use super::{GeoError, GeoLocation, GeoLookup};

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    country_name: Option<String>,
    country_code: Option<String>,
}

/// Queries a JSON API whose URL template contains `{ip}`,
/// e.g. `https://ipapi.co/{ip}/json/`.
pub struct IpApiLookup {
    client: reqwest::Client,
    url_template: String,
}

impl IpApiLookup {
    /// Builds the provider with a client-level request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Request`] if the HTTP client cannot be constructed.
    pub fn new(url_template: &str, timeout: Duration) -> Result<Self, GeoError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeoError::Request(e.to_string()))?;

        Ok(Self {
            client,
            url_template: url_template.to_string(),
        })
    }

    fn url_for(&self, ip: IpAddr) -> String {
        self.url_template.replace("{ip}", &ip.to_string())
    }
}

#[async_trait]
impl GeoLookup for IpApiLookup {
    async fn lookup(&self, ip: IpAddr) -> Result<GeoLocation, GeoError> {
        let url = self.url_for(ip);
        trace!("Geo lookup: {}", url);

        let body: IpApiResponse = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| GeoError::Request(e.to_string()))?
            .json()
            .await
            .map_err(|e| GeoError::Request(e.to_string()))?;

        parse_response(body)
    }
}

fn parse_response(body: IpApiResponse) -> Result<GeoLocation, GeoError> {
    if body.error {
        return Err(GeoError::Api(
            body.reason.unwrap_or_else(|| "unknown".to_string()),
        ));
    }

    Ok(GeoLocation {
        country: body.country_name.ok_or(GeoError::MissingField("country_name"))?,
        country_code: body
            .country_code
            .ok_or(GeoError::MissingField("country_code"))?,
    })
}
