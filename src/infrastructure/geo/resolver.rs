//! Bounded geo resolution with a sentinel fallback.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::GeoLookup;
use crate::domain::entities::{NEUTRAL_FLAG, UNKNOWN_COUNTRY};

/// Turns a two-letter ISO country code into its regional-indicator flag.
///
/// Returns `None` for anything that isn't exactly two ASCII letters.
pub fn country_code_to_flag(code: &str) -> Option<String> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    code.to_ascii_uppercase()
        .chars()
        .map(|c| char::from_u32(0x1F1A5 + c as u32))
        .collect()
}

/// Resolves `(country, flag)` for a click. Never fails and never waits past
/// its timeout.
#[derive(Clone)]
pub struct GeoResolver {
    lookup: Option<Arc<dyn GeoLookup>>,
    timeout: Duration,
}

impl GeoResolver {
    pub fn new(lookup: Arc<dyn GeoLookup>, timeout: Duration) -> Self {
        Self {
            lookup: Some(lookup),
            timeout,
        }
    }

    /// Resolver that always yields the sentinel.
    pub fn disabled() -> Self {
        Self {
            lookup: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn sentinel() -> (String, String) {
        (UNKNOWN_COUNTRY.to_string(), NEUTRAL_FLAG.to_string())
    }

    pub async fn resolve(&self, ip: Option<IpAddr>) -> (String, String) {
        let (Some(lookup), Some(ip)) = (&self.lookup, ip) else {
            return Self::sentinel();
        };

        if !is_public(ip) {
            debug!(%ip, "Skipping geo lookup for non-public address");
            return Self::sentinel();
        }

        match tokio::time::timeout(self.timeout, lookup.lookup(ip)).await {
            Ok(Ok(geo)) => {
                let flag =
                    country_code_to_flag(&geo.country_code).unwrap_or_else(|| NEUTRAL_FLAG.to_string());
                (geo.country, flag)
            }
            Ok(Err(e)) => {
                warn!(%ip, error = %e, "Geo lookup failed");
                Self::sentinel()
            }
            Err(_) => {
                warn!(%ip, timeout_ms = self.timeout.as_millis() as u64, "Geo lookup timed out");
                Self::sentinel()
            }
        }
    }
}

fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation())
        }
        IpAddr::V6(v6) => {
            let unique_local = (v6.segments()[0] & 0xfe00) == 0xfc00;
            let link_local = (v6.segments()[0] & 0xffc0) == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::geo::{GeoError, GeoLocation, MockGeoLookup};
    use async_trait::async_trait;

    struct SlowLookup;

    #[async_trait]
    impl GeoLookup for SlowLookup {
        async fn lookup(&self, _ip: IpAddr) -> Result<GeoLocation, GeoError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(GeoLocation {
                country: "Nowhere".to_string(),
                country_code: "NW".to_string(),
            })
        }
    }

    fn public_ip() -> Option<IpAddr> {
        Some("8.8.8.8".parse().unwrap())
    }

    #[test]
    fn test_country_code_to_flag() {
        assert_eq!(country_code_to_flag("US").as_deref(), Some("🇺🇸"));
        assert_eq!(country_code_to_flag("de").as_deref(), Some("🇩🇪"));
        assert_eq!(country_code_to_flag("USA"), None);
        assert_eq!(country_code_to_flag("1A"), None);
    }

    #[tokio::test]
    async fn test_successful_lookup() {
        let mut mock = MockGeoLookup::new();
        mock.expect_lookup().times(1).returning(|_| {
            Ok(GeoLocation {
                country: "France".to_string(),
                country_code: "FR".to_string(),
            })
        });
        let resolver = GeoResolver::new(Arc::new(mock), Duration::from_secs(1));

        let (country, flag) = resolver.resolve(public_ip()).await;

        assert_eq!(country, "France");
        assert_eq!(flag, "🇫🇷");
    }

    #[tokio::test]
    async fn test_failed_lookup_yields_sentinel() {
        let mut mock = MockGeoLookup::new();
        mock.expect_lookup()
            .returning(|_| Err(GeoError::Api("RateLimited".to_string())));
        let resolver = GeoResolver::new(Arc::new(mock), Duration::from_secs(1));

        assert_eq!(resolver.resolve(public_ip()).await, GeoResolver::sentinel());
    }

    #[tokio::test]
    async fn test_private_address_skips_lookup() {
        let mut mock = MockGeoLookup::new();
        mock.expect_lookup().times(0);
        let resolver = GeoResolver::new(Arc::new(mock), Duration::from_secs(1));

        let loopback = Some("127.0.0.1".parse().unwrap());
        let private = Some("10.1.2.3".parse().unwrap());

        assert_eq!(resolver.resolve(loopback).await, GeoResolver::sentinel());
        assert_eq!(resolver.resolve(private).await, GeoResolver::sentinel());
        assert_eq!(resolver.resolve(None).await, GeoResolver::sentinel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_times_out() {
        let resolver = GeoResolver::new(Arc::new(SlowLookup), Duration::from_millis(100));

        assert_eq!(resolver.resolve(public_ip()).await, GeoResolver::sentinel());
    }

    #[tokio::test]
    async fn test_disabled_resolver() {
        assert_eq!(
            GeoResolver::disabled().resolve(public_ip()).await,
            GeoResolver::sentinel()
        );
    }
}
