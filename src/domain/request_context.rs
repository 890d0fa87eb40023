//! Client metadata captured from a redirect request.

use std::net::IpAddr;

/// Request metadata handed to deferred click accounting.
///
/// Owned and cloneable so it can cross into background tasks after the
/// response has been sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Client address used for the geo lookup.
    pub ip: Option<IpAddr>,
}

impl RequestContext {
    pub fn new(ip: Option<IpAddr>) -> Self {
        Self { ip }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_creation() {
        let ip: IpAddr = "192.168.1.1".parse().unwrap();
        let ctx = RequestContext::new(Some(ip));

        assert_eq!(ctx.ip, Some(ip));
    }

    #[test]
    fn test_request_context_default_is_empty() {
        assert!(RequestContext::default().ip.is_none());
    }
}
