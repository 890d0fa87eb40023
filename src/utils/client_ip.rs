//! Client address resolution for click attribution.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Picks the client IP for a request.
///
/// Forwarding headers are only read when `behind_proxy` is set.
/// `X-Forwarded-For` wins over `X-Real-IP`, and its left-most entry is the
/// original client.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> Option<IpAddr> {
    if behind_proxy
        && let Some(ip) = forwarded_for(headers).or_else(|| real_ip(headers))
    {
        return Some(ip);
    }

    peer.map(|addr| addr.ip())
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

fn real_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers.get("x-real-ip")?.to_str().ok()?.trim().parse().ok()
}
