//! Client identity for throttling.
//!
//! The peer socket address is authoritative. `X-Forwarded-For` is only read
//! when the deployment says a trusted reverse proxy sits in front and
//! overwrites it; otherwise any client could pick its own identity.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity string used as the throttle key.
pub fn client_id(peer: SocketAddr, headers: &HeaderMap, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        if let Some(ip) = forwarded_ip(headers) {
            return ip.to_string();
        }
    }
    peer.ip().to_string()
}

/// First address in `X-Forwarded-For`, if it parses.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get(X_FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "10.0.0.1:5000".parse().unwrap()
    }

    #[test]
    fn test_peer_address_by_default() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.9"));
        assert_eq!(client_id(peer(), &headers, false), "10.0.0.1");
    }

    #[test]
    fn test_forwarded_for_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.9, 198.51.100.2"),
        );
        assert_eq!(client_id(peer(), &headers, true), "203.0.113.9");
    }

    #[test]
    fn test_garbage_forwarded_for_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("not-an-ip"));
        assert_eq!(client_id(peer(), &headers, true), "10.0.0.1");
        assert_eq!(client_id(peer(), &HeaderMap::new(), true), "10.0.0.1");
    }
}
