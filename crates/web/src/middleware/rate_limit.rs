//! Rate limiting for login and account creation, using governor and
//! `tower_governor`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{extract::ConnectInfo, http::Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Client IP key extractor.
///
/// Keys on the peer address from `ConnectInfo`. With `trust_proxy` set, the
/// address our reverse proxy appended to `X-Forwarded-For` (the last hop), or
/// `X-Real-IP`, wins; clients can forge both, so this is only safe behind a
/// proxy that rewrites them.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientIpKeyExtractor {
    trust_proxy: bool,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(trust_proxy: bool) -> Self {
        Self { trust_proxy }
    }

    fn forwarded_ip<T>(req: &Request<T>) -> Option<IpAddr> {
        let headers = req.headers();

        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.rsplit(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
            .or_else(|| {
                headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_proxy
            && let Some(ip) = Self::forwarded_ip(req)
        {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trust_proxy: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy))
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn peer(req: &mut Request<()>, addr: &str) {
        req.extensions_mut()
            .insert(ConnectInfo(addr.parse::<SocketAddr>().unwrap()));
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_forwarding_headers_ignored_by_default() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .header("x-real-ip", "203.0.113.8")
            .body(())
            .unwrap();
        peer(&mut req, "192.0.2.1:5000");

        let extractor = ClientIpKeyExtractor::default();
        assert_eq!(extractor.extract(&req).unwrap(), ip("192.0.2.1"));

        // a rotated header still lands in the same bucket
        let mut spoofed = Request::builder()
            .header("x-forwarded-for", "198.51.100.99")
            .body(())
            .unwrap();
        peer(&mut spoofed, "192.0.2.1:5001");
        assert_eq!(extractor.extract(&spoofed).unwrap(), ip("192.0.2.1"));
    }

    #[test]
    fn test_trusted_proxy_uses_last_forwarded_hop() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "198.51.100.99, 203.0.113.7")
            .body(())
            .unwrap();
        peer(&mut req, "10.0.0.1:5000");

        let extractor = ClientIpKeyExtractor::new(true);
        assert_eq!(extractor.extract(&req).unwrap(), ip("203.0.113.7"));
    }

    #[test]
    fn test_trusted_proxy_falls_back_to_real_ip_then_peer() {
        let extractor = ClientIpKeyExtractor::new(true);

        let mut req = Request::builder()
            .header("x-real-ip", "203.0.113.8")
            .body(())
            .unwrap();
        peer(&mut req, "10.0.0.1:5000");
        assert_eq!(extractor.extract(&req).unwrap(), ip("203.0.113.8"));

        let mut req = Request::builder().body(()).unwrap();
        assert!(extractor.extract(&req).is_err());
        peer(&mut req, "10.0.0.1:5000");
        assert_eq!(extractor.extract(&req).unwrap(), ip("10.0.0.1"));
    }
}
