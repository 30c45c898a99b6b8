//! Rate limiting middleware using token bucket algorithm.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

use crate::state::AppState;

/// Quota applied to a group of routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// 2 requests per second, burst of 100. Used for the resource API.
    Standard,
    /// 1 request per second, burst of 10. Used for signup, login and password resets.
    Strict,
}

impl Limit {
    fn quota(self) -> (u64, u32) {
        match self {
            Limit::Standard => (2, 100),
            Limit::Strict => (1, 10),
        }
    }
}

/// Wraps `router` in a per-client-IP rate limiter.
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// With `behind_proxy` the client IP is read from `X-Forwarded-For` /
/// `X-Real-IP` / `Forwarded`; otherwise from the socket peer address, which
/// requires serving with `into_make_service_with_connect_info::<SocketAddr>`.
///
/// # Example
///
/// ```rust,ignore
/// let api = rate_limit::apply(api_routes, Limit::Standard, config.behind_proxy);
/// ```
pub fn apply(router: Router<AppState>, limit: Limit, behind_proxy: bool) -> Router<AppState> {
    let (per_second, burst) = limit.quota();
    if behind_proxy {
        router.layer(layer(SmartIpKeyExtractor, per_second, burst))
    } else {
        router.layer(layer(PeerIpKeyExtractor, per_second, burst))
    }
}

fn layer<K: KeyExtractor>(
    key_extractor: K,
    per_second: u64,
    burst: u32,
) -> GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(per_second)
            .burst_size(burst)
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(governor_conf)
}
