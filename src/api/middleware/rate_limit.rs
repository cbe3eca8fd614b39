//! Rate limiting middleware using token bucket algorithm.

use anyhow::Context;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};

use crate::config::RateLimitConfig;

/// Rate limiter keyed by the socket peer address.
pub type RateLimitLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter keyed by `X-Forwarded-For` / `X-Real-IP`, falling back to the peer.
pub type ProxyRateLimitLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates a per-IP rate limiter.
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Keys are
/// taken from the socket peer address, so the router must be served with
/// `into_make_service_with_connect_info`.
///
/// # Errors
///
/// Fails if the rate or burst is zero.
pub fn layer(config: &RateLimitConfig) -> anyhow::Result<RateLimitLayer> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst)
        .finish()
        .context("Rate limit rate and burst must be greater than zero")?;

    Ok(GovernorLayer::new(Arc::new(governor_conf)))
}

/// Creates a per-IP rate limiter for deployments behind a trusted reverse proxy.
///
/// # Errors
///
/// Fails if the rate or burst is zero.
pub fn proxy_layer(config: &RateLimitConfig) -> anyhow::Result<ProxyRateLimitLayer> {
    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(config.per_second)
        .burst_size(config.burst)
        .finish()
        .context("Rate limit rate and burst must be greater than zero")?;

    Ok(GovernorLayer::new(Arc::new(governor_conf)))
}
