//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Health check: database, usage queue, cache (public)
//! - `/api/*`            - REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token on `/api/*`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::config::RateLimitConfig;
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

fn api_router(state: &AppState) -> Router<AppState> {
    api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
}

fn build(api: Router<AppState>, state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .with_state(state)
        .layer(tracing::layer())
}

/// Builds the router without rate limiting or path normalization.
///
/// Rate limiting keys on the peer address, which in-process test clients
/// do not provide.
pub fn router(state: AppState) -> Router {
    let api = api_router(&state);
    build(api, state)
}

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `rate_limit` - per-IP token bucket settings for `/api/*`
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
///
/// # Errors
///
/// Fails if the rate limit settings are invalid.
pub fn app_router(
    state: AppState,
    rate_limit: &RateLimitConfig,
    behind_proxy: bool,
) -> anyhow::Result<NormalizePath<Router>> {
    let api = if behind_proxy {
        api_router(&state).layer(rate_limit::proxy_layer(rate_limit)?)
    } else {
        api_router(&state).layer(rate_limit::layer(rate_limit)?)
    };

    Ok(NormalizePathLayer::trim_trailing_slash().layer(build(api, state)))
}
