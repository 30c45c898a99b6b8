//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`   - Health check (public)
//! - `/api/v1/*`      - REST API, see [`crate::api::routes`]
//! - `/*`             - Static files from the configured directory
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket, stricter on credential endpoints
//! - **Authentication** - Bearer JWT, applied per route
//! - **Path normalization** - Trailing slash handling

use axum::handler::HandlerWithoutStateExt;
use axum::http::Uri;
use axum::routing::get;
use axum::Router;
use serde_json::json;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::rate_limit::{self, Limit};
use crate::api::middleware::tracing;
use crate::error::AppError;
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
/// - `static_dir` - directory served at `/`
pub fn app_router(state: AppState, behind_proxy: bool, static_dir: &str) -> NormalizePath<Router> {
    let api_router = rate_limit::apply(api::routes::auth_routes(), Limit::Strict, behind_proxy)
        .merge(rate_limit::apply(
            api::routes::resource_routes(&state),
            Limit::Standard,
            behind_proxy,
        ));

    let static_files = ServeDir::new(static_dir).fallback(not_found_handler.into_service());

    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1", api_router)
        .fallback_service(static_files)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

async fn not_found_handler(uri: Uri) -> AppError {
    AppError::not_found(
        format!("Can't find {} on this server!", uri.path()),
        json!({ "path": uri.path() }),
    )
}
