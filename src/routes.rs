//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`  - Short link redirect
//! - `GET  /health`  - Liveness probe
//! - `GET  /api`     - API liveness message
//! - `/api/*`        - REST API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Frontend origin only
//! - **Rate limiting** - Per-client fixed window, applied to every route
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{api_root_handler, health_handler, redirect_handler};
use crate::api::middleware::{cors, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `frontend_url` - origin allowed by the CORS policy
pub fn app_router(state: AppState, frontend_url: &str) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, frontend_url))
}

/// Routes and middleware without path normalization.
pub fn router(state: AppState, frontend_url: &str) -> Router {
    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .route("/api", get(api_root_handler))
        .nest("/api", api::routes::api_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ))
        .layer(cors::layer(frontend_url))
        .with_state(state)
        .layer(tracing::layer())
}
