//! CORS policy for the browser frontend.

use axum::http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::CorsLayer;

/// Allows the configured frontend origin to call the API.
///
/// An origin that is not a valid header value is skipped with a warning, which
/// leaves cross-origin requests denied.
pub fn layer(frontend_url: &str) -> CorsLayer {
    let mut layer = CorsLayer::new();

    match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(origin) => layer = layer.allow_origin(origin),
        Err(_) => tracing::warn!(origin = frontend_url, "Invalid CORS origin; skipping"),
    }

    layer
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(false)
        .max_age(Duration::from_secs(3600))
}
