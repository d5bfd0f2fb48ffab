//! Per-client fixed-window rate limiting middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Admits or rejects a request using the shared [`RateLimiter`].
///
/// # Key Extraction
///
/// The client key is the socket peer address. When the service runs behind a
/// trusted proxy (`BEHIND_PROXY=true`), `X-Forwarded-For` and `X-Real-IP` are
/// consulted first. Requests with no identifiable client share the empty key.
///
/// Rejected requests receive `429 Too Many Requests` and never reach the
/// handler.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/{code}", get(redirect_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
///
/// [`RateLimiter`]: crate::domain::rate_limiter::RateLimiter
pub async fn layer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let key = client_ip(request.headers(), peer, state.behind_proxy);

    if !state.rate_limiter.allow(&key) {
        metrics::counter!("rate_limit_rejected_total").increment(1);
        debug!(client = %key, "Rate limit exceeded");

        return AppError::too_many_requests(
            "Rate limit exceeded. Please try again later.",
            json!({
                "limit": state.rate_limiter.rate_limit(),
                "window_secs": state.rate_limiter.window().as_secs(),
            }),
        )
        .into_response();
    }

    next.run(request).await
}
