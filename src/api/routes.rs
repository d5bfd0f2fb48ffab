//! API route configuration.

use crate::api::handlers::{
    click_count_handler, link_stats_handler, list_links_handler, metrics_handler, shorten_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes mounted under `/api`.
///
/// # Endpoints
///
/// - `GET  /url`                  - List links (paginated)
/// - `POST /url/shorten`          - Create a short link
/// - `GET  /url/{id}/stats`       - Clicks for a link (paginated)
/// - `GET  /url/{id}/stats/count` - Click total for a link
/// - `GET  /metrics`              - Service-wide totals and top links
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/url", get(list_links_handler))
        .route("/url/shorten", post(shorten_handler))
        .route("/url/{id}/stats", get(link_stats_handler))
        .route("/url/{id}/stats/count", get(click_count_handler))
        .route("/metrics", get(metrics_handler))
}
