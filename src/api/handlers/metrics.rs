//! Handler for service-wide metrics.

use axum::{Json, extract::State};

use crate::api::dto::metrics::{MetricsResponse, TopUrl};
use crate::error::AppError;
use crate::state::AppState;

/// Returns totals, today's activity and the most clicked links.
///
/// # Endpoint
///
/// `GET /api/metrics`
///
/// "Today" starts at midnight UTC.
pub async fn metrics_handler(
    State(state): State<AppState>,
) -> Result<Json<MetricsResponse>, AppError> {
    let metrics = state.stats_service.metrics().await?;

    let top_urls = metrics
        .top_links
        .into_iter()
        .map(|link| TopUrl {
            tiny_url: state.link_service.short_url(&link.code),
            short_code: link.code,
            original_url: link.long_url,
            clicks: link.click_count,
        })
        .collect();

    Ok(Json(MetricsResponse {
        total_urls: metrics.total_links,
        total_clicks: metrics.total_clicks,
        urls_created_today: metrics.links_today,
        clicks_today: metrics.clicks_today,
        top_urls,
    }))
}
