//! Handlers for per-link click statistics.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use crate::api::dto::pagination::{Page, PaginationParams};
use crate::api::dto::stats::{ClickCountResponse, ClickResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Lists recorded clicks for a link, newest first.
///
/// # Endpoint
///
/// `GET /api/url/{id}/stats?page=0&limit=10`
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist.
/// Returns 400 Bad Request if pagination parameters are invalid.
pub async fn link_stats_handler(
    State(state): State<AppState>,
    Path(link_id): Path<i64>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<ClickResponse>>, AppError> {
    let window = params
        .window()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (clicks, total) = state
        .stats_service
        .link_clicks(link_id, window.offset, window.limit)
        .await?;

    let content = clicks.into_iter().map(ClickResponse::from).collect();

    Ok(Json(Page::new(content, window, total)))
}

/// Returns the number of clicks recorded for a link.
///
/// `GET /api/url/{id}/stats/count`
pub async fn click_count_handler(
    State(state): State<AppState>,
    Path(link_id): Path<i64>,
) -> Result<Json<ClickCountResponse>, AppError> {
    let click_count = state.stats_service.click_count(link_id).await?;

    Ok(Json(ClickCountResponse { click_count }))
}
