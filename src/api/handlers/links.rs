//! Handler for the link listing endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::json;

use crate::api::dto::links::UrlResponse;
use crate::api::dto::pagination::{Page, PaginationParams};
use crate::error::AppError;
use crate::state::AppState;

/// Lists stored links, newest first.
///
/// # Endpoint
///
/// `GET /api/url?page=0&limit=10`
///
/// # Errors
///
/// Returns 400 Bad Request if `limit` is outside 1..=100.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<UrlResponse>>, AppError> {
    let window = params
        .window()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (links, total) = state
        .link_service
        .list_links(window.offset, window.limit)
        .await?;

    let content = links
        .into_iter()
        .map(|link| {
            let tiny_url = state.link_service.short_url(&link.code);
            UrlResponse::from_link(link, tiny_url)
        })
        .collect();

    Ok(Json(Page::new(content, window, total)))
}
