//! Handler for link shortening endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use validator::Validate;

use crate::api::dto::shorten::{CreateUrlRequest, CreateUrlResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/url/shorten`
///
/// # Request Body
///
/// ```json
/// { "long_url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// ```json
/// { "code": "aZ3kP9q", "short_url": "http://localhost:8080/aZ3kP9q" }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if the body is not a JSON object with `long_url`, or
///   the URL is malformed or not http(s)
/// - 409 Conflict if no free code was found within the retry budget
/// - 503 Service Unavailable if allocation ran past its deadline
/// - 500 Internal Server Error on store or entropy failure
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<Json<CreateUrlResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let link = state
        .link_service
        .create_short_link(&payload.long_url)
        .await?;

    let short_url = state.link_service.short_url(&link.code);

    Ok(Json(CreateUrlResponse {
        code: link.code,
        short_url,
    }))
}
