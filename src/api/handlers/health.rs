//! Liveness handlers.

use axum::Json;

use crate::api::dto::health::{HealthResponse, MessageResponse};

/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "UP" })
}

/// `GET /api`
pub async fn api_root_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "URL Shortener API is running!".to_string(),
    })
}
