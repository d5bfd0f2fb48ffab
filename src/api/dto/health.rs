//! DTOs for liveness endpoints.

use serde::Serialize;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Body of `GET /api`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
