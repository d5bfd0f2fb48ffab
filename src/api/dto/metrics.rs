//! DTOs for the service-wide metrics endpoint.

use serde::Serialize;

/// Aggregate totals plus the most clicked links.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub total_urls: i64,
    pub total_clicks: i64,
    pub urls_created_today: i64,
    pub clicks_today: i64,
    pub top_urls: Vec<TopUrl>,
}

#[derive(Debug, Serialize)]
pub struct TopUrl {
    pub short_code: String,
    pub original_url: String,
    pub clicks: i64,
    pub tiny_url: String,
}
