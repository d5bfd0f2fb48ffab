//! DTOs for link listing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Link;

/// A stored link as exposed over the API.
#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
    pub tiny_url: String,
}

impl UrlResponse {
    /// Builds the response from a link and its public short URL.
    pub fn from_link(link: Link, tiny_url: String) -> Self {
        Self {
            id: link.id,
            original_url: link.long_url,
            short_code: link.code,
            created_at: link.created_at,
            click_count: link.click_count,
            tiny_url,
        }
    }
}
