//! DTOs for per-link click statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Click;

/// A single recorded click.
#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl From<Click> for ClickResponse {
    fn from(click: Click) -> Self {
        Self {
            id: click.id,
            clicked_at: click.clicked_at,
            ip_address: click.ip,
            user_agent: click.user_agent,
            referer: click.referer,
        }
    }
}

/// Total clicks recorded for a link.
#[derive(Debug, Serialize)]
pub struct ClickCountResponse {
    pub click_count: i64,
}
