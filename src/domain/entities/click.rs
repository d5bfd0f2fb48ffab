//! Click entity: one served redirect.

use chrono::{DateTime, Utc};

use crate::domain::click_event::ClickEvent;

/// A recorded redirect with the request metadata that was available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Click row to insert; `clicked_at` is the time of the redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl From<ClickEvent> for NewClick {
    fn from(event: ClickEvent) -> Self {
        Self {
            link_id: event.link_id,
            clicked_at: event.clicked_at,
            ip: event.ip,
            user_agent: event.user_agent,
            referer: event.referer,
        }
    }
}
