//! Click event passed from the redirect handler to the click worker.

use chrono::{DateTime, Utc};

/// An in-memory record of one served redirect, awaiting persistence.
///
/// The redirect handler builds it after resolving the link and hands it to
/// the worker through a bounded channel, so the response never waits on the
/// click insert.
///
/// # Usage Flow
///
/// 1. Created in the redirect handler with request metadata
/// 2. Sent to the channel with `try_send` (dropped when full)
/// 3. Processed by [`crate::domain::click_worker::run_click_worker`]
/// 4. Converted to [`crate::domain::entities::NewClick`] for persistence
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: i64,
    pub code: String,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    ///
    /// Empty `ip`, `user_agent` and `referer` values are stored as `None`.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let event = ClickEvent::new(
    ///     7,
    ///     "abc1234".to_string(),
    ///     Some("192.168.1.1".to_string()),
    ///     Some("Mozilla/5.0"),
    ///     Some("https://google.com"),
    /// );
    /// ```
    pub fn new(
        link_id: i64,
        code: String,
        ip: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            code,
            clicked_at: Utc::now(),
            ip: ip.filter(|s| !s.is_empty()),
            user_agent: non_empty(user_agent),
            referer: non_empty(referer),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}
