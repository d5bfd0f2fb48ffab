//! Repository trait for click records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::StoreError;

/// Store capability for recorded redirects.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgStatsRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Inserts one click row.
    async fn record_click(&self, new_click: NewClick) -> Result<Click, StoreError>;

    /// Lists clicks for a link, newest first.
    async fn list_clicks(
        &self,
        link_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Click>, StoreError>;

    /// Counts clicks recorded for a link.
    async fn count_clicks(&self, link_id: i64) -> Result<i64, StoreError>;

    /// Counts every recorded click.
    async fn count_all(&self) -> Result<i64, StoreError>;

    /// Counts clicks recorded at or after `since`.
    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError>;
}
