//! Repository trait for short link data access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::StoreError;

/// Store capability for short links.
///
/// The short code column carries a unique constraint; [`LinkRepository::create`]
/// is the create-with-uniqueness-check the code allocator relies on.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Persists a new link under `new_link.code`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateCode`] if the code is already taken and
    /// [`StoreError::Database`] for anything else. Implementations must keep
    /// the two apart: only the first is retried by the allocator.
    async fn create(&self, new_link: NewLink) -> Result<Link, StoreError>;

    /// Finds a link by its short code (case-sensitive).
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, StoreError>;

    /// Finds a link by its numeric id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, StoreError>;

    /// Lists links, newest first.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Link>, StoreError>;

    /// Counts all links.
    async fn count(&self) -> Result<i64, StoreError>;

    /// Counts links created at or after `since`.
    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError>;

    /// Returns the `limit` links with the highest click counts.
    async fn top_by_clicks(&self, limit: i64) -> Result<Vec<Link>, StoreError>;

    /// Adds one to the link's click counter.
    async fn increment_click_count(&self, link_id: i64) -> Result<(), StoreError>;
}
