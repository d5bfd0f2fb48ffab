//! Link creation and retrieval service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use crate::application::services::code_allocator::{CodeAllocator, DEFAULT_MAX_RETRIES};
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::short_code::{DEFAULT_CODE_LENGTH, SecureRandom, validate_code_format};
use crate::utils::url_validator::validate_long_url;

/// Tunables for link creation, taken from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// Prefix of every short URL, e.g. `https://s.example.com`.
    pub base_url: String,
    pub code_length: usize,
    pub max_retries: u32,
    /// Upper bound on one allocation, store round-trips included.
    pub allocation_timeout: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            code_length: DEFAULT_CODE_LENGTH,
            max_retries: DEFAULT_MAX_RETRIES,
            allocation_timeout: Duration::from_secs(5),
        }
    }
}

/// Service for creating and resolving short links.
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    allocator: CodeAllocator<L>,
    settings: LinkSettings,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>, rng: Arc<dyn SecureRandom>, settings: LinkSettings) -> Self {
        Self {
            allocator: CodeAllocator::new(link_repository.clone(), rng),
            link_repository,
            settings,
        }
    }

    /// Shortens `long_url` under a newly allocated code.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is not absolute `http`/`https`
    /// - [`AppError::Conflict`] if every allocation attempt collided
    /// - [`AppError::Unavailable`] if allocation exceeded its time budget
    /// - [`AppError::Internal`] on store or entropy failure
    pub async fn create_short_link(&self, long_url: &str) -> Result<Link, AppError> {
        validate_long_url(long_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let deadline = Instant::now() + self.settings.allocation_timeout;

        let link = self
            .allocator
            .allocate(
                long_url.trim(),
                self.settings.code_length,
                self.settings.max_retries,
                Some(deadline),
            )
            .await?;

        tracing::info!(code = %link.code, "Short link created");

        Ok(link)
    }

    /// Looks up the link behind `code`.
    ///
    /// The code format is checked first; malformed codes never reach the store.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed code
    /// - [`AppError::NotFound`] if no link has this code
    /// - [`AppError::Internal`] on store errors
    pub async fn resolve(&self, code: &str) -> Result<Link, AppError> {
        if !validate_code_format(code) {
            return Err(AppError::bad_request(
                "Invalid short code format",
                json!({ "code": code }),
            ));
        }

        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "code": code })))
    }

    /// Returns one page of links, newest first, with the total link count.
    pub async fn list_links(&self, offset: i64, limit: i64) -> Result<(Vec<Link>, i64), AppError> {
        let links = self.link_repository.list(offset, limit).await?;
        let total = self.link_repository.count().await?;

        Ok((links, total))
    }

    /// Builds the public short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockLinkRepository, StoreError};
    use crate::utils::short_code::OsRandom;
    use chrono::Utc;

    fn service(repo: MockLinkRepository) -> LinkService<MockLinkRepository> {
        LinkService::new(
            Arc::new(repo),
            Arc::new(OsRandom),
            LinkSettings {
                base_url: "https://s.example.com/".to_string(),
                ..LinkSettings::default()
            },
        )
    }

    fn link(id: i64, code: &str, url: &str) -> Link {
        Link::new(id, code.to_string(), url.to_string(), 0, Utc::now())
    }

    #[tokio::test]
    async fn test_create_short_link_success() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .withf(|l| l.long_url == "https://example.com/page" && l.code.len() == 7)
            .times(1)
            .returning(|l| Ok(link(10, &l.code, &l.long_url)));

        let created = service(repo)
            .create_short_link("https://example.com/page")
            .await
            .unwrap();

        assert_eq!(created.long_url, "https://example.com/page");
        assert_eq!(created.code.len(), 7);
    }

    #[tokio::test]
    async fn test_create_short_link_invalid_url() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(0);

        let result = service(repo).create_short_link("not-a-url").await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_short_link_rejects_non_http_scheme() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(0);

        let result = service(repo).create_short_link("ftp://example.com").await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_short_link_conflict_after_collisions() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .times(5)
            .returning(|_| Err(StoreError::DuplicateCode));

        let result = service(repo).create_short_link("https://example.com").await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code == "abc1234")
            .times(1)
            .returning(|code| Ok(Some(link(1, code, "https://example.com"))));

        let found = service(repo).resolve("abc1234").await.unwrap();

        assert_eq!(found.long_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));

        let result = service(repo).resolve("abc1234").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_malformed_code_skips_store() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().times(0);
        let service = service(repo);

        for code in ["", "abc-123", "waytoolongcode", "a b"] {
            let result = service.resolve(code).await;
            assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_resolve_store_error_is_internal() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .returning(|_| Err(StoreError::Database("timeout".to_string())));

        let result = service(repo).resolve("abc1234").await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_list_links_returns_total() {
        let mut repo = MockLinkRepository::new();
        repo.expect_list()
            .withf(|offset, limit| *offset == 20 && *limit == 10)
            .times(1)
            .returning(|_, _| Ok(vec![link(1, "a", "https://a.com")]));
        repo.expect_count().times(1).returning(|| Ok(21));

        let (links, total) = service(repo).list_links(20, 10).await.unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(total, 21);
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let service = service(MockLinkRepository::new());
        assert_eq!(service.short_url("abc1234"), "https://s.example.com/abc1234");
    }
}
