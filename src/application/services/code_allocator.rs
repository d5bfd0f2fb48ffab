//! Collision-safe short code allocation.
//!
//! Candidates are random, and the store's unique constraint is the only
//! arbiter of uniqueness. No in-process record of issued codes exists, so any
//! number of service instances can allocate against the same table.
//!
//! One call moves through `GENERATING -> INSERTING -> {SUCCESS, RETRY, FAILURE}`;
//! only a duplicate-code report leads back to `GENERATING`.

use std::sync::Arc;

use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{LinkRepository, StoreError};
use crate::error::AppError;
use crate::utils::short_code::{
    DEFAULT_CODE_LENGTH, SecureRandom, generate_code, is_reserved_code,
};

/// Attempts made when the caller passes zero.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Why an allocation ended without a code.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    /// Every attempt hit an existing code. The caller may try again later.
    #[error("no free short code after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// The entropy source or the store failed for a reason other than a
    /// duplicate code.
    #[error("short code allocation failed: {0}")]
    Internal(String),

    /// The deadline passed before a code was persisted.
    #[error("short code allocation cancelled")]
    Cancelled,
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::Conflict { attempts } => AppError::conflict(
                "Could not generate a unique short URL, please retry",
                json!({ "attempts": attempts }),
            ),
            AllocationError::Internal(reason) => {
                tracing::error!(%reason, "Short code allocation failed");
                AppError::internal("Failed to create short URL", json!({}))
            }
            AllocationError::Cancelled => AppError::unavailable(
                "Short URL creation timed out, please retry",
                json!({}),
            ),
        }
    }
}

/// Generates short codes and persists them through the store's
/// create-with-uniqueness-check.
pub struct CodeAllocator<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    rng: Arc<dyn SecureRandom>,
}

impl<L: LinkRepository + ?Sized> CodeAllocator<L> {
    /// Creates an allocator drawing symbols from `rng`.
    pub fn new(link_repository: Arc<L>, rng: Arc<dyn SecureRandom>) -> Self {
        Self {
            link_repository,
            rng,
        }
    }

    /// Persists `long_url` under a freshly generated code of `length` symbols.
    ///
    /// Makes at most `max_retries` insert attempts. Zero values for `length`
    /// or `max_retries` select the defaults (7 and 5).
    ///
    /// When `deadline` is set and passes, the loop stops and
    /// [`AllocationError::Cancelled`] is returned; an insert in flight at that
    /// moment is abandoned.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::Conflict`] when all attempts collided
    /// - [`AllocationError::Internal`] on entropy failure or a non-duplicate
    ///   store error, immediately and without retry
    /// - [`AllocationError::Cancelled`] when the deadline passes
    pub async fn allocate(
        &self,
        long_url: &str,
        length: usize,
        max_retries: u32,
        deadline: Option<Instant>,
    ) -> Result<Link, AllocationError> {
        let length = if length == 0 {
            DEFAULT_CODE_LENGTH
        } else {
            length
        };
        let max_retries = if max_retries == 0 {
            DEFAULT_MAX_RETRIES
        } else {
            max_retries
        };

        for attempt in 1..=max_retries {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(AllocationError::Cancelled);
            }

            let code = generate_code(self.rng.as_ref(), length)
                .map_err(|e| AllocationError::Internal(e.to_string()))?;

            if is_reserved_code(&code) {
                debug!(%code, attempt, "Generated a reserved code, retrying");
                continue;
            }

            let insert = self.link_repository.create(NewLink {
                code: code.clone(),
                long_url: long_url.to_string(),
            });

            let result = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, insert)
                    .await
                    .map_err(|_| AllocationError::Cancelled)?,
                None => insert.await,
            };

            match result {
                Ok(link) => {
                    debug!(%code, attempt, "Allocated short code");
                    return Ok(link);
                }
                Err(StoreError::DuplicateCode) => {
                    metrics::counter!("code_allocation_collisions_total").increment(1);
                    debug!(%code, attempt, "Short code collision, retrying");
                }
                Err(StoreError::Database(reason)) => {
                    return Err(AllocationError::Internal(reason));
                }
            }
        }

        metrics::counter!("code_allocation_failures_total").increment(1);
        warn!(attempts = max_retries, length, "Short code space exhausted for this request");

        Err(AllocationError::Conflict {
            attempts: max_retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::utils::short_code::{EntropyError, OsRandom, validate_code_format};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;
    use std::time::Duration;

    fn persisted(new_link: &NewLink) -> Link {
        Link::new(
            1,
            new_link.code.clone(),
            new_link.long_url.clone(),
            0,
            Utc::now(),
        )
    }

    fn allocator(repo: MockLinkRepository) -> CodeAllocator<MockLinkRepository> {
        CodeAllocator::new(Arc::new(repo), Arc::new(OsRandom))
    }

    #[tokio::test]
    async fn test_allocate_fresh_store_single_attempt() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .withf(|l| l.long_url == "https://example.com")
            .times(1)
            .returning(|l| Ok(persisted(&l)));

        let link = allocator(repo)
            .allocate("https://example.com", 7, 5, None)
            .await
            .unwrap();

        assert_eq!(link.code.len(), 7);
        assert!(validate_code_format(&link.code));
    }

    #[tokio::test]
    async fn test_allocate_respects_length() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .withf(|l| l.code.len() == 10 && l.code.chars().all(|c| c.is_ascii_alphanumeric()))
            .times(1)
            .returning(|l| Ok(persisted(&l)));

        let link = allocator(repo)
            .allocate("https://example.com", 10, 5, None)
            .await
            .unwrap();

        assert_eq!(link.code.len(), 10);
    }

    #[tokio::test]
    async fn test_allocate_zero_inputs_use_defaults() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .times(DEFAULT_MAX_RETRIES as usize)
            .returning(|_| Err(StoreError::DuplicateCode));

        let err = allocator(repo)
            .allocate("https://example.com", 0, 0, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AllocationError::Conflict {
                attempts: DEFAULT_MAX_RETRIES
            }
        ));
    }

    #[tokio::test]
    async fn test_allocate_succeeds_after_collisions() {
        let mut repo = MockLinkRepository::new();
        let mut calls = 0;
        repo.expect_create().times(3).returning(move |l| {
            calls += 1;
            if calls < 3 {
                Err(StoreError::DuplicateCode)
            } else {
                Ok(persisted(&l))
            }
        });

        let result = allocator(repo)
            .allocate("https://example.com", 7, 5, None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_allocate_fresh_candidate_per_attempt() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut repo = MockLinkRepository::new();
        let recorder = seen.clone();
        repo.expect_create().times(4).returning(move |l| {
            recorder.lock().unwrap().push(l.code);
            Err(StoreError::DuplicateCode)
        });

        let _ = allocator(repo)
            .allocate("https://example.com", 7, 4, None)
            .await;

        let mut codes = seen.lock().unwrap().clone();
        assert_eq!(codes.len(), 4);
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 4);
    }

    struct SequenceRandom(Mutex<Vec<usize>>);

    impl SequenceRandom {
        fn new(indices: &[usize]) -> Self {
            Self(Mutex::new(indices.iter().rev().copied().collect()))
        }
    }

    impl SecureRandom for SequenceRandom {
        fn sample(&self, _bound: usize) -> Result<usize, EntropyError> {
            self.0
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| EntropyError("sequence exhausted".to_string()))
        }
    }

    #[tokio::test]
    async fn test_allocate_skips_reserved_code_without_store_call() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .withf(|l| l.code == "123")
            .times(1)
            .returning(|l| Ok(persisted(&l)));

        // "api" first, then "123".
        let rng = SequenceRandom::new(&[10, 25, 18, 1, 2, 3]);
        let allocator = CodeAllocator::new(Arc::new(repo), Arc::new(rng));

        let link = allocator
            .allocate("https://example.com", 3, 5, None)
            .await
            .unwrap();

        assert_eq!(link.code, "123");
    }

    #[tokio::test]
    async fn test_allocate_only_reserved_codes_is_conflict() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(0);

        let rng = SequenceRandom::new(&[10, 25, 18, 10, 25, 18]);
        let allocator = CodeAllocator::new(Arc::new(repo), Arc::new(rng));

        let err = allocator
            .allocate("https://example.com", 3, 2, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AllocationError::Conflict { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_allocate_always_duplicate_is_conflict() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .times(5)
            .returning(|_| Err(StoreError::DuplicateCode));

        let err = allocator(repo)
            .allocate("https://example.com", 7, 5, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AllocationError::Conflict { attempts: 5 }));
        assert!(matches!(AppError::from(err), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_allocate_other_store_error_is_internal_without_retry() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Err(StoreError::Database("connection refused".to_string())));

        let err = allocator(repo)
            .allocate("https://example.com", 7, 5, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AllocationError::Internal(_)));
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let app_err = AppError::from(AllocationError::Internal("password=hunter2".to_string()));
        let info = app_err.to_error_info();

        assert_eq!(info.code, "internal_error");
        assert!(!info.message.contains("hunter2"));
        assert_eq!(info.details, json!({}));
    }

    struct BrokenRandom;

    impl SecureRandom for BrokenRandom {
        fn sample(&self, _bound: usize) -> Result<usize, EntropyError> {
            Err(EntropyError("getrandom unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_allocate_entropy_failure_is_internal_without_store_call() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(0);

        let allocator = CodeAllocator::new(Arc::new(repo), Arc::new(BrokenRandom));
        let err = allocator
            .allocate("https://example.com", 7, 5, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AllocationError::Internal(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_allocate_expired_deadline_is_cancelled_without_store_call() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(0);

        let deadline = Instant::now();
        tokio::time::advance(Duration::from_millis(1)).await;

        let err = allocator(repo)
            .allocate("https://example.com", 7, 5, Some(deadline))
            .await
            .unwrap_err();

        assert!(matches!(err, AllocationError::Cancelled));
        assert!(matches!(AppError::from(err), AppError::Unavailable { .. }));
    }

    /// Store whose inserts never complete.
    struct StalledLinks {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl LinkRepository for StalledLinks {
        async fn create(&self, _new_link: NewLink) -> Result<Link, StoreError> {
            *self.calls.lock().unwrap() += 1;
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(StoreError::DuplicateCode)
        }
        async fn find_by_code(&self, _: &str) -> Result<Option<Link>, StoreError> {
            Ok(None)
        }
        async fn find_by_id(&self, _: i64) -> Result<Option<Link>, StoreError> {
            Ok(None)
        }
        async fn list(&self, _: i64, _: i64) -> Result<Vec<Link>, StoreError> {
            Ok(vec![])
        }
        async fn count(&self) -> Result<i64, StoreError> {
            Ok(0)
        }
        async fn count_created_since(&self, _: DateTime<Utc>) -> Result<i64, StoreError> {
            Ok(0)
        }
        async fn top_by_clicks(&self, _: i64) -> Result<Vec<Link>, StoreError> {
            Ok(vec![])
        }
        async fn increment_click_count(&self, _: i64) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_allocate_deadline_during_insert_stops_loop() {
        let repo = Arc::new(StalledLinks {
            calls: Mutex::new(0),
        });
        let allocator = CodeAllocator::new(repo.clone(), Arc::new(OsRandom));

        let deadline = Instant::now() + Duration::from_secs(2);
        let err = allocator
            .allocate("https://example.com", 7, 5, Some(deadline))
            .await
            .unwrap_err();

        assert!(matches!(err, AllocationError::Cancelled));
        assert_eq!(*repo.calls.lock().unwrap(), 1);
    }
}
