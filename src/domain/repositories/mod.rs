//! Repository trait definitions for the domain layer.
//!
//! Traits define the store contract; implementations live in
//! `crate::infrastructure::persistence`, and `mockall` mocks are generated
//! for unit tests.
//!
//! - [`LinkRepository`] - Short links, including the unique-code insert
//! - [`StatsRepository`] - Click records and aggregate counts

pub mod link_repository;
pub mod stats_repository;

pub use link_repository::LinkRepository;
pub use stats_repository::StatsRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use stats_repository::MockStatsRepository;

use serde_json::json;

use crate::error::AppError;

/// Failure reported by a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The short code is already taken.
    #[error("short code already exists")]
    DuplicateCode,

    /// Any other storage failure.
    #[error("database error: {0}")]
    Database(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateCode => {
                AppError::conflict("Short code already exists", json!({}))
            }
            StoreError::Database(reason) => {
                tracing::error!(%reason, "Store operation failed");
                AppError::internal("Database error", json!({}))
            }
        }
    }
}
