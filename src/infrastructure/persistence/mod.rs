//! PostgreSQL repository implementations.
//!
//! Queries go through SQLx with bound parameters; rows are decoded into
//! private `FromRow` structs and converted into domain entities.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage, unique-code insert, link counters
//! - [`PgStatsRepository`] - Click records and click counts

pub mod pg_link_repository;
pub mod pg_stats_repository;

pub use pg_link_repository::PgLinkRepository;
pub use pg_stats_repository::PgStatsRepository;

use crate::domain::repositories::StoreError;

/// Name of the unique constraint on `links.code` (see `migrations/`).
pub const CODE_UNIQUE_CONSTRAINT: &str = "links_code_key";

/// Translates a SQLx error into a [`StoreError`].
///
/// Only a unique violation on [`CODE_UNIQUE_CONSTRAINT`] counts as a
/// duplicate code; every other failure, other unique constraints included,
/// is a plain database error.
pub fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error()
        && db_err.is_unique_violation()
        && db_err.constraint() == Some(CODE_UNIQUE_CONSTRAINT)
    {
        return StoreError::DuplicateCode;
    }

    StoreError::Database(e.to_string())
}
