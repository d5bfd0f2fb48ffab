//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::map_sqlx_error;
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{LinkRepository, StoreError};

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    long_url: String,
    click_count: i64,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link::new(
            row.id,
            row.code,
            row.long_url,
            row.click_count,
            row.created_at,
        )
    }
}

/// PostgreSQL repository for link storage and retrieval.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, StoreError> {
        // A plain INSERT: the unique constraint on `code` decides, atomically,
        // whether the candidate is free.
        sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (code, long_url)
            VALUES ($1, $2)
            RETURNING id, code, long_url, click_count, created_at
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.long_url)
        .fetch_one(self.pool.as_ref())
        .await
        .map(Link::from)
        .map_err(map_sqlx_error)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, StoreError> {
        sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, long_url, click_count, created_at
            FROM links
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map(|row| row.map(Link::from))
        .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, StoreError> {
        sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, long_url, click_count, created_at
            FROM links
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map(|row| row.map(Link::from))
        .map_err(map_sqlx_error)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Link>, StoreError> {
        sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, long_url, click_count, created_at
            FROM links
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await
        .map(|rows| rows.into_iter().map(Link::from).collect())
        .map_err(map_sqlx_error)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM links")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM links WHERE created_at >= $1")
            .bind(since)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn top_by_clicks(&self, limit: i64) -> Result<Vec<Link>, StoreError> {
        sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, long_url, click_count, created_at
            FROM links
            ORDER BY click_count DESC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await
        .map(|rows| rows.into_iter().map(Link::from).collect())
        .map_err(map_sqlx_error)
    }

    async fn increment_click_count(&self, link_id: i64) -> Result<(), StoreError> {
        sqlx::query("UPDATE links SET click_count = click_count + 1 WHERE id = $1")
            .bind(link_id)
            .execute(self.pool.as_ref())
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}
