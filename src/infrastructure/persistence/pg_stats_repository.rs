//! PostgreSQL implementation of statistics repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::map_sqlx_error;
use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::{StatsRepository, StoreError};

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    clicked_at: DateTime<Utc>,
    ip: Option<String>,
    user_agent: Option<String>,
    referer: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(row: ClickRow) -> Self {
        Click {
            id: row.id,
            link_id: row.link_id,
            clicked_at: row.clicked_at,
            ip: row.ip,
            user_agent: row.user_agent,
            referer: row.referer,
        }
    }
}

/// PostgreSQL repository for click records.
pub struct PgStatsRepository {
    pool: Arc<PgPool>,
}

impl PgStatsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, StoreError> {
        sqlx::query_as::<_, ClickRow>(
            r#"
            INSERT INTO link_clicks (link_id, clicked_at, ip, user_agent, referer)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, link_id, clicked_at, ip, user_agent, referer
            "#,
        )
        .bind(new_click.link_id)
        .bind(new_click.clicked_at)
        .bind(new_click.ip)
        .bind(new_click.user_agent)
        .bind(new_click.referer)
        .fetch_one(self.pool.as_ref())
        .await
        .map(Click::from)
        .map_err(map_sqlx_error)
    }

    async fn list_clicks(
        &self,
        link_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Click>, StoreError> {
        sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT id, link_id, clicked_at, ip, user_agent, referer
            FROM link_clicks
            WHERE link_id = $1
            ORDER BY clicked_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await
        .map(|rows| rows.into_iter().map(Click::from).collect())
        .map_err(map_sqlx_error)
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM link_clicks WHERE link_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM link_clicks")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM link_clicks WHERE clicked_at >= $1")
            .bind(since)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }
}
