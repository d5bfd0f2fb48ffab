//! Click statistics and service-wide metrics.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use serde_json::json;

use crate::domain::entities::{Click, Link};
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::error::AppError;

/// Number of links reported in [`ServiceMetrics::top_links`].
pub const TOP_LINKS: i64 = 10;

/// Service-wide counters.
#[derive(Debug, Clone)]
pub struct ServiceMetrics {
    pub total_links: i64,
    pub total_clicks: i64,
    pub links_today: i64,
    pub clicks_today: i64,
    pub top_links: Vec<Link>,
}

/// Read-side service over recorded clicks.
pub struct StatsService<S: StatsRepository + ?Sized, L: LinkRepository + ?Sized> {
    stats_repository: Arc<S>,
    link_repository: Arc<L>,
}

impl<S: StatsRepository + ?Sized, L: LinkRepository + ?Sized> StatsService<S, L> {
    /// Creates a new statistics service.
    pub fn new(stats_repository: Arc<S>, link_repository: Arc<L>) -> Self {
        Self {
            stats_repository,
            link_repository,
        }
    }

    /// Returns one page of clicks for a link, newest first, with the total.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist.
    pub async fn link_clicks(
        &self,
        link_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Click>, i64), AppError> {
        self.ensure_link(link_id).await?;

        let clicks = self
            .stats_repository
            .list_clicks(link_id, offset, limit)
            .await?;
        let total = self.stats_repository.count_clicks(link_id).await?;

        Ok((clicks, total))
    }

    /// Counts recorded clicks for a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist.
    pub async fn click_count(&self, link_id: i64) -> Result<i64, AppError> {
        self.ensure_link(link_id).await?;

        Ok(self.stats_repository.count_clicks(link_id).await?)
    }

    /// Collects totals, today's activity (UTC) and the most clicked links.
    pub async fn metrics(&self) -> Result<ServiceMetrics, AppError> {
        let today = start_of_day(Utc::now());

        Ok(ServiceMetrics {
            total_links: self.link_repository.count().await?,
            total_clicks: self.stats_repository.count_all().await?,
            links_today: self.link_repository.count_created_since(today).await?,
            clicks_today: self.stats_repository.count_since(today).await?,
            top_links: self.link_repository.top_by_clicks(TOP_LINKS).await?,
        })
    }

    async fn ensure_link(&self, link_id: i64) -> Result<(), AppError> {
        match self.link_repository.find_by_id(link_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(
                "URL not found",
                json!({ "id": link_id }),
            )),
        }
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}
