//! Background persistence of click events.
//!
//! Click logging is best-effort and at-most-once: each event gets one attempt
//! bounded by a timeout, failures are logged and counted, nothing is retried
//! and nothing reaches the client whose redirect produced the event.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::NewClick;
use crate::domain::repositories::{LinkRepository, StatsRepository, StoreError};

/// Consumes click events until every sender is dropped.
///
/// For each event the click row is inserted and the link's counter bumped,
/// both within `timeout`.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    stats_repository: Arc<dyn StatsRepository>,
    link_repository: Arc<dyn LinkRepository>,
    timeout: Duration,
) {
    while let Some(event) = rx.recv().await {
        let code = event.code.clone();
        let link_id = event.link_id;

        let outcome = tokio::time::timeout(
            timeout,
            record(stats_repository.as_ref(), link_repository.as_ref(), event),
        )
        .await;

        match outcome {
            Ok(Ok(())) => debug!(%code, link_id, "Click recorded"),
            Ok(Err(e)) => {
                metrics::counter!("clicks_failed_total").increment(1);
                warn!(%code, link_id, error = %e, "Failed to record click");
            }
            Err(_) => {
                metrics::counter!("clicks_failed_total").increment(1);
                warn!(%code, link_id, ?timeout, "Timed out recording click");
            }
        }
    }

    info!("Click worker stopped");
}

async fn record(
    stats_repository: &dyn StatsRepository,
    link_repository: &dyn LinkRepository,
    event: ClickEvent,
) -> Result<(), StoreError> {
    let link_id = event.link_id;

    stats_repository.record_click(NewClick::from(event)).await?;
    link_repository.increment_click_count(link_id).await
}
