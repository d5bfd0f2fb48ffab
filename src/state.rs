//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{LinkService, StatsService};
use crate::domain::click_event::ClickEvent;
use crate::domain::rate_limiter::RateLimiter;
use crate::domain::repositories::{LinkRepository, StatsRepository};

/// Link service over any store implementation.
pub type DynLinkService = LinkService<dyn LinkRepository>;

/// Stats service over any store implementation.
pub type DynStatsService = StatsService<dyn StatsRepository, dyn LinkRepository>;

/// Cheap-to-clone handle shared by all handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub stats_service: Arc<DynStatsService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    /// Trust `X-Forwarded-For` / `X-Real-IP` when identifying clients.
    pub behind_proxy: bool,
}
