#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use shortlink::application::services::{LinkService, LinkSettings, StatsService};
use shortlink::domain::click_event::ClickEvent;
use shortlink::domain::entities::{Click, Link, NewClick, NewLink};
use shortlink::domain::rate_limiter::RateLimiter;
use shortlink::domain::repositories::{LinkRepository, StatsRepository, StoreError};
use shortlink::state::AppState;
use shortlink::utils::short_code::OsRandom;

pub const BASE_URL: &str = "http://sho.rt";
pub const FRONTEND_URL: &str = "http://localhost:3000";

/// In-memory link store enforcing code uniqueness like the database does.
#[derive(Default)]
pub struct MemoryLinks {
    links: Mutex<Vec<Link>>,
    pub lookups: Mutex<u32>,
}

impl MemoryLinks {
    pub fn insert(&self, code: &str, long_url: &str) -> Link {
        let mut links = self.links.lock().unwrap();
        let link = Link::new(
            links.len() as i64 + 1,
            code.to_string(),
            long_url.to_string(),
            0,
            Utc::now(),
        );
        links.push(link.clone());
        link
    }

    pub fn lookup_count(&self) -> u32 {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinks {
    async fn create(&self, new_link: NewLink) -> Result<Link, StoreError> {
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|l| l.code == new_link.code) {
            return Err(StoreError::DuplicateCode);
        }
        let link = Link::new(
            links.len() as i64 + 1,
            new_link.code,
            new_link.long_url,
            0,
            Utc::now(),
        );
        links.push(link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, StoreError> {
        *self.lookups.lock().unwrap() += 1;
        let links = self.links.lock().unwrap();
        Ok(links.iter().find(|l| l.code == code).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, StoreError> {
        let links = self.links.lock().unwrap();
        Ok(links.iter().find(|l| l.id == id).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Link>, StoreError> {
        let links = self.links.lock().unwrap();
        Ok(links
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.links.lock().unwrap().len() as i64)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError> {
        let links = self.links.lock().unwrap();
        Ok(links.iter().filter(|l| l.created_at >= since).count() as i64)
    }

    async fn top_by_clicks(&self, limit: i64) -> Result<Vec<Link>, StoreError> {
        let mut links = self.links.lock().unwrap().clone();
        links.sort_by(|a, b| b.click_count.cmp(&a.click_count).then(a.id.cmp(&b.id)));
        links.truncate(limit as usize);
        Ok(links)
    }

    async fn increment_click_count(&self, link_id: i64) -> Result<(), StoreError> {
        let mut links = self.links.lock().unwrap();
        if let Some(link) = links.iter_mut().find(|l| l.id == link_id) {
            link.click_count += 1;
        }
        Ok(())
    }
}

/// In-memory click store.
#[derive(Default)]
pub struct MemoryClicks {
    clicks: Mutex<HashMap<i64, Vec<Click>>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl StatsRepository for MemoryClicks {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, StoreError> {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let click = Click {
            id,
            link_id: new_click.link_id,
            clicked_at: new_click.clicked_at,
            ip: new_click.ip,
            user_agent: new_click.user_agent,
            referer: new_click.referer,
        };
        self.clicks
            .lock()
            .unwrap()
            .entry(click.link_id)
            .or_default()
            .push(click.clone());
        Ok(click)
    }

    async fn list_clicks(
        &self,
        link_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Click>, StoreError> {
        let clicks = self.clicks.lock().unwrap();
        Ok(clicks
            .get(&link_id)
            .map(|c| {
                c.iter()
                    .rev()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, StoreError> {
        let clicks = self.clicks.lock().unwrap();
        Ok(clicks.get(&link_id).map_or(0, |c| c.len() as i64))
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        let clicks = self.clicks.lock().unwrap();
        Ok(clicks.values().map(|c| c.len() as i64).sum())
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError> {
        let clicks = self.clicks.lock().unwrap();
        Ok(clicks
            .values()
            .flatten()
            .filter(|c| c.clicked_at >= since)
            .count() as i64)
    }
}

pub struct TestContext {
    pub state: AppState,
    pub links: Arc<MemoryLinks>,
    pub clicks: Arc<MemoryClicks>,
    pub click_rx: mpsc::Receiver<ClickEvent>,
}

pub fn create_test_state() -> TestContext {
    create_test_state_with(RateLimiter::new(1000, Duration::from_secs(60)), false, 100)
}

pub fn create_test_state_with(
    rate_limiter: RateLimiter,
    behind_proxy: bool,
    queue_capacity: usize,
) -> TestContext {
    let links = Arc::new(MemoryLinks::default());
    let clicks = Arc::new(MemoryClicks::default());
    let (tx, rx) = mpsc::channel(queue_capacity);

    let link_repository: Arc<dyn LinkRepository> = links.clone();
    let stats_repository: Arc<dyn StatsRepository> = clicks.clone();

    let settings = LinkSettings {
        base_url: BASE_URL.to_string(),
        ..LinkSettings::default()
    };

    let state = AppState {
        link_service: Arc::new(LinkService::new(
            link_repository.clone(),
            Arc::new(OsRandom),
            settings,
        )),
        stats_service: Arc::new(StatsService::new(stats_repository, link_repository)),
        rate_limiter: Arc::new(rate_limiter),
        click_sender: tx,
        behind_proxy,
    };

    TestContext {
        state,
        links,
        clicks,
        click_rx: rx,
    }
}

/// Inserts a fixed peer address, as `into_make_service_with_connect_info` would.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> tower::Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: std::net::SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut()
            .insert(axum::extract::ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// Full application router with a mocked peer address.
pub fn test_app(state: AppState) -> axum::Router {
    shortlink::routes::router(state, FRONTEND_URL).layer(MockConnectInfoLayer)
}
