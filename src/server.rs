//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, background task spawning, and Axum server lifecycle.

use crate::application::services::{LinkService, LinkSettings, StatsService};
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::rate_limiter::{RateLimiter, run_cleanup};
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::infrastructure::persistence::{PgLinkRepository, PgStatsRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::short_code::OsRandom;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Builds the PostgreSQL pool from the pool settings in `config`.
///
/// # Errors
///
/// Returns an error if the first connection cannot be established.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Rate limiter and its cleanup task
/// - Background click worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let pool = Arc::new(pool);
    let link_repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let stats_repository: Arc<dyn StatsRepository> =
        Arc::new(PgStatsRepository::new(pool.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit,
        config.rate_limit_window(),
    ));
    let cleanup_task = tokio::spawn(run_cleanup(rate_limiter.clone(), shutdown_rx));
    tracing::info!("Rate limiter cleanup task started");

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    tokio::spawn(run_click_worker(
        click_rx,
        stats_repository.clone(),
        link_repository.clone(),
        config.click_timeout(),
    ));
    tracing::info!("Click worker started");

    let settings = LinkSettings {
        base_url: config.base_url.clone(),
        code_length: config.code_length,
        max_retries: config.code_max_retries,
        allocation_timeout: config.allocation_timeout(),
    };

    let state = AppState {
        link_service: Arc::new(LinkService::new(
            link_repository.clone(),
            Arc::new(OsRandom),
            settings,
        )),
        stats_service: Arc::new(StatsService::new(stats_repository, link_repository)),
        rate_limiter,
        click_sender: click_tx,
        behind_proxy: config.behind_proxy,
    };

    let app = app_router(state, &config.frontend_url);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, shutting down background tasks");
    let _ = shutdown_tx.send(true);
    if let Err(e) = cleanup_task.await {
        tracing::warn!("Rate limiter cleanup task ended abnormally: {e}");
    }

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
