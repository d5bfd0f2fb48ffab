//! CLI administration tool for shortlink.
//!
//! Provides statistics, database diagnostics, and short code utilities
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Short code tools (no database needed)
//! cargo run --bin admin -- code generate --length 7
//! cargo run --bin admin -- code validate aZ3kP9q
//! cargo run --bin admin -- code encode 125
//! cargo run --bin admin -- code decode 21
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required for `stats` and `db`): PostgreSQL connection string

use shortlink::application::services::StatsService;
use shortlink::infrastructure::persistence::{PgLinkRepository, PgStatsRepository};
use shortlink::utils::short_code::{
    DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH, MIN_CODE_LENGTH, OsRandom, decode_base62, encode_base62,
    generate_code, validate_code_format,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Short code utilities
    Code {
        #[command(subcommand)]
        action: CodeAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[derive(Subcommand)]
enum CodeAction {
    /// Generate a random short code
    Generate {
        #[arg(short, long, default_value_t = DEFAULT_CODE_LENGTH)]
        length: usize,
    },

    /// Check whether a string is a well-formed short code
    Validate { code: String },

    /// Encode a number as base62
    Encode { number: u64 },

    /// Decode a base62 string into a number
    Decode { code: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stats => handle_stats(&connect().await?).await?,
        Commands::Db { action } => handle_db_action(action, &connect().await?).await?,
        Commands::Code { action } => handle_code_action(action)?,
    }

    Ok(())
}

async fn connect() -> Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

/// Displays service-wide statistics and the most clicked links.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let pool = Arc::new(pool.clone());
    let service = StatsService::new(
        Arc::new(PgStatsRepository::new(pool.clone())),
        Arc::new(PgLinkRepository::new(pool)),
    );

    let metrics = service
        .metrics()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    println!(
        "  Links:         {} ({} today)",
        metrics.total_links.to_string().bright_green().bold(),
        metrics.links_today.to_string().bright_white()
    );
    println!(
        "  Clicks:        {} ({} today)",
        metrics.total_clicks.to_string().bright_green().bold(),
        metrics.clicks_today.to_string().bright_white()
    );
    println!();

    if metrics.top_links.is_empty() {
        return Ok(());
    }

    println!("{}", "Top links:".bright_white().bold());
    println!(
        "  {:<12} {:>8}  {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());

    for link in &metrics.top_links {
        println!(
            "  {:<12} {:>8}  {}",
            link.code.cyan(),
            link.click_count,
            link.long_url.bright_black()
        );
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
    }

    Ok(())
}

fn handle_code_action(action: CodeAction) -> Result<()> {
    match action {
        CodeAction::Generate { length } => {
            if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
                anyhow::bail!(
                    "Length must be between {MIN_CODE_LENGTH} and {MAX_CODE_LENGTH}, got {length}"
                );
            }

            let code = generate_code(&OsRandom, length)
                .map_err(|e| anyhow::anyhow!("Failed to generate code: {}", e))?;
            println!("{}", code.bright_yellow().bold());
        }
        CodeAction::Validate { code } => {
            if validate_code_format(&code) {
                println!("{} {}", "✅".green(), code.cyan());
            } else {
                println!(
                    "{} {} is not 1-{} base62 characters",
                    "❌".red(),
                    code.cyan(),
                    MAX_CODE_LENGTH
                );
                std::process::exit(1);
            }
        }
        CodeAction::Encode { number } => {
            println!("{}", encode_base62(number).bright_yellow());
        }
        CodeAction::Decode { code } => {
            let number =
                decode_base62(&code).map_err(|e| anyhow::anyhow!("Cannot decode '{code}': {e}"))?;
            println!("{}", number.to_string().bright_yellow());
        }
    }

    Ok(())
}
