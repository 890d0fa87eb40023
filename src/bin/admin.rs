//! CLI administration tool for snaplink.
//!
//! Inspects and deletes links, shows statistics and checks the database
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show a link and its click count
//! cargo run --bin admin -- link show abc123
//!
//! # Delete a link (by id or short code), its clicks and its cache entry
//! cargo run --bin admin -- link delete abc123
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `REDIS_URL` (optional): evict deleted links from the shared cache

use snaplink::application::services::{DeleteMode, DeleteTarget, DeletionCoordinator};
use snaplink::domain::repositories::{ClickRepository, LinkRepository};
use snaplink::infrastructure::cache::{CacheService, NullCache, RedisCache};
use snaplink::infrastructure::persistence::{PgClickRepository, PgLinkRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// CLI tool for managing snaplink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect or delete links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Show a link by short code
    Show { code: String },

    /// Delete a link by id or short code
    Delete {
        /// Link UUID or short code
        id_or_code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_link_action(action: LinkAction, pool: PgPool) -> Result<()> {
    let pool = Arc::new(pool);
    let links = Arc::new(PgLinkRepository::new(pool.clone()));

    match action {
        LinkAction::Show { code } => {
            let clicks = PgClickRepository::new(pool);
            show_link(links.as_ref(), &clicks, &code).await
        }
        LinkAction::Delete { id_or_code, yes } => delete_link(links, id_or_code, yes).await,
    }
}

async fn show_link(
    links: &PgLinkRepository,
    clicks: &PgClickRepository,
    code: &str,
) -> Result<()> {
    let link = links
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Link not found")?;

    let click_count = clicks
        .count_by_link_id(link.id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    println!("{}", "Link".bright_blue().bold());
    println!();
    println!("  ID:          {}", link.id.to_string().bright_black());
    println!("  Code:        {}", link.short_code.cyan());
    println!("  Destination: {}", link.destination.bright_white());
    println!("  Owner:       {}", link.owner_id.to_string().bright_black());
    println!(
        "  Protected:   {}",
        if link.is_protected {
            "yes".yellow()
        } else {
            "no".normal()
        }
    );
    println!(
        "  Expires:     {}",
        link.expires_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string())
    );
    println!(
        "  Clicks left: {}",
        link.click_limit
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    );
    println!(
        "  Clicks:      {}",
        click_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Deletes a link after confirmation (default: No).
///
/// Goes through the same coordinator as `DELETE /links/{id}`, so clicks,
/// the row and the cache entry are removed together.
async fn delete_link(links: Arc<PgLinkRepository>, id_or_code: String, yes: bool) -> Result<()> {
    println!("{}", "Delete Link".bright_blue().bold());
    println!();

    let target = match Uuid::parse_str(&id_or_code) {
        Ok(id) => DeleteTarget::Id(id),
        Err(_) => DeleteTarget::Code(id_or_code.clone()),
    };

    println!("  Target: {}", id_or_code.cyan());
    println!();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link and all its clicks?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let coordinator = DeletionCoordinator::new(links, connect_cache().await);
    coordinator
        .delete_link(target, DeleteMode::Explicit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "Link deleted".green().bold());
    println!();

    Ok(())
}

async fn connect_cache() -> Arc<dyn CacheService> {
    let Ok(redis_url) = std::env::var("REDIS_URL") else {
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(&redis_url).await {
        Ok(redis) => Arc::new(redis),
        Err(e) => {
            println!(
                "{}",
                format!("Redis unavailable ({e}), cache entry not evicted").yellow()
            );
            Arc::new(NullCache::new())
        }
    }
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links
/// - Protected, expiring and click-limited links
/// - Total number of clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_links")
        .fetch_one(pool)
        .await?;

    let protected_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM short_links WHERE is_protected")
            .fetch_one(pool)
            .await?;

    let expired_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM short_links WHERE expires_at <= NOW()")
            .fetch_one(pool)
            .await?;

    let limited_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM short_links WHERE click_limit IS NOT NULL")
            .fetch_one(pool)
            .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks")
        .fetch_one(pool)
        .await?;

    println!(
        "  Links:          {}",
        links_count.to_string().bright_green().bold()
    );
    println!("  Protected:      {}", protected_count.to_string().bright_white());
    println!("  Click-limited:  {}", limited_count.to_string().bright_white());
    println!("  Expired:        {}", expired_count.to_string().yellow());
    println!(
        "  Clicks:         {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
