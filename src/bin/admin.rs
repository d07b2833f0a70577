//! CLI administration tool for shortcode.
//!
//! Works directly against the PostgreSQL store, without going through the
//! HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show the code sequence a URL would walk (no database needed)
//! cargo run --bin admin -- derive https://example.com/a --attempts 3
//!
//! # Shorten a URL (prompts for the URL when omitted)
//! cargo run --bin admin -- shorten https://example.com/a
//!
//! # Look up a code
//! cargo run --bin admin -- resolve 3voipHMxsn
//!
//! # Most recent mappings
//! cargo run --bin admin -- list --limit 20
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
//! - `DATABASE_URL` (or `DB_*` components): PostgreSQL connection string
//! - `BASE_URL`: prefix used when printing short links
//! - `CODE_MAX_LENGTH`, `SHORTEN_MAX_ATTEMPTS`: same meaning as for the server

use shortcode::application::services::shortening_service::{
    DEFAULT_MAX_ATTEMPTS, seed_for_attempt,
};
use shortcode::application::services::{DynShorteningService, ShorteningService, short_url};
use shortcode::config::Config;
use shortcode::domain::code_deriver::{CodeDeriver, MAX_CODE_LENGTH, Sha256CodeDeriver};
use shortcode::domain::repositories::MappingRepository;
use shortcode::infrastructure::persistence::PgMappingRepository;
use shortcode::utils::url_normalizer::{is_valid_http_url, normalize_url};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortcode.
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
    /// Print the candidate codes derived for a URL
    Derive {
        /// URL to derive codes for (normalized first)
        url: String,

        /// Number of candidates to print
        #[arg(short, long, default_value_t = 1)]
        attempts: usize,

        /// Maximum code length (1-10)
        #[arg(short, long, default_value_t = MAX_CODE_LENGTH)]
        length: usize,
    },

    /// Shorten a URL, creating the mapping if needed
    Shorten {
        /// URL to shorten (prompted for when omitted)
        url: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Look up the original URL for a short code
    Resolve {
        code: String,
    },

    /// List the most recent mappings
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
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
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Derivation is pure; everything else needs the store
    if let Commands::Derive {
        url,
        attempts,
        length,
    } = &cli.command
    {
        return derive_codes(url, *attempts, *length);
    }

    let database_url = Config::load_database_url().context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Derive { .. } => {}
        Commands::Shorten { url, yes } => shorten(&pool, url, yes).await?,
        Commands::Resolve { code } => resolve(&pool, &code).await?,
        Commands::List { limit } => list_mappings(&pool, limit).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Builds the shortening service the server would use, from the environment.
fn build_service(pool: &PgPool) -> DynShorteningService {
    let length = env_usize("CODE_MAX_LENGTH", MAX_CODE_LENGTH);
    let attempts = env_usize("SHORTEN_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS);

    let repository: Arc<dyn MappingRepository> =
        Arc::new(PgMappingRepository::new(Arc::new(pool.clone())));
    let deriver: Arc<dyn CodeDeriver> = Arc::new(Sha256CodeDeriver::new(length));

    ShorteningService::new(repository, deriver).with_max_attempts(attempts)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Prints the seeds and codes a URL walks through on collisions.
///
/// # Output Format
///
/// ```text
/// 🔢 Derived codes for https://example.com/first
///
///   #   Seed                                               Code
///   ────────────────────────────────────────────────────────────────────
///   0   https://example.com/first                          AISheddZXn
///   1   https://example.com/first#1                        48zSNbHa04
/// ```
fn derive_codes(url: &str, attempts: usize, length: usize) -> Result<()> {
    let normalized = normalize_url(url).context("Invalid URL")?;
    let deriver = Sha256CodeDeriver::new(length);

    println!(
        "{} {}",
        "🔢 Derived codes for".bright_blue().bold(),
        normalized.cyan()
    );
    println!();
    println!(
        "  {:<3} {:<50} {}",
        "#".bright_white().bold(),
        "Seed".bright_white().bold(),
        "Code".bright_white().bold()
    );
    println!("  {}", "─".repeat(68).bright_black());

    for attempt in 0..attempts.max(1) {
        let seed = seed_for_attempt(&normalized, attempt);
        let code = deriver
            .derive(&seed)
            .map_err(|e| anyhow::anyhow!("Failed to derive code: {}", e))?;

        println!(
            "  {:<3} {:<50} {}",
            attempt.to_string().bright_black(),
            seed,
            code.bright_yellow().bold()
        );
    }
    println!();

    Ok(())
}

/// Shortens a URL with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for the URL (or use provided)
/// 2. Show the canonical form
/// 3. Confirm (unless `--yes` flag)
/// 4. Create or fetch the mapping
async fn shorten(pool: &PgPool, url: Option<String>, skip_confirm: bool) -> Result<()> {
    println!("{}", "✂️  Shorten URL".bright_blue().bold());
    println!();

    let url = match url {
        Some(u) => u,
        None => Input::<String>::new()
            .with_prompt("URL")
            .validate_with(|input: &String| -> Result<(), &str> {
                if is_valid_http_url(input) {
                    Ok(())
                } else {
                    Err("Enter an absolute http:// or https:// URL")
                }
            })
            .interact_text()?,
    };

    let normalized = normalize_url(&url).context("Invalid URL")?;
    println!("  Canonical: {}", normalized.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Shorten this URL?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let service = build_service(pool);
    let mapping = service
        .shorten(&url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?;

    println!();
    println!("{}", "✅ Short link ready".green().bold());
    println!("  Code:      {}", mapping.short_code.bright_yellow().bold());
    println!(
        "  Short URL: {}",
        short_url(&base_url(), &mapping.short_code).bright_cyan()
    );
    println!(
        "  Created:   {}",
        mapping
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

async fn resolve(pool: &PgPool, code: &str) -> Result<()> {
    let service = build_service(pool);

    match service.resolve(code).await {
        Ok(url) => println!("  {} → {}", code.bright_yellow(), url.cyan()),
        Err(e) => println!("{} {}", "⚠️ ".yellow(), e.to_string().yellow()),
    }

    Ok(())
}

/// Lists the most recent mappings, newest first.
///
/// # Output Format
///
/// ```text
/// 📋 Recent mappings
///
///   ID  Code        Created              URL
///   ─────────────────────────────────────────────────────────────────────────
///   2   7YO15AHInf  2025-01-15 10:31     https://example.com/b
///   1   3voipHMxsn  2025-01-15 10:30     https://example.com/a
/// ```
async fn list_mappings(pool: &PgPool, limit: i64) -> Result<()> {
    println!("{}", "📋 Recent mappings".bright_blue().bold());
    println!();

    let mappings = build_service(pool)
        .recent_mappings(limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list mappings: {}", e))?;

    if mappings.is_empty() {
        println!("{}", "  No mappings found".yellow());
        println!();
        println!(
            "  Create one with: {} admin shorten",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<11} {:<20} {}",
        "ID".bright_white().bold(),
        "Code".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for mapping in &mappings {
        println!(
            "  {:<3} {:<11} {:<20} {}",
            mapping.id.to_string().bright_black(),
            mapping.short_code.bright_yellow(),
            mapping
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            mapping.original_url.cyan()
        );
    }

    println!();
    println!(
        "  Shown: {}",
        mappings.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Displays mapping statistics.
///
/// Shows:
/// - Total number of mappings
/// - Creation time of the newest mapping
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let mappings_count = build_service(pool)
        .mapping_count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count mappings: {}", e))?;

    let newest: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT MAX(created_at) FROM mappings")
            .fetch_one(pool)
            .await?;

    println!(
        "  Mappings:      {}",
        mappings_count.to_string().bright_green().bold()
    );
    println!(
        "  Last created:  {}",
        newest
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string())
            .bright_green()
            .bold()
    );
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
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", applied.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
