//! CLI administration tool for bizval.
//!
//! Manages users, API tokens and tiers, and shows usage and system
//! statistics without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Register a user and give them a tier
//! cargo run --bin admin -- user create --email owner@example.com --tier professional
//! cargo run --bin admin -- user set-tier owner@example.com enterprise
//!
//! # Issue, list and revoke API tokens
//! cargo run --bin admin -- token create --email owner@example.com --name "Laptop"
//! cargo run --bin admin -- token list
//! cargo run --bin admin -- token revoke "Laptop"
//!
//! # Tier usage for the last 7 days
//! cargo run --bin admin -- usage --days 7
//!
//! # Totals and database checks
//! cargo run --bin admin -- stats
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): must match the server

use bizval::application::services::hash_token;
use bizval::domain::Tier;
use bizval::domain::entities::{NewUser, User};
use bizval::domain::repositories::{TokenRepository, UsageRepository, UserRepository};
use bizval::infrastructure::persistence::{PgTokenRepository, PgUsageRepository, PgUserRepository};

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use std::sync::Arc;

const TOKEN_LEN: usize = 48;

/// CLI tool for managing bizval.
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
    /// Manage users and their tiers
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show tier usage metrics
    Usage {
        /// How many days back to aggregate
        #[arg(short, long, default_value_t = 30)]
        days: i64,
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
enum UserAction {
    /// Register a user
    Create {
        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        name: Option<String>,

        /// Identity provider subject (defaults to `local|<email>`)
        #[arg(long)]
        external_id: Option<String>,

        /// basic, professional or enterprise
        #[arg(short, long, default_value = "basic")]
        tier: Tier,
    },

    /// List all users
    List,

    /// Change a user's tier
    SetTier {
        /// User email or ID
        user: String,

        tier: Tier,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token for a user
    Create {
        /// Owner's email or ID
        #[arg(short, long)]
        email: Option<String>,

        /// Token name (e.g., "Laptop", "CI")
        #[arg(short, long)]
        name: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
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
    let pool = Arc::new(pool);

    match cli.command {
        Commands::User { action } => handle_user_action(action, pool).await?,
        Commands::Token { action } => handle_token_action(action, pool).await?,
        Commands::Usage { days } => handle_usage(days, pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Resolves a user by numeric ID or email.
async fn find_user(repo: &PgUserRepository, email_or_id: &str) -> Result<User> {
    let user = match email_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_email(email_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    user.with_context(|| format!("User '{email_or_id}' not found"))
}

async fn handle_user_action(action: UserAction, pool: Arc<PgPool>) -> Result<()> {
    let repo = PgUserRepository::new(pool);

    match action {
        UserAction::Create {
            email,
            name,
            external_id,
            tier,
        } => {
            println!("{}", "Create User".bright_blue().bold());
            println!();

            let email = match email {
                Some(e) => e,
                None => Input::new().with_prompt("Email").interact_text()?,
            };
            let external_id = external_id.unwrap_or_else(|| format!("local|{email}"));

            let user = repo
                .create(NewUser {
                    external_id,
                    email,
                    name,
                    tier,
                })
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

            println!(
                "{} user {} ({}) on the {} tier",
                "Created".green().bold(),
                user.id.to_string().bright_white(),
                user.email.cyan(),
                user.tier.to_string().bright_yellow()
            );
        }
        UserAction::List => {
            let users = repo
                .list()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

            if users.is_empty() {
                println!("{}", "  No users found".yellow());
                return Ok(());
            }

            println!(
                "  {:<5} {:<35} {:<14} {:<20}",
                "ID".bright_white().bold(),
                "Email".bright_white().bold(),
                "Tier".bright_white().bold(),
                "Created".bright_white().bold()
            );
            println!("  {}", "-".repeat(76).bright_black());

            for user in &users {
                println!(
                    "  {:<5} {:<35} {:<14} {}",
                    user.id.to_string().bright_black(),
                    user.email.cyan(),
                    user.tier.to_string(),
                    user.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
                );
            }

            println!();
            println!("  Total: {}", users.len().to_string().bright_white().bold());
        }
        UserAction::SetTier { user, tier } => {
            let found = find_user(&repo, &user).await?;
            if found.tier == tier {
                println!("{}", format!("User is already on the {tier} tier").yellow());
                return Ok(());
            }

            let updated = repo
                .update_tier(found.id, tier)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to update tier: {}", e))?;

            println!(
                "{} {}: {} -> {}",
                "Updated".green().bold(),
                updated.email.cyan(),
                found.tier,
                updated.tier.to_string().bright_yellow()
            );
        }
    }

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: Arc<PgPool>) -> Result<()> {
    let repo = PgTokenRepository::new(pool.clone());

    match action {
        TokenAction::Create { email, name, yes } => {
            let users = PgUserRepository::new(pool);
            create_token(&repo, &users, email, name, yes).await?;
        }
        TokenAction::List => list_tokens(&repo).await?,
        TokenAction::Revoke { name_or_id } => revoke_token(&repo, name_or_id).await?,
    }

    Ok(())
}

/// Creates a new API token with interactive prompts.
///
/// # Security
///
/// - Only the HMAC-SHA256 hash (keyed by `TOKEN_SIGNING_SECRET`) is stored
/// - Raw token is displayed once and cannot be retrieved later
/// - Tokens are 48 characters (alphanumeric) for high entropy
async fn create_token(
    repo: &PgTokenRepository,
    users: &PgUserRepository,
    email: Option<String>,
    name: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    let secret = std::env::var("TOKEN_SIGNING_SECRET")
        .context("TOKEN_SIGNING_SECRET must be set to issue tokens")?;

    println!("{}", "Create API Token".bright_blue().bold());
    println!();

    let owner = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Owner email").interact_text()?,
    };
    let user = find_user(users, &owner).await?;

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("API")
            .interact_text()?,
    };

    let token_value = generate_token();

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Owner: {} ({})", user.email.cyan(), user.tier);
    println!("  Name:  {}", token_name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(&secret, &token_value);

    repo.create_token(user.id, &token_name, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!("{}", "Token created successfully!".green().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/me",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

async fn list_tokens(repo: &PgTokenRepository) -> Result<()> {
    println!("{}", "API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<4} {:<6} {:<26} {:<18} {:<18} {:<8}",
        "ID".bright_white().bold(),
        "User".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "-".repeat(86).bright_black());

    for token in &tokens {
        let status = if token.revoked_at.is_some() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<4} {:<6} {:<26} {:<18} {:<18} {}",
            token.id.to_string().bright_black(),
            token.user_id.to_string(),
            token.name.cyan(),
            token.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!("  Total: {}", tokens.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Revokes a token by name or ID with confirmation prompt.
///
/// Numeric input is looked up by ID, anything else by exact name.
async fn revoke_token(repo: &PgTokenRepository, name_or_id: String) -> Result<()> {
    println!("{}", "Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(&name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let token = token.context("Token not found")?;

    if token.revoked_at.is_some() {
        println!("{}", "This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!("{}", "Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

/// Prints allowed and denied feature checks per tier.
async fn handle_usage(days: i64, pool: Arc<PgPool>) -> Result<()> {
    anyhow::ensure!(days > 0, "--days must be positive");

    let repo = PgUsageRepository::new(pool);
    let since = Utc::now() - Duration::days(days);
    let rows = repo
        .summary(since)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load usage: {}", e))?;

    println!(
        "{}",
        format!("Tier usage, last {days} days").bright_blue().bold()
    );
    println!();

    if rows.is_empty() {
        println!("{}", "  No usage recorded".yellow());
        return Ok(());
    }

    println!(
        "  {:<14} {:<22} {:<9} {:>8}",
        "Tier".bright_white().bold(),
        "Feature".bright_white().bold(),
        "Outcome".bright_white().bold(),
        "Count".bright_white().bold()
    );
    println!("  {}", "-".repeat(56).bright_black());

    for row in &rows {
        let outcome = if row.allowed {
            "allowed".green()
        } else {
            "denied".red()
        };
        println!(
            "  {:<14} {:<22} {:<9} {:>8}",
            row.tier.to_string(),
            row.feature.to_string().cyan(),
            outcome,
            row.count
        );
    }
    println!();

    Ok(())
}

/// Displays system totals.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let evaluations: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM evaluations WHERE deleted_at IS NULL")
            .fetch_one(pool)
            .await?;

    let reports: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
        .fetch_one(pool)
        .await?;

    let open_tickets: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM support_tickets WHERE status IN ('open', 'in_progress')",
    )
    .fetch_one(pool)
    .await?;

    let tokens: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    let by_tier: Vec<(String, i64)> =
        sqlx::query_as("SELECT tier, COUNT(*) FROM users GROUP BY tier ORDER BY tier")
            .fetch_all(pool)
            .await?;

    println!("  Users:         {}", users.to_string().bright_green().bold());
    for (tier, count) in &by_tier {
        println!("    {:<13} {}", tier, count);
    }
    println!(
        "  Evaluations:   {}",
        evaluations.to_string().bright_green().bold()
    );
    println!("  Reports:       {}", reports.to_string().bright_green().bold());
    println!(
        "  Open tickets:  {}",
        open_tickets.to_string().bright_green().bold()
    );
    println!("  Active tokens: {}", tokens.to_string().bright_green().bold());
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
            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a random 48-character alphanumeric token.
fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
