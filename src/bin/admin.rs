//! CLI administration tool for tours-api.
//!
//! Loads seed data, manages user roles and performs database operations
//! without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations
//! cargo run --bin admin -- db migrate
//!
//! # Import tours.json, users.json and reviews.json from a directory
//! cargo run --bin admin -- data import --dir dev-data
//!
//! # Delete all tours, users and reviews
//! cargo run --bin admin -- data delete
//!
//! # Promote a user
//! cargo run --bin admin -- user role laura@example.com lead-guide
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
//! Same as the server; `DATABASE_URL` (or its `DB_*` components) and
//! `JWT_SECRET` are required.
//!
//! # Seed File Formats
//!
//! - `tours.json`: array of tour objects as accepted by `POST /api/v1/tours`
//! - `users.json`: array of `{ name, email, password, role?, avatar? }`
//! - `reviews.json`: array of `{ review, rating, tour, user }` where `tour` is
//!   the tour name and `user` the author's email

use tours_api::api::dto::tour::CreateTourRequest;
use tours_api::application::services::{
    AuthService, Registration, ReviewService, TourService, UserService,
};
use tours_api::config;
use tours_api::domain::entities::{NewReview, Role};
use tours_api::domain::query::QueryRequest;
use tours_api::infrastructure::mailer::LogMailer;
use tours_api::state::{DynTourService, Repositories};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use serde::Deserialize;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use validator::Validate;

/// CLI tool for managing tours-api.
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
    /// Import or delete seed data
    Data {
        #[command(subcommand)]
        action: DataAction,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Seed data subcommands.
#[derive(Subcommand)]
enum DataAction {
    /// Import tours, users and reviews from JSON files
    Import {
        /// Directory containing tours.json, users.json and reviews.json
        #[arg(short, long, default_value = "dev-data")]
        dir: PathBuf,
    },

    /// Delete all tours, users and reviews
    Delete {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Grant a role (user, guide, lead-guide, admin)
    Role { email: String, role: Role },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,

    /// Apply pending migrations
    Migrate,
}

#[derive(Deserialize)]
struct SeedUser {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    avatar: Option<String>,
}

#[derive(Deserialize)]
struct SeedReview {
    review: String,
    rating: i32,
    tour: String,
    user: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Data { action } => handle_data_action(action, &pool, &config).await?,
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches seed data commands.
async fn handle_data_action(
    action: DataAction,
    pool: &PgPool,
    config: &config::Config,
) -> Result<()> {
    match action {
        DataAction::Import { dir } => import_data(&dir, pool, config).await,
        DataAction::Delete { yes } => delete_data(pool, yes).await,
    }
}

fn read_seed<T: for<'de> Deserialize<'de>>(dir: &Path, file: &str) -> Result<Vec<T>> {
    let path = dir.join(file);
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Imports seed files through the services, so slugs are derived, passwords
/// hashed and tour ratings recomputed exactly as through the API.
async fn import_data(dir: &Path, pool: &PgPool, config: &config::Config) -> Result<()> {
    println!("{}", "📥 Importing data".bright_blue().bold());
    println!();

    let tours: Vec<CreateTourRequest> = read_seed(dir, "tours.json")?;
    let users: Vec<SeedUser> = read_seed(dir, "users.json")?;
    let reviews: Vec<SeedReview> = read_seed(dir, "reviews.json")?;

    let repositories = Repositories::postgres(Arc::new(pool.clone()));
    let tour_service = TourService::new(repositories.tours.clone());
    let review_service =
        ReviewService::new(repositories.reviews.clone(), repositories.tours.clone());
    let auth_service = AuthService::new(
        repositories.users.clone(),
        Arc::new(LogMailer::new()),
        config.auth_settings(),
    );

    for request in tours {
        request.validate()?;
        let new_tour = request
            .into_new_tour()
            .context("Tour seed is missing required fields")?;
        let name = new_tour.name.clone();
        tour_service
            .create_tour(new_tour)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to import tour '{}': {}", name, e))?;
        println!("  {} tour {}", "✓".green(), name.cyan());
    }

    for seed in users {
        let registration = Registration {
            name: seed.name,
            email: seed.email,
            password: seed.password,
            avatar: seed.avatar,
        };
        let email = registration.email.clone();
        auth_service
            .register(registration, seed.role.unwrap_or(Role::User))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to import user '{}': {}", email, e))?;
        println!("  {} user {}", "✓".green(), email.cyan());
    }

    for seed in reviews {
        let tour_id = find_tour_id(&tour_service, &seed.tour)
            .await?
            .with_context(|| format!("Unknown tour '{}'", seed.tour))?;
        let user = repositories
            .users
            .find_by_email(&seed.user.to_lowercase())
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
            .with_context(|| format!("Unknown user '{}'", seed.user))?;

        review_service
            .create_review(NewReview {
                review: seed.review,
                rating: seed.rating,
                tour_id,
                user_id: user.id,
            })
            .await
            .map_err(|e| anyhow::anyhow!("Failed to import review: {}", e))?;
    }

    println!();
    println!("{}", "✅ Data imported successfully!".green().bold());
    Ok(())
}

async fn find_tour_id(
    tour_service: &DynTourService,
    name: &str,
) -> Result<Option<i64>> {
    let request = QueryRequest::default()
        .with("name", name)
        .with("limit", "1");
    let page = tour_service
        .list_tours(request)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    Ok(page
        .documents
        .first()
        .and_then(|doc| doc.get("id"))
        .and_then(serde_json::Value::as_i64))
}

/// Deletes all data with confirmation prompt (default: No).
async fn delete_data(pool: &PgPool, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete all data".bright_blue().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete ALL tours, users and reviews?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    sqlx::query("TRUNCATE reviews, users, tours RESTART IDENTITY CASCADE")
        .execute(pool)
        .await?;

    println!("{}", "✅ Data deleted successfully!".green().bold());
    Ok(())
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repositories = Repositories::postgres(Arc::new(pool.clone()));
    let user_service = UserService::new(repositories.users);

    match action {
        UserAction::Role { email, role } => {
            let user = user_service
                .set_role(&email, role)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to update role: {}", e))?;

            println!(
                "{} {} is now {}",
                "✅".green(),
                user.email.cyan(),
                user.role.to_string().bright_yellow().bold()
            );
        }
    }

    Ok(())
}

/// Displays row counts per table.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let tours_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tours")
        .fetch_one(pool)
        .await?;

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE active")
        .fetch_one(pool)
        .await?;

    let reviews_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
        .fetch_one(pool)
        .await?;

    println!(
        "  Tours:        {}",
        tours_count.to_string().bright_green().bold()
    );
    println!(
        "  Active users: {}",
        users_count.to_string().bright_green().bold()
    );
    println!(
        "  Reviews:      {}",
        reviews_count.to_string().bright_green().bold()
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

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
        DbAction::Migrate => {
            println!("{}", "🛠  Applying migrations...".bright_blue());

            sqlx::migrate!("./migrations").run(pool).await?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}
