mod auth;
mod config;
mod http;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};
use platform_obs::{ObsConfig, init_tracing, shutdown_tracing};
use products_marketplace::{accounts::active_user, seed::seed_demo};
use tracing::info;
use uuid::Uuid;

use crate::{auth::issue_token, config::AppConfig, http::AppState};

#[derive(Parser, Debug)]
#[command(name = "pawpal-server", version, about = "Pet-sitting marketplace")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the REST server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Insert demo users, profiles and one open activity.
    Seed,
    /// Print a bearer token for an existing user.
    #[command(name = "token:issue")]
    TokenIssue {
        #[arg(long, value_name = "UUID")]
        user: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
    /// Rollback everything, then reapply.
    Reset,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::from_env())?;
    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Serve(cmd) => run_server(cmd).await,
        Command::Migrate(action) => run_migrations(action).await,
        Command::Seed => run_seed().await,
        Command::TokenIssue { user } => token_issue(user).await,
    };
    shutdown_tracing();
    outcome
}

async fn setup_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::from_env();
    connect(&settings).await.map_err(Into::into)
}

async fn run_server(cmd: ServeCommand) -> Result<()> {
    let config = Arc::new(AppConfig::load()?);
    let db = setup_pool().await?;
    ensure_migrations(&db, cmd.allow_dirty).await?;
    http::serve(cmd.bind, AppState { db, config }).await
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "{} pending migration(s); run `pawpal-server migrate up` or pass --allow-dirty",
            pending.len()
        );
    }
    Ok(())
}

async fn run_migrations(action: MigrateCommand) -> Result<()> {
    let pool = setup_pool().await?;
    match action {
        MigrateCommand::Up => {
            Migrator::up(&pool, None).await?;
            info!("database migrations applied");
        }
        MigrateCommand::Down => {
            Migrator::down(&pool, Some(1)).await?;
            info!("most recent migration rolled back");
        }
        MigrateCommand::Reset => {
            Migrator::reset(&pool).await?;
            Migrator::up(&pool, None).await?;
            info!("database reset and migrations reapplied");
        }
    }
    Ok(())
}

async fn run_seed() -> Result<()> {
    let pool = setup_pool().await?;
    ensure_migrations(&pool, false).await?;
    let seeded = seed_demo(&pool).await.context("seeding demo data")?;
    for user in &seeded.users {
        info!(user_id = %user.id, email = %user.email, role = user.role.as_str(), "seeded user");
        println!("{}\t{}\t{}", user.id, user.role.as_str(), user.email);
    }
    for activity in &seeded.activities {
        info!(activity_id = %activity.id, title = %activity.title, "seeded activity");
    }
    Ok(())
}

async fn token_issue(user_id: Uuid) -> Result<()> {
    let config = AppConfig::load()?;
    let pool = setup_pool().await?;
    let user = active_user(&pool, user_id)
        .await?
        .with_context(|| format!("no active user {user_id}"))?;
    let token = issue_token(user.id, user.role, &config.auth)?;
    println!("{token}");
    Ok(())
}
