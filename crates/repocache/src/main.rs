use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use repocache::config::Config;
use repocache::state::{connect_store, AppState};
use repocache_core::cache::namespace_pattern;
use repocache_core::storage::{Entity, PageRequest, Repository, UserRepository};
use repocache_core::user::{User, UserFilter};

/// repocache - Cache-aside decorators for CRUD repositories
#[derive(Parser, Debug)]
#[command(name = "repocache")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Run a create/read/update/read walkthrough against the cached user repository.
    Demo(DemoCommand),

    /// Remove every cache key matching a glob pattern.
    Flush(FlushCommand),
}

#[derive(Debug, clap::Args)]
struct DemoCommand {
    /// Email of the demo user before the update.
    #[arg(long, default_value = "a@x.com")]
    email: String,

    /// Email of the demo user after the update.
    #[arg(long, default_value = "b@x.com")]
    new_email: String,
}

#[derive(Debug, clap::Args)]
#[command(long_about = "Remove every cache key matching a glob pattern.

Cached payloads carry no schema version, so a change to an entity's shape
must be followed by a flush of its namespace (e.g. 'user:*').

Environment variables:
  REDIS_URL    - Redis connection URL (redis builds only)")]
struct FlushCommand {
    /// Glob pattern of keys to remove. Defaults to the whole user namespace.
    #[arg(long, short, env = "CACHE_FLUSH_PATTERN")]
    pattern: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repocache=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    match cli.command {
        Command::Demo(cmd) => demo(&config, cmd).await,
        Command::Flush(cmd) => flush(&config, cmd).await,
    }
}

async fn demo(config: &Config, cmd: DemoCommand) -> Result<()> {
    let state = AppState::new(config).await?;
    let users = &state.users;

    let id = Uuid::now_v7();
    let created = users.add(&User::new(&cmd.email, "demo").with_id(id)).await?;
    tracing::info!(id = %created.id, email = %created.email, "Created user");

    // Cold read, then warm read
    users.get_by_id(id, false).await?;
    let Some(user) = users.get_by_id(id, false).await? else {
        bail!("user {id} vanished");
    };

    let Some(updated) = users.update(&user.with_email(&cmd.new_email)).await? else {
        bail!("user {id} vanished during update");
    };
    tracing::info!(id = %updated.id, email = %updated.email, "Updated user");

    let refreshed = users.get_by_id(id, false).await?;
    tracing::info!(email = ?refreshed.map(|u| u.email), "Read after update");

    let stale = users.get_by_email(&cmd.email).await?;
    tracing::info!(email = %cmd.email, found = stale.is_some(), "Lookup by previous email");

    let filter = UserFilter {
        email: Some(cmd.new_email.clone()),
        ..Default::default()
    };
    let matches = users.find(&filter, PageRequest::default()).await?;
    tracing::info!(count = matches.len(), "Search (uncached)");

    match state.metrics() {
        Some(snapshot) => {
            let json = serde_json::to_string(&snapshot)?;
            tracing::info!(metrics = %json, hit_rate = snapshot.hit_rate(), "Cache metrics");
        }
        None => tracing::info!("Cache disabled, no metrics"),
    }

    Ok(())
}

async fn flush(config: &Config, cmd: FlushCommand) -> Result<()> {
    let pattern = cmd
        .pattern
        .unwrap_or_else(|| namespace_pattern(User::CACHE_PREFIX));

    let store = connect_store(config).await?;
    let removed = store.clear_pattern(&pattern).await;

    if store.metrics().snapshot().errors > 0 {
        bail!("cache flush of '{pattern}' failed, see logs");
    }

    tracing::info!(pattern = %pattern, removed, "Cache flushed");
    Ok(())
}
