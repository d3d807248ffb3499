//! newswired - background ingestion daemon for newswire
//!
//! Connects to Postgres, wires the ingestion and embedding jobs, and runs
//! the interval scheduler until SIGINT.

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newswire_feed::feed_lists_from_env;
use newswire_inference::OllamaBackend;
use newswire_jobs::{BackfillJob, IngestionJob, Scheduler, SchedulerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "newswire=debug,info")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "newswire=debug,info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/newswire".to_string());
    let feed_root = std::env::var("NEWSWIRE_FEED_ROOT").unwrap_or_else(|_| ".".to_string());

    let db = newswire_db::Database::connect(&database_url).await?;
    db.ensure_schema().await?;
    info!(subsystem = "daemon", "Database ready");

    let backend = Arc::new(OllamaBackend::from_env());

    let lists = feed_lists_from_env(Path::new(&feed_root));
    anyhow::ensure!(!lists.is_empty(), "no feed lists configured");
    info!(subsystem = "daemon", list_count = lists.len(), "Feed lists resolved");

    let ingestion = Arc::new(IngestionJob::new(
        db.organizations.clone(),
        db.articles.clone(),
        lists,
    )?);
    let backfill = Arc::new(BackfillJob::new(db.articles.clone(), backend));

    let handle = Scheduler::new(ingestion, backfill, SchedulerConfig::from_env()).start();
    info!(subsystem = "daemon", "Scheduler running, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!(subsystem = "daemon", "Shutting down");
    handle.shutdown().await?;

    Ok(())
}
