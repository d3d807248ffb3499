//! # newswire-jobs
//!
//! Background jobs for newswire:
//!
//! - Feed ingestion: fetch and parse every configured feed, dedup against
//!   the store with an early-stop scan, bulk-insert what's new.
//! - Embedding backfill: batch-embed articles that have no vector yet,
//!   single-flight per job instance.
//! - A tokio-interval scheduler driving both.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use newswire_jobs::{BackfillJob, IngestionJob, Scheduler, SchedulerConfig};
//! use newswire_feed::feed_lists_from_env;
//!
//! let db = newswire_db::Database::connect(&url).await?;
//! let backend = Arc::new(newswire_inference::OllamaBackend::from_env()?);
//!
//! let ingestion = Arc::new(IngestionJob::new(
//!     db.organizations.clone(),
//!     db.articles.clone(),
//!     feed_lists_from_env(std::path::Path::new(".")),
//! )?);
//! let backfill = Arc::new(BackfillJob::new(db.articles.clone(), backend));
//!
//! let handle = Scheduler::new(ingestion, backfill, SchedulerConfig::from_env()).start();
//! // ...
//! handle.shutdown().await?;
//! ```

pub mod cancel;
pub mod embedding;
pub mod ingestion;
pub mod scheduler;

pub use cancel::Cancel;
pub use embedding::BackfillJob;
pub use ingestion::IngestionJob;
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerHandle};

// Re-export the report types jobs emit.
pub use newswire_core::{BackfillReport, IngestionReport, TriggerOutcome};
