//! Interval scheduler for the background jobs.
//!
//! Fires the ingestion and backfill jobs on independent fixed intervals.
//! Job errors are logged and the loop keeps going. A shutdown signal stops
//! the loop and winds an in-flight run down at its next feed or batch
//! boundary.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use newswire_core::{defaults, Result};

use crate::cancel::Cancel;
use crate::embedding::BackfillJob;
use crate::ingestion::IngestionJob;

/// Scheduler intervals.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub ingest_interval: Duration,
    pub embed_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            ingest_interval: Duration::from_secs(defaults::INGEST_INTERVAL_SECS),
            embed_interval: Duration::from_secs(defaults::EMBED_INTERVAL_SECS),
        }
    }
}

impl SchedulerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `NEWSWIRE_INGEST_INTERVAL_SECS` | `900` | Seconds between ingestion runs |
    /// | `NEWSWIRE_EMBED_INTERVAL_SECS` | `300` | Seconds between backfill runs |
    pub fn from_env() -> Self {
        let ingest_secs = std::env::var("NEWSWIRE_INGEST_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults::INGEST_INTERVAL_SECS);

        let embed_secs = std::env::var("NEWSWIRE_EMBED_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults::EMBED_INTERVAL_SECS);

        Self {
            ingest_interval: Duration::from_secs(ingest_secs),
            embed_interval: Duration::from_secs(embed_secs),
        }
    }
}

/// Handle for stopping a running scheduler.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl SchedulerHandle {
    /// Signal the scheduler to shut down. An in-flight run stops at its
    /// next feed or batch boundary.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(true)
            .map_err(|_| newswire_core::Error::Config("scheduler already stopped".to_string()))?;
        Ok(())
    }
}

/// Drives the two background jobs on their intervals.
pub struct Scheduler {
    ingestion: Arc<IngestionJob>,
    backfill: Arc<BackfillJob>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        ingestion: Arc<IngestionJob>,
        backfill: Arc<BackfillJob>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            ingestion,
            backfill,
            config,
        }
    }

    /// Start the scheduler loop on a background task.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, cancel) = Cancel::channel();

        tokio::spawn(async move {
            self.run(cancel).await;
        });

        SchedulerHandle { shutdown_tx }
    }

    async fn run(&self, cancel: Cancel) {
        info!(
            subsystem = "jobs",
            component = "scheduler",
            ingest_interval_secs = self.config.ingest_interval.as_secs(),
            embed_interval_secs = self.config.embed_interval.as_secs(),
            "Scheduler started"
        );

        let mut ingest_tick = interval(self.config.ingest_interval);
        let mut embed_tick = interval(self.config.embed_interval);
        ingest_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        embed_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut shutdown = cancel.clone();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(
                        subsystem = "jobs",
                        component = "scheduler",
                        "Scheduler received shutdown signal"
                    );
                    break;
                }
                _ = ingest_tick.tick() => {
                    if let Err(e) = self.ingestion.run(&cancel).await {
                        error!(
                            subsystem = "jobs",
                            component = "scheduler",
                            error = %e,
                            "Ingestion run failed"
                        );
                    }
                }
                _ = embed_tick.tick() => {
                    if let Err(e) = self.backfill.trigger(&cancel).await {
                        error!(
                            subsystem = "jobs",
                            component = "scheduler",
                            error = %e,
                            "Backfill run failed"
                        );
                    }
                }
            }
        }
    }
}
