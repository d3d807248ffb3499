//! Embedding backfill job.
//!
//! Fills in the `embedding` column for articles that don't have one yet, in
//! batches ordered by id ascending so consecutive runs make forward
//! progress. At most one run is in flight per job instance: overlapping
//! triggers are dropped, not queued.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use newswire_core::{
    defaults, ArticleRepository, BackfillReport, EmbeddingBackend, Result, TriggerOutcome,
};

use crate::cancel::Cancel;

/// The embedding backfill job.
pub struct BackfillJob {
    articles: Arc<dyn ArticleRepository>,
    backend: Arc<dyn EmbeddingBackend>,
    batch_size: i64,
    /// One permit. `try_acquire` makes triggers single-flight.
    running: Semaphore,
}

impl BackfillJob {
    pub fn new(articles: Arc<dyn ArticleRepository>, backend: Arc<dyn EmbeddingBackend>) -> Self {
        let batch_size = std::env::var("NEWSWIRE_EMBED_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults::EMBED_BATCH_SIZE);

        Self {
            articles,
            backend,
            batch_size,
            running: Semaphore::new(1),
        }
    }

    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Trigger one backfill run.
    ///
    /// Returns `Skipped` without touching the store when a run is already
    /// in flight on this instance. A fired cancellation signal skips the
    /// batch entirely; the selection is batch-scoped, so nothing is lost.
    pub async fn trigger(&self, cancel: &Cancel) -> Result<TriggerOutcome<BackfillReport>> {
        let _permit = match self.running.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                info!(
                    subsystem = "jobs",
                    component = "backfill",
                    "Backfill already running, trigger dropped"
                );
                return Ok(TriggerOutcome::Skipped);
            }
        };

        let report = self.run(cancel).await?;
        Ok(TriggerOutcome::Ran(report))
    }

    async fn run(&self, cancel: &Cancel) -> Result<BackfillReport> {
        if cancel.is_cancelled() {
            info!(
                subsystem = "jobs",
                component = "backfill",
                "Shutdown requested, leaving the batch for the next run"
            );
            return Ok(BackfillReport::default());
        }

        let started = Instant::now();
        let batch = self.articles.select_unembedded(self.batch_size).await?;

        let mut report = BackfillReport {
            attempted: batch.len(),
            ..Default::default()
        };

        if batch.is_empty() {
            debug!(
                subsystem = "jobs",
                component = "backfill",
                "No articles awaiting embeddings"
            );
            return Ok(report);
        }

        // Articles with no embeddable text stay unembedded and will be
        // reselected next run.
        let mut ids = Vec::new();
        let mut texts = Vec::new();
        for article in &batch {
            match article.embedding_text() {
                Some(text) => {
                    ids.push(article.id);
                    texts.push(text);
                }
                None => report.skipped += 1,
            }
        }

        if texts.is_empty() {
            return Ok(report);
        }

        let vectors = match self.backend.embed_texts(&texts).await {
            Ok(vectors) => vectors,
            Err(e) => {
                warn!(
                    subsystem = "jobs",
                    component = "backfill",
                    batch_size = texts.len(),
                    error = %e,
                    "Embedding provider call failed, batch left for retry"
                );
                report.failed = texts.len();
                return Ok(report);
            }
        };

        let expected = self.backend.dimension();
        for vector in &vectors {
            if vector.as_slice().len() != expected {
                warn!(
                    subsystem = "jobs",
                    component = "backfill",
                    expected_dimension = expected,
                    actual_dimension = vector.as_slice().len(),
                    "Embedding dimension differs from configuration, storing anyway"
                );
                break;
            }
        }

        let updates: Vec<_> = ids.into_iter().zip(vectors).collect();
        report.updated = updates.len();
        self.articles.store_embeddings(updates).await?;

        info!(
            subsystem = "jobs",
            component = "backfill",
            duration_ms = started.elapsed().as_millis() as u64,
            attempted = report.attempted,
            updated = report.updated,
            failed = report.failed,
            skipped = report.skipped,
            "Backfill run finished"
        );
        Ok(report)
    }
}
