//! Core data models for newswire.
//!
//! These types are shared across all newswire crates and represent the
//! core domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use pgvector::Vector;

// =============================================================================
// ORGANIZATION TYPES
// =============================================================================

/// A news organization owning one or more feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// Display name; exact-match key for feed-to-org resolution,
    /// case-insensitive for read filtering.
    pub name: String,
    /// Canonical site URL.
    pub url: String,
}

/// Request to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub url: String,
}

// =============================================================================
// ARTICLE TYPES
// =============================================================================

/// A single ingested news article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// UUIDv7: embeds creation time, so `id DESC` is a stable tiebreaker
    /// for newest-first ordering.
    pub id: Uuid,
    /// Externally unique link; natural idempotency key for ingestion.
    pub link: String,
    /// Owning organization; nulled when the organization is deleted.
    pub organization_id: Option<Uuid>,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    /// Semantic embedding; absent until the backfill job computes it.
    /// Either the full vector or absent, never partial.
    #[serde(skip)]
    pub embedding: Option<Vector>,
}

/// Request to create a new article (ingestion or explicit creation).
#[derive(Debug, Clone)]
pub struct CreateArticleRequest {
    pub link: String,
    pub organization_id: Option<Uuid>,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
}

impl Article {
    /// Build the text embedded for this article: headline, description and
    /// summary joined with blank lines, absent fields skipped.
    ///
    /// Returns `None` when no field carries text; such articles are never
    /// sent to the embedding provider.
    pub fn embedding_text(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.headline, &self.description, &self.summary]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

/// Article counts exposed for observability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArticleCounts {
    pub total: i64,
    pub missing_embedding: i64,
}

// =============================================================================
// FEED TYPES
// =============================================================================

/// One normalized feed entry, extracted from an `item` or `entry` container.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    /// Absolute link; items without a resolvable link are dropped upstream.
    pub link: String,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
}

/// A resolved feed source: the organization definition plus its feed URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDefinition {
    pub name: String,
    pub url: String,
}

// =============================================================================
// JOB REPORT TYPES
// =============================================================================

/// Per-run counters emitted by the ingestion pipeline.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IngestionReport {
    /// Source lists processed.
    pub sources: usize,
    /// Feeds fetched and parsed successfully.
    pub feeds_ok: usize,
    /// Feeds skipped after a fetch or parse failure.
    pub feeds_failed: usize,
    /// New articles inserted across all feeds.
    pub inserted: usize,
}

/// Per-run counters emitted by the embedding backfill job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Articles selected for this batch.
    pub attempted: usize,
    /// Articles whose embedding was stored.
    pub updated: usize,
    /// Articles where the provider call failed; retried next run.
    pub failed: usize,
    /// Articles with no text to embed; left absent and reselected next run.
    pub skipped: usize,
}

/// Outcome of a job trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome<R> {
    /// The job ran to completion.
    Ran(R),
    /// Another invocation was already in flight; this trigger was dropped.
    Skipped,
}

impl<R> TriggerOutcome<R> {
    pub fn ran(&self) -> Option<&R> {
        match self {
            TriggerOutcome::Ran(r) => Some(r),
            TriggerOutcome::Skipped => None,
        }
    }
}
