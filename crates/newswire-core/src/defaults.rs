//! Centralized default constants for the newswire system.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// INGESTION
// =============================================================================

/// HTTP timeout for feed fetches, in seconds.
pub const FEED_FETCH_TIMEOUT_SECS: u64 = 20;

/// Fixed user agent sent with every feed request.
pub const FEED_USER_AGENT: &str = concat!("newswire-ingest/", env!("CARGO_PKG_VERSION"));

/// Seconds between ingestion runs.
pub const INGEST_INTERVAL_SECS: u64 = 900;

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default embedding model name (Ollama).
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Default embedding vector dimension for nomic-embed-text.
pub const EMBED_DIMENSION: usize = 768;

/// Articles selected per backfill run.
pub const EMBED_BATCH_SIZE: i64 = 200;

/// Timeout for embedding requests (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = 120;

/// Seconds between embedding backfill runs.
pub const EMBED_INTERVAL_SECS: u64 = 300;

/// Default Ollama endpoint.
pub const OLLAMA_URL: &str = "http://localhost:11434";

/// Default generation model for day summaries.
pub const GEN_MODEL: &str = "qwen3:8b";

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// READS
// =============================================================================

/// Result limit for newest/search/similar queries.
pub const READ_LIMIT: i64 = 10;

/// Articles included in an unfiltered day summary prompt.
pub const DAY_SUMMARY_LIMIT: i64 = 30;

/// Snippet cap per article inside a day summary prompt, in characters.
pub const DAY_SUMMARY_SNIPPET_LEN: usize = 600;

/// Look-back window for day summaries, in hours.
pub const DAY_SUMMARY_WINDOW_HOURS: i64 = 24;

// =============================================================================
// CACHE TTLS (seconds)
// =============================================================================

/// Positive organization-by-slug entries.
pub const CACHE_TTL_ORGANIZATION_SECS: u64 = 3600;

/// Negative organization-by-slug entries (sentinel). Deliberately shorter
/// than the positive TTL so a newly created organization becomes visible
/// quickly.
pub const CACHE_TTL_ORGANIZATION_MISS_SECS: u64 = 300;

/// Newest-articles entries.
pub const CACHE_TTL_NEWEST_SECS: u64 = 300;

/// Search-result entries.
pub const CACHE_TTL_SEARCH_SECS: u64 = 300;

/// Similar-articles entries.
pub const CACHE_TTL_SIMILAR_SECS: u64 = 600;

/// Day-summary entries.
pub const CACHE_TTL_DAY_SUMMARY_SECS: u64 = 1800;
