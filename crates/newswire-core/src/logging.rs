//! Structured logging schema and field name constants for newswire.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, per-run completions |
//! | DEBUG | Decision points, cache hits/misses, config choices |
//! | TRACE | Per-item iteration (feed items, batch rows) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "feed", "db", "cache", "inference", "jobs", "service"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "parser", "ingestion", "backfill", "read_cache", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "process_feed", "embed_batch", "invalidate", "newest"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Feed URL being fetched or parsed.
pub const FEED_URL: &str = "feed_url";

/// Feed-list source identifier (file name or tag).
pub const SOURCE: &str = "source";

/// Organization name.
pub const ORGANIZATION: &str = "organization";

/// Article UUID being operated on.
pub const ARTICLE_ID: &str = "article_id";

/// Cache key touched by an operation.
pub const CACHE_KEY: &str = "cache_key";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of feed items found in a document.
pub const ITEM_COUNT: &str = "item_count";

/// Number of rows inserted by a bulk operation.
pub const INSERTED_COUNT: &str = "inserted_count";

/// Size of an embedding batch.
pub const BATCH_SIZE: &str = "batch_size";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Cache outcome ("hit" / "miss").
pub const CACHE_OUTCOME: &str = "cache_outcome";
