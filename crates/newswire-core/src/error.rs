//! Error types for newswire.

use thiserror::Error;

/// Result type alias using newswire's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for newswire operations.
///
/// Scope of each variant follows the ingestion failure model: `Network` and
/// `Parse` are absorbed per feed, `Conflict` is treated as already-ingested,
/// `Provider` leaves state unchanged for the next scheduled run, and
/// `Database` aborts the current batch. Cache failures never appear here;
/// the cache port degrades them to misses internally.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Feed fetch failed (network error or non-success status)
    #[error("Network error: {0}")]
    Network(String),

    /// Feed document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unique-constraint conflict (duplicate article link)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Organization not found by slug or name
    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    /// Article not found by link or id
    #[error("Article not found: {0}")]
    ArticleNotFound(String),

    /// Embedding or generation provider call failed
    #[error("Provider error: {0}")]
    Provider(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is recoverable at feed scope: the current feed is
    /// skipped and the remaining feeds of the source continue.
    pub fn is_feed_recoverable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Parse(_) | Error::Conflict(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_network() {
        let err = Error::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_error_display_parse() {
        let err = Error::Parse("unexpected end of document".to_string());
        assert_eq!(err.to_string(), "Parse error: unexpected end of document");
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("duplicate link".to_string());
        assert_eq!(err.to_string(), "Conflict: duplicate link");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::OrganizationNotFound("the-verge".to_string());
        assert_eq!(err.to_string(), "Organization not found: the-verge");
    }

    #[test]
    fn test_error_display_provider() {
        let err = Error::Provider("embeddings response was empty".to_string());
        assert_eq!(
            err.to_string(),
            "Provider error: embeddings response was empty"
        );
    }

    #[test]
    fn test_feed_recoverable_classification() {
        assert!(Error::Network("timeout".into()).is_feed_recoverable());
        assert!(Error::Parse("bad xml".into()).is_feed_recoverable());
        assert!(Error::Conflict("link".into()).is_feed_recoverable());
        assert!(!Error::Provider("down".into()).is_feed_recoverable());
        assert!(!Error::Config("missing url".into()).is_feed_recoverable());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().starts_with("Serialization error:"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
