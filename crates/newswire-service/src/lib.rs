//! # newswire-service
//!
//! The read and mutation surface of newswire, sitting between the route
//! layer and the repositories:
//!
//! - Cache-aside reads (newest, search, similar, organization-by-slug,
//!   day summaries) with content-addressed keys
//! - Negative caching for organization-slug misses
//! - Mutations that fire the matching cache invalidation hooks
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use newswire_cache::ReadCache;
//! use newswire_service::NewsService;
//!
//! let db = newswire_db::Database::connect(&url).await?;
//! let backend = Arc::new(newswire_inference::OllamaBackend::from_env()?);
//! let cache = ReadCache::from_env().await;
//!
//! let service = NewsService::new(
//!     db.organizations.clone(),
//!     db.articles.clone(),
//!     backend.clone(),
//!     backend,
//!     cache,
//! );
//!
//! let newest = service.newest_articles(None).await?;
//! println!("{} articles ({:?})", newest.value.len(), newest.outcome);
//! ```

pub mod reads;
pub mod service;
pub mod summary;

pub use reads::Cached;
pub use service::NewsService;

// Re-export the cache outcome so callers don't need newswire-cache.
pub use newswire_cache::CacheOutcome;
