//! # newswire-cache
//!
//! Redis-backed cache-aside layer for newswire reads.
//!
//! The cache is always best-effort: every backend failure is logged and
//! degraded to miss/no-op behavior, so cache unavailability can never
//! surface as a request failure. Parameterized key families (`newest`,
//! `search`, `similar`) additionally record every written key in a
//! per-family registry set, which article mutations flush wholesale.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `REDIS_ENABLED`: set to "false" to disable caching (default: true)
//! - `REDIS_URL`: Redis connection URL (default: redis://localhost:6379)

pub mod keys;

use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub use keys::{
    day_summary_key, newest_key, organization_slug_key, search_key, similar_key, Family,
    NULL_SENTINEL,
};

/// Per-operation deadline, much shorter than the primary store's timeouts.
/// A slow cache must degrade to a miss, not stall the read path.
const OP_TIMEOUT: Duration = Duration::from_millis(500);

async fn bounded<T>(
    op: impl std::future::Future<Output = redis::RedisResult<T>>,
) -> redis::RedisResult<T> {
    match tokio::time::timeout(OP_TIMEOUT, op).await {
        Ok(result) => result,
        Err(_) => Err(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "cache operation timed out",
        ))),
    }
}

/// Whether a cacheable read was served from the cache. Reported to the
/// caller of every cacheable operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

impl CacheOutcome {
    pub fn is_hit(self) -> bool {
        matches!(self, CacheOutcome::Hit)
    }
}

/// Raw result of a cache lookup that distinguishes the negative sentinel
/// from both a real value and a miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue<T> {
    /// A valid cached payload.
    Value(T),
    /// The negative-result sentinel was cached for this key.
    NegativeSentinel,
    /// Nothing cached (or cache unavailable).
    Absent,
}

/// Best-effort read cache backed by Redis.
#[derive(Clone)]
pub struct ReadCache {
    inner: Arc<ReadCacheInner>,
}

struct ReadCacheInner {
    /// Redis connection manager (None if disabled or unreachable).
    connection: RwLock<Option<ConnectionManager>>,
}

impl ReadCache {
    /// Create a cache from environment configuration. Connection failures
    /// disable the cache rather than erroring; the system then behaves as
    /// if every read were a miss.
    pub async fn from_env() -> Self {
        let enabled = std::env::var("REDIS_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let connection = if enabled {
            match redis::Client::open(redis_url.as_str()) {
                Ok(client) => match ConnectionManager::new(client).await {
                    Ok(conn) => {
                        info!(
                            subsystem = "cache",
                            component = "read_cache",
                            "Redis read cache enabled"
                        );
                        Some(conn)
                    }
                    Err(e) => {
                        warn!(
                            subsystem = "cache",
                            component = "read_cache",
                            error = %e,
                            "Failed to connect to Redis, cache disabled"
                        );
                        None
                    }
                },
                Err(e) => {
                    warn!(
                        subsystem = "cache",
                        component = "read_cache",
                        error = %e,
                        "Invalid Redis URL, cache disabled"
                    );
                    None
                }
            }
        } else {
            info!(
                subsystem = "cache",
                component = "read_cache",
                "Redis read cache disabled via REDIS_ENABLED=false"
            );
            None
        };

        Self {
            inner: Arc::new(ReadCacheInner {
                connection: RwLock::new(connection),
            }),
        }
    }

    /// Create a disabled cache (for testing or when Redis is unavailable).
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(ReadCacheInner {
                connection: RwLock::new(None),
            }),
        }
    }

    /// Check whether the cache holds a live connection.
    pub async fn is_connected(&self) -> bool {
        self.inner.connection.read().await.is_some()
    }

    /// Clone the connection manager out of the lock; it multiplexes
    /// concurrent operations internally.
    async fn manager(&self) -> Option<ConnectionManager> {
        self.inner.connection.read().await.clone()
    }

    /// Get a cached JSON payload. Deserialization failures and backend
    /// errors are both treated as misses.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.lookup::<T>(key).await {
            CachedValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Get a cached payload, distinguishing the negative sentinel from an
    /// ordinary miss. Used by negative-cached lookups (organization slug).
    pub async fn lookup<T: DeserializeOwned>(&self, key: &str) -> CachedValue<T> {
        let Some(mut conn) = self.manager().await else {
            return CachedValue::Absent;
        };

        match bounded(conn.get::<_, Option<String>>(key)).await {
            Ok(Some(data)) if data == NULL_SENTINEL => {
                debug!(
                    subsystem = "cache",
                    component = "read_cache",
                    cache_key = key,
                    cache_outcome = "hit",
                    "Negative sentinel hit"
                );
                CachedValue::NegativeSentinel
            }
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(value) => {
                    debug!(
                        subsystem = "cache",
                        component = "read_cache",
                        cache_key = key,
                        cache_outcome = "hit",
                        "Cache hit"
                    );
                    CachedValue::Value(value)
                }
                Err(e) => {
                    warn!(
                        subsystem = "cache",
                        component = "read_cache",
                        cache_key = key,
                        error = %e,
                        "Cache deserialization error, treating as miss"
                    );
                    CachedValue::Absent
                }
            },
            Ok(None) => {
                debug!(
                    subsystem = "cache",
                    component = "read_cache",
                    cache_key = key,
                    cache_outcome = "miss",
                    "Cache miss"
                );
                CachedValue::Absent
            }
            Err(e) => {
                warn!(
                    subsystem = "cache",
                    component = "read_cache",
                    cache_key = key,
                    error = %e,
                    "Redis GET error, treating as miss"
                );
                CachedValue::Absent
            }
        }
    }

    /// Store a JSON payload with a TTL. Returns whether the write landed.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                warn!(
                    subsystem = "cache",
                    component = "read_cache",
                    cache_key = key,
                    error = %e,
                    "Cache serialization error, skipping write"
                );
                return false;
            }
        };
        self.set_raw(key, &serialized, ttl).await
    }

    /// Store the negative-result sentinel under a key.
    pub async fn set_negative(&self, key: &str, ttl: Duration) -> bool {
        self.set_raw(key, NULL_SENTINEL, ttl).await
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> bool {
        let Some(mut conn) = self.manager().await else {
            return false;
        };

        match bounded(conn.set_ex::<_, _, ()>(key, value, ttl.as_secs())).await {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    subsystem = "cache",
                    component = "read_cache",
                    cache_key = key,
                    error = %e,
                    "Redis SET error, skipping write"
                );
                false
            }
        }
    }

    /// Store a family payload under a registered key. The registry write
    /// comes first: a cached entry must never outlive its registration, or
    /// a family flush would miss it for the rest of its TTL. A registered
    /// key whose payload write then fails is only a stale registry member
    /// and is cleared by the next flush.
    pub async fn set_in_family<T: Serialize>(
        &self,
        family: Family,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> bool {
        let Some(mut conn) = self.manager().await else {
            return false;
        };

        if let Err(e) = bounded(conn.sadd::<_, _, ()>(family.registry(), key)).await {
            warn!(
                subsystem = "cache",
                component = "read_cache",
                cache_key = key,
                error = %e,
                "Redis SADD error, skipping family write"
            );
            return false;
        }

        self.set_json(key, value, ttl).await
    }

    /// Delete specific keys.
    pub async fn delete(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        let Some(mut conn) = self.manager().await else {
            return;
        };

        if let Err(e) = bounded(conn.del::<_, ()>(keys)).await {
            warn!(
                subsystem = "cache",
                component = "read_cache",
                error = %e,
                "Redis DEL error"
            );
        }
    }

    /// Flush one family: delete every key in its registry, then the
    /// registry itself. The registry approximates the set of live keys; a
    /// full-family flush favors correctness over hit rate.
    pub async fn invalidate_family(&self, family: Family) {
        let Some(mut conn) = self.manager().await else {
            return;
        };

        let mut keys: Vec<String> = match bounded(conn.smembers(family.registry())).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(
                    subsystem = "cache",
                    component = "read_cache",
                    error = %e,
                    "Redis SMEMBERS error, skipping family flush"
                );
                return;
            }
        };

        // The no-filter newest key is flushed unconditionally, registered
        // or not.
        if family == Family::Newest {
            keys.push(keys::newest_key(None));
        }
        keys.push(family.registry().to_string());

        if let Err(e) = bounded(conn.del::<_, ()>(&keys)).await {
            warn!(
                subsystem = "cache",
                component = "read_cache",
                error = %e,
                "Redis DEL error during family flush"
            );
            return;
        }

        debug!(
            subsystem = "cache",
            component = "read_cache",
            op = "invalidate",
            result_count = keys.len(),
            "Flushed cache family"
        );
    }

    /// Invalidate every article-derived family. Fired after any article
    /// mutation (create, delete, bulk delete, cascade).
    pub async fn invalidate_articles(&self) {
        for family in Family::ALL {
            self.invalidate_family(family).await;
        }
    }

    /// Invalidate a cached organization-by-slug entry (positive or
    /// sentinel) after the organization changes.
    pub async fn invalidate_organization_slug(&self, slug_or_name: &str) {
        let normalized = newswire_core::slugify(slug_or_name);
        if normalized.is_empty() {
            return;
        }
        self.delete(&[keys::organization_slug_key(&normalized)]).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A disabled cache must behave exactly like an empty one: reads miss,
    // writes report failure, invalidation is a no-op. This is the
    // degradation contract every caller relies on.
    #[tokio::test]
    async fn test_disabled_cache_reads_are_absent() {
        let cache = ReadCache::disabled();
        assert!(!cache.is_connected().await);
        assert_eq!(
            cache.lookup::<String>("articles:newest:abc").await,
            CachedValue::Absent
        );
        assert!(cache.get_json::<String>("any").await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_cache_writes_report_false() {
        let cache = ReadCache::disabled();
        let ttl = Duration::from_secs(60);
        assert!(!cache.set_json("k", &"v", ttl).await);
        assert!(!cache.set_negative("k", ttl).await);
        assert!(!cache.set_in_family(Family::Search, "k", &"v", ttl).await);
    }

    #[tokio::test]
    async fn test_disabled_cache_invalidation_is_noop() {
        let cache = ReadCache::disabled();
        cache.invalidate_articles().await;
        cache.invalidate_organization_slug("The Verge").await;
        cache.delete(&["a".to_string()]).await;
    }

    #[test]
    fn test_cache_outcome_helpers() {
        assert!(CacheOutcome::Hit.is_hit());
        assert!(!CacheOutcome::Miss.is_hit());
    }
}
