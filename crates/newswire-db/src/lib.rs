//! # newswire-db
//!
//! PostgreSQL + pgvector persistence layer for newswire.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for organizations and articles
//! - Idempotent bulk article insertion (`ON CONFLICT (link) DO NOTHING`)
//! - Vector similarity queries with pgvector
//!
//! ## Example
//!
//! ```rust,ignore
//! use newswire_db::Database;
//! use newswire_core::ArticleRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/newswire").await?;
//!     let counts = db.articles.counts().await?;
//!     println!("{} articles, {} unembedded", counts.total, counts.missing_embedding);
//!     Ok(())
//! }
//! ```

pub mod articles;
pub mod organizations;
pub mod pool;

// Re-export core types
pub use newswire_core::*;

pub use articles::{escape_like, PgArticleRepository};
pub use organizations::PgOrganizationRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};

use std::sync::Arc;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Organization repository.
    pub organizations: Arc<PgOrganizationRepository>,
    /// Article repository.
    pub articles: Arc<PgArticleRepository>,
}

impl Database {
    /// Connect with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::from_pool(pool))
    }

    /// Build the repository set around an existing pool.
    pub fn from_pool(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            organizations: Arc::new(PgOrganizationRepository::new(pool.clone())),
            articles: Arc::new(PgArticleRepository::new(pool.clone())),
            pool,
        }
    }

    /// Apply the reference schema. Intended for local development and
    /// integration tests; production schema management is external.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(include_str!("schema.sql"))
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            organizations: self.organizations.clone(),
            articles: self.articles.clone(),
        }
    }
}
