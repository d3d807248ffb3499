//! Core traits for newswire abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability. The database layer
//! implements the repository traits against Postgres; jobs and services only
//! ever see the trait objects, so tests run against in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

/// Repository for organization persistence.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Insert a new organization.
    async fn insert(&self, req: CreateOrganizationRequest) -> Result<Organization>;

    /// Look up an organization by exact (case-sensitive) name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Organization>>;

    /// Find the organization with the given name, creating it when absent.
    async fn get_or_create(&self, req: CreateOrganizationRequest) -> Result<Organization>;

    /// List all organizations.
    async fn list(&self) -> Result<Vec<Organization>>;

    /// Delete an organization and all of its articles in one transaction.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Repository for article persistence and queries.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert a single article. A duplicate link yields `Error::Conflict`.
    async fn insert(&self, req: CreateArticleRequest) -> Result<Article>;

    /// Insert many articles in one transaction with conflict-tolerant
    /// semantics: rows whose link already exists are silently skipped.
    /// Returns the number of rows actually inserted.
    async fn insert_bulk(&self, reqs: Vec<CreateArticleRequest>) -> Result<usize>;

    /// Whether an article with this exact link exists.
    async fn exists_by_link(&self, link: &str) -> Result<bool>;

    /// Fetch an article by link.
    async fn find_by_link(&self, link: &str) -> Result<Option<Article>>;

    /// Select up to `limit` articles without an embedding, ordered by id
    /// ascending so consecutive batches make forward progress.
    async fn select_unembedded(&self, limit: i64) -> Result<Vec<Article>>;

    /// Store embeddings for the given articles in a single transaction.
    /// Either all updates commit or none do.
    async fn store_embeddings(&self, updates: Vec<(Uuid, Vector)>) -> Result<()>;

    /// Newest articles: publication date descending, id descending as the
    /// tiebreak. Optional case-insensitive organization-name filter.
    async fn newest(&self, organization_name: Option<&str>, limit: i64) -> Result<Vec<Article>>;

    /// Case-insensitive substring search over headline, summary, description
    /// and content, newest ordering, optionally scoped to one organization.
    async fn search(
        &self,
        text: &str,
        organization_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<Article>>;

    /// Nearest articles by embedding distance, ascending. Excludes articles
    /// without an embedding and, when given, the source article itself.
    /// Optional case-insensitive organization-name filter.
    async fn find_similar(
        &self,
        query: &Vector,
        exclude_id: Option<Uuid>,
        organization_name: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Article>>;

    /// Articles published at or after `cutoff`, newest ordering.
    async fn published_since(
        &self,
        cutoff: DateTime<Utc>,
        organization_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<Article>>;

    /// All articles belonging to an organization.
    async fn list_for_organization(&self, organization_id: Uuid) -> Result<Vec<Article>>;

    /// Total and missing-embedding counts.
    async fn counts(&self) -> Result<ArticleCounts>;

    /// Delete one article. `Error::ArticleNotFound` when absent.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Delete all articles, returning the number removed.
    async fn delete_all(&self) -> Result<u64>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for embedding generation.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns one vector per input text; transport failures and empty
    /// responses surface as `Error::Provider`.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
