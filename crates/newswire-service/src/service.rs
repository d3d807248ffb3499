//! The service struct, mutations, and admin operations.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use newswire_cache::ReadCache;
use newswire_core::{
    slugify, Article, ArticleCounts, ArticleRepository, CreateArticleRequest,
    CreateOrganizationRequest, EmbeddingBackend, Error, GenerationBackend, Organization,
    OrganizationRepository, Result,
};

/// Read and mutation surface over the repositories, with cache-aside reads
/// and invalidation hooks on every mutation.
pub struct NewsService {
    pub(crate) organizations: Arc<dyn OrganizationRepository>,
    pub(crate) articles: Arc<dyn ArticleRepository>,
    pub(crate) embedder: Arc<dyn EmbeddingBackend>,
    pub(crate) generator: Arc<dyn GenerationBackend>,
    pub(crate) cache: ReadCache,
}

impl NewsService {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        articles: Arc<dyn ArticleRepository>,
        embedder: Arc<dyn EmbeddingBackend>,
        generator: Arc<dyn GenerationBackend>,
        cache: ReadCache,
    ) -> Self {
        Self {
            organizations,
            articles,
            embedder,
            generator,
            cache,
        }
    }

    /// Scan all organizations for one whose recomputed slug matches.
    /// Uncached; the cached variant lives in the reads module.
    pub(crate) async fn resolve_organization_by_slug(
        &self,
        normalized: &str,
    ) -> Result<Option<Organization>> {
        let all = self.organizations.list().await?;
        Ok(all.into_iter().find(|o| slugify(&o.name) == normalized))
    }

    pub async fn list_organizations(&self) -> Result<Vec<Organization>> {
        self.organizations.list().await
    }

    pub async fn create_organization(&self, req: CreateOrganizationRequest) -> Result<Organization> {
        let organization = self.organizations.insert(req).await?;
        // A negative sentinel may be cached for this slug from before the
        // organization existed.
        self.cache.invalidate_organization_slug(&organization.name).await;
        info!(
            subsystem = "service",
            component = "organizations",
            organization = %organization.name,
            "Organization created"
        );
        Ok(organization)
    }

    /// Delete an organization by slug, with its articles.
    pub async fn delete_organization(&self, slug: &str) -> Result<()> {
        let normalized = slugify(slug);
        let organization = self
            .resolve_organization_by_slug(&normalized)
            .await?
            .ok_or_else(|| Error::OrganizationNotFound(slug.to_string()))?;

        self.organizations.delete(organization.id).await?;
        self.cache.invalidate_organization_slug(&organization.name).await;
        self.cache.invalidate_articles().await;
        info!(
            subsystem = "service",
            component = "organizations",
            organization = %organization.name,
            "Organization deleted with its articles"
        );
        Ok(())
    }

    pub async fn create_article(&self, req: CreateArticleRequest) -> Result<Article> {
        let article = self.articles.insert(req).await?;
        self.cache.invalidate_articles().await;
        info!(
            subsystem = "service",
            component = "articles",
            article_id = %article.id,
            "Article created"
        );
        Ok(article)
    }

    pub async fn delete_article(&self, id: Uuid) -> Result<()> {
        self.articles.delete(id).await?;
        self.cache.invalidate_articles().await;
        Ok(())
    }

    pub async fn delete_all_articles(&self) -> Result<u64> {
        let removed = self.articles.delete_all().await?;
        self.cache.invalidate_articles().await;
        info!(
            subsystem = "service",
            component = "articles",
            result_count = removed,
            "All articles deleted"
        );
        Ok(removed)
    }

    pub async fn article_counts(&self) -> Result<ArticleCounts> {
        self.articles.counts().await
    }

    pub async fn articles_for_organization(&self, slug: &str) -> Result<Vec<Article>> {
        let normalized = slugify(slug);
        let organization = self
            .resolve_organization_by_slug(&normalized)
            .await?
            .ok_or_else(|| Error::OrganizationNotFound(slug.to_string()))?;
        self.articles.list_for_organization(organization.id).await
    }
}
