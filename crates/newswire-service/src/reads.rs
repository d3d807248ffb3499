//! Cache-aside read operations.
//!
//! Every cacheable read follows the same shape: build the content-addressed
//! key, try the cache, fall through to the repository, write the result
//! back with the family TTL. The returned [`Cached`] wrapper tells the
//! caller whether the cache served the value.

use std::time::Duration;

use tracing::debug;

use newswire_cache::{
    keys, CacheOutcome, CachedValue, Family,
};
use newswire_core::{defaults, slugify, Article, Error, Organization, Result};

use crate::service::NewsService;

/// A read result plus where it came from.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub value: T,
    pub outcome: CacheOutcome,
}

impl<T> Cached<T> {
    fn hit(value: T) -> Self {
        Self {
            value,
            outcome: CacheOutcome::Hit,
        }
    }

    fn miss(value: T) -> Self {
        Self {
            value,
            outcome: CacheOutcome::Miss,
        }
    }
}

impl NewsService {
    /// Look up an organization by slug, negative-cached.
    ///
    /// A cached `__null__` sentinel answers "no such organization" without
    /// rescanning; it carries a shorter TTL than positive entries so a
    /// newly created organization becomes visible quickly.
    pub async fn find_organization_by_slug(
        &self,
        slug: &str,
    ) -> Result<Cached<Option<Organization>>> {
        let normalized = slugify(slug);
        if normalized.is_empty() {
            return Err(Error::InvalidInput("empty organization slug".to_string()));
        }

        let key = keys::organization_slug_key(&normalized);
        match self.cache.lookup::<Organization>(&key).await {
            CachedValue::Value(org) => return Ok(Cached::hit(Some(org))),
            CachedValue::NegativeSentinel => return Ok(Cached::hit(None)),
            CachedValue::Absent => {}
        }

        match self.resolve_organization_by_slug(&normalized).await? {
            Some(org) => {
                self.cache
                    .set_json(
                        &key,
                        &org,
                        Duration::from_secs(defaults::CACHE_TTL_ORGANIZATION_SECS),
                    )
                    .await;
                Ok(Cached::miss(Some(org)))
            }
            None => {
                self.cache
                    .set_negative(
                        &key,
                        Duration::from_secs(defaults::CACHE_TTL_ORGANIZATION_MISS_SECS),
                    )
                    .await;
                Ok(Cached::miss(None))
            }
        }
    }

    /// Newest articles, optionally filtered by organization name
    /// (case-insensitive).
    pub async fn newest_articles(
        &self,
        organization: Option<&str>,
    ) -> Result<Cached<Vec<Article>>> {
        let key = keys::newest_key(organization);
        if let Some(cached) = self.cache.get_json::<Vec<Article>>(&key).await {
            return Ok(Cached::hit(cached));
        }

        let articles = self
            .articles
            .newest(organization, defaults::READ_LIMIT)
            .await?;
        self.cache
            .set_in_family(
                Family::Newest,
                &key,
                &articles,
                Duration::from_secs(defaults::CACHE_TTL_NEWEST_SECS),
            )
            .await;
        Ok(Cached::miss(articles))
    }

    /// Substring search over article text, optionally scoped to one
    /// organization by slug. An unknown slug is an error, not an empty
    /// result.
    pub async fn search_articles(
        &self,
        text: &str,
        organization_slug: Option<&str>,
    ) -> Result<Cached<Vec<Article>>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("empty search text".to_string()));
        }

        let normalized_slug = organization_slug.map(slugify);
        let organization_id = match &normalized_slug {
            Some(slug) => Some(
                self.resolve_organization_by_slug(slug)
                    .await?
                    .ok_or_else(|| {
                        Error::OrganizationNotFound(organization_slug.unwrap_or_default().to_string())
                    })?
                    .id,
            ),
            None => None,
        };

        let key = keys::search_key(text, normalized_slug.as_deref());
        if let Some(cached) = self.cache.get_json::<Vec<Article>>(&key).await {
            return Ok(Cached::hit(cached));
        }

        let articles = self
            .articles
            .search(text, organization_id, defaults::READ_LIMIT)
            .await?;
        self.cache
            .set_in_family(
                Family::Search,
                &key,
                &articles,
                Duration::from_secs(defaults::CACHE_TTL_SEARCH_SECS),
            )
            .await;
        Ok(Cached::miss(articles))
    }

    /// Articles most similar to an existing article, identified by link.
    ///
    /// The source article is excluded from its own results, as are articles
    /// that have no embedding yet. A source article that has not been
    /// embedded yet yields an empty result, distinct from an unknown link
    /// which is `ArticleNotFound`.
    pub async fn similar_to_article(&self, link: &str) -> Result<Cached<Vec<Article>>> {
        let key = keys::similar_key(link);
        if let Some(cached) = self.cache.get_json::<Vec<Article>>(&key).await {
            return Ok(Cached::hit(cached));
        }

        let article = self
            .articles
            .find_by_link(link)
            .await?
            .ok_or_else(|| Error::ArticleNotFound(link.to_string()))?;

        // Not cached: the backfill will embed this article shortly, and a
        // cached empty answer would hide that for the whole TTL.
        let Some(embedding) = article.embedding.as_ref() else {
            return Ok(Cached::miss(Vec::new()));
        };

        let similar = self
            .articles
            .find_similar(embedding, Some(article.id), None, defaults::READ_LIMIT)
            .await?;
        self.cache
            .set_in_family(
                Family::Similar,
                &key,
                &similar,
                Duration::from_secs(defaults::CACHE_TTL_SIMILAR_SECS),
            )
            .await;
        Ok(Cached::miss(similar))
    }

    /// Articles most similar to free text, embedded on the fly. Uncached:
    /// every call pays the provider round trip.
    pub async fn similar_to_text(
        &self,
        text: &str,
        organization: Option<&str>,
    ) -> Result<Vec<Article>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("empty query text".to_string()));
        }

        let mut vectors = self.embedder.embed_texts(&[text.to_string()]).await?;
        let query = vectors
            .pop()
            .ok_or_else(|| Error::Provider("provider returned no embedding".to_string()))?;

        debug!(
            subsystem = "service",
            component = "similarity",
            op = "similar_to_text",
            "Embedded ad-hoc query"
        );
        self.articles
            .find_similar(&query, None, organization, defaults::READ_LIMIT)
            .await
    }
}
