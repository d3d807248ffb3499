//! In-memory repository implementations.
//!
//! Backed by `std::sync` locks, these mirror the Postgres repositories'
//! observable semantics (conflict handling, ordering, cascades) closely
//! enough for job and service tests to run without a database.

use std::cmp::Ordering as CmpOrdering;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;
use crate::traits::{ArticleRepository, OrganizationRepository};

/// Shared in-memory store. Hand out repository handles via
/// [`MemoryStore::organizations`] and [`MemoryStore::articles`]; all handles
/// see the same data, so organization deletes cascade onto articles.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    organizations: Vec<Organization>,
    articles: Vec<Article>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn organizations(&self) -> MemoryOrganizationRepository {
        MemoryOrganizationRepository {
            inner: self.inner.clone(),
        }
    }

    pub fn articles(&self) -> MemoryArticleRepository {
        MemoryArticleRepository {
            inner: self.inner.clone(),
        }
    }
}

/// `OrganizationRepository` over a [`MemoryStore`].
#[derive(Clone)]
pub struct MemoryOrganizationRepository {
    inner: Arc<Mutex<StoreInner>>,
}

/// `ArticleRepository` over a [`MemoryStore`].
#[derive(Clone)]
pub struct MemoryArticleRepository {
    inner: Arc<Mutex<StoreInner>>,
}

/// Postgres `ORDER BY publication_date DESC, id DESC` (DESC sorts NULLs
/// first).
fn newest_cmp(a: &Article, b: &Article) -> CmpOrdering {
    let by_date = match (a.publication_date, b.publication_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => CmpOrdering::Greater,
        (None, Some(_)) => CmpOrdering::Less,
        (None, None) => CmpOrdering::Equal,
    };
    by_date.then_with(|| b.id.cmp(&a.id))
}

fn l2_distance(a: &Vector, b: &Vector) -> f32 {
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

fn contains_ci(haystack: &Option<String>, needle_lower: &str) -> bool {
    haystack
        .as_deref()
        .map(|h| h.to_lowercase().contains(needle_lower))
        .unwrap_or(false)
}

#[async_trait]
impl OrganizationRepository for MemoryOrganizationRepository {
    async fn insert(&self, req: CreateOrganizationRequest) -> Result<Organization> {
        let mut inner = self.inner.lock().unwrap();
        let organization = Organization {
            id: Uuid::now_v7(),
            name: req.name,
            url: req.url,
        };
        inner.organizations.push(organization.clone());
        Ok(organization)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Organization>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .organizations
            .iter()
            .find(|o| o.name == name)
            .cloned())
    }

    async fn get_or_create(&self, req: CreateOrganizationRequest) -> Result<Organization> {
        if let Some(existing) = self.find_by_name(&req.name).await? {
            return Ok(existing);
        }
        self.insert(req).await
    }

    async fn list(&self) -> Result<Vec<Organization>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.organizations.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.organizations.iter().any(|o| o.id == id) {
            return Err(Error::OrganizationNotFound(id.to_string()));
        }
        inner.articles.retain(|a| a.organization_id != Some(id));
        inner.organizations.retain(|o| o.id != id);
        Ok(())
    }
}

impl MemoryArticleRepository {
    fn organization_id_by_name_ci(inner: &StoreInner, name: &str) -> Option<Uuid> {
        inner
            .organizations
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
            .map(|o| o.id)
    }
}

#[async_trait]
impl ArticleRepository for MemoryArticleRepository {
    async fn insert(&self, req: CreateArticleRequest) -> Result<Article> {
        let mut inner = self.inner.lock().unwrap();
        if inner.articles.iter().any(|a| a.link == req.link) {
            return Err(Error::Conflict(format!(
                "article with link {} already exists",
                req.link
            )));
        }
        let article = Article {
            id: Uuid::now_v7(),
            link: req.link,
            organization_id: req.organization_id,
            headline: req.headline,
            description: req.description,
            summary: req.summary,
            content: req.content,
            publication_date: req.publication_date,
            embedding: None,
        };
        inner.articles.push(article.clone());
        Ok(article)
    }

    async fn insert_bulk(&self, reqs: Vec<CreateArticleRequest>) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        let mut inserted = 0;
        for req in reqs {
            if inner.articles.iter().any(|a| a.link == req.link) {
                continue;
            }
            inner.articles.push(Article {
                id: Uuid::now_v7(),
                link: req.link,
                organization_id: req.organization_id,
                headline: req.headline,
                description: req.description,
                summary: req.summary,
                content: req.content,
                publication_date: req.publication_date,
                embedding: None,
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn exists_by_link(&self, link: &str) -> Result<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.articles.iter().any(|a| a.link == link))
    }

    async fn find_by_link(&self, link: &str) -> Result<Option<Article>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.articles.iter().find(|a| a.link == link).cloned())
    }

    async fn select_unembedded(&self, limit: i64) -> Result<Vec<Article>> {
        let inner = self.inner.lock().unwrap();
        let mut pending: Vec<Article> = inner
            .articles
            .iter()
            .filter(|a| a.embedding.is_none())
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.id.cmp(&b.id));
        pending.truncate(limit.max(0) as usize);
        Ok(pending)
    }

    async fn store_embeddings(&self, updates: Vec<(Uuid, Vector)>) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        for (id, vector) in updates {
            if let Some(article) = inner.articles.iter_mut().find(|a| a.id == id) {
                article.embedding = Some(vector);
            }
        }
        Ok(())
    }

    async fn newest(&self, organization_name: Option<&str>, limit: i64) -> Result<Vec<Article>> {
        let inner = self.inner.lock().unwrap();
        let org_id = organization_name.map(|n| Self::organization_id_by_name_ci(&inner, n));
        let mut selected: Vec<Article> = inner
            .articles
            .iter()
            .filter(|a| match org_id {
                None => true,
                Some(Some(id)) => a.organization_id == Some(id),
                Some(None) => false,
            })
            .cloned()
            .collect();
        selected.sort_by(newest_cmp);
        selected.truncate(limit.max(0) as usize);
        Ok(selected)
    }

    async fn search(
        &self,
        text: &str,
        organization_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<Article>> {
        let needle = text.to_lowercase();
        let inner = self.inner.lock().unwrap();
        let mut selected: Vec<Article> = inner
            .articles
            .iter()
            .filter(|a| organization_id.is_none() || a.organization_id == organization_id)
            .filter(|a| {
                contains_ci(&a.headline, &needle)
                    || contains_ci(&a.summary, &needle)
                    || contains_ci(&a.description, &needle)
                    || contains_ci(&a.content, &needle)
            })
            .cloned()
            .collect();
        selected.sort_by(newest_cmp);
        selected.truncate(limit.max(0) as usize);
        Ok(selected)
    }

    async fn find_similar(
        &self,
        query: &Vector,
        exclude_id: Option<Uuid>,
        organization_name: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Article>> {
        let inner = self.inner.lock().unwrap();
        let org_id = organization_name.map(|n| Self::organization_id_by_name_ci(&inner, n));
        let mut scored: Vec<(f32, Article)> = inner
            .articles
            .iter()
            .filter(|a| a.embedding.is_some())
            .filter(|a| exclude_id != Some(a.id))
            .filter(|a| match org_id {
                None => true,
                Some(Some(id)) => a.organization_id == Some(id),
                Some(None) => false,
            })
            .map(|a| {
                (
                    l2_distance(query, a.embedding.as_ref().unwrap()),
                    a.clone(),
                )
            })
            .collect();
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(CmpOrdering::Equal));
        Ok(scored
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(_, a)| a)
            .collect())
    }

    async fn published_since(
        &self,
        cutoff: DateTime<Utc>,
        organization_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<Article>> {
        let inner = self.inner.lock().unwrap();
        let mut selected: Vec<Article> = inner
            .articles
            .iter()
            .filter(|a| a.publication_date.map(|d| d >= cutoff).unwrap_or(false))
            .filter(|a| organization_id.is_none() || a.organization_id == organization_id)
            .cloned()
            .collect();
        selected.sort_by(newest_cmp);
        if let Some(limit) = limit {
            selected.truncate(limit.max(0) as usize);
        }
        Ok(selected)
    }

    async fn list_for_organization(&self, organization_id: Uuid) -> Result<Vec<Article>> {
        let inner = self.inner.lock().unwrap();
        let mut selected: Vec<Article> = inner
            .articles
            .iter()
            .filter(|a| a.organization_id == Some(organization_id))
            .cloned()
            .collect();
        selected.sort_by(newest_cmp);
        Ok(selected)
    }

    async fn counts(&self) -> Result<ArticleCounts> {
        let inner = self.inner.lock().unwrap();
        Ok(ArticleCounts {
            total: inner.articles.len() as i64,
            missing_embedding: inner.articles.iter().filter(|a| a.embedding.is_none()).count()
                as i64,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.articles.len();
        inner.articles.retain(|a| a.id != id);
        if inner.articles.len() == before {
            return Err(Error::ArticleNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.articles.len() as u64;
        inner.articles.clear();
        Ok(removed)
    }
}
