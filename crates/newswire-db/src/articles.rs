//! Article repository implementation.
//!
//! Bulk ingestion inserts use `ON CONFLICT (link) DO NOTHING`, so a race
//! between two ingestion runs converts into skipped rows rather than errors.
//! Similarity queries order by pgvector `<->` (L2) distance.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pgvector::Vector;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use newswire_core::{
    Article, ArticleCounts, ArticleRepository, CreateArticleRequest, Error, Result,
};

/// PostgreSQL implementation of `ArticleRepository`.
pub struct PgArticleRepository {
    pool: Pool<Postgres>,
}

impl PgArticleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const ARTICLE_COLUMNS: &str = "id, link, organization_id, headline, description, summary, \
                               content, publication_date, embedding";

/// Newest-first ordering: publication date descending with the time-ordered
/// id as tiebreak (matches the unique-id generation scheme).
const NEWEST_ORDER: &str = "ORDER BY publication_date DESC, id DESC";

fn article_from_row(row: &PgRow) -> Article {
    Article {
        id: row.get("id"),
        link: row.get("link"),
        organization_id: row.get("organization_id"),
        headline: row.get("headline"),
        description: row.get("description"),
        summary: row.get("summary"),
        content: row.get("content"),
        publication_date: row.get("publication_date"),
        embedding: row.get("embedding"),
    }
}

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn insert(&self, req: CreateArticleRequest) -> Result<Article> {
        let id = Uuid::now_v7();
        let result = sqlx::query(
            "INSERT INTO articles
                 (id, link, organization_id, headline, description, summary, content,
                  publication_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(&req.link)
        .bind(req.organization_id)
        .bind(&req.headline)
        .bind(&req.description)
        .bind(&req.summary)
        .bind(&req.content)
        .bind(req.publication_date)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(Article {
                id,
                link: req.link,
                organization_id: req.organization_id,
                headline: req.headline,
                description: req.description,
                summary: req.summary,
                content: req.content,
                publication_date: req.publication_date,
                embedding: None,
            }),
            Err(e) if is_unique_violation(&e) => {
                Err(Error::Conflict(format!("article link already exists: {}", req.link)))
            }
            Err(e) => Err(Error::Database(e)),
        }
    }

    async fn insert_bulk(&self, reqs: Vec<CreateArticleRequest>) -> Result<usize> {
        if reqs.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut inserted = 0usize;

        for req in &reqs {
            let result = sqlx::query(
                "INSERT INTO articles
                     (id, link, organization_id, headline, description, summary, content,
                      publication_date)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 ON CONFLICT (link) DO NOTHING",
            )
            .bind(Uuid::now_v7())
            .bind(&req.link)
            .bind(req.organization_id)
            .bind(&req.headline)
            .bind(&req.description)
            .bind(&req.summary)
            .bind(&req.content)
            .bind(req.publication_date)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

            inserted += result.rows_affected() as usize;
        }

        tx.commit().await.map_err(Error::Database)?;

        if inserted < reqs.len() {
            debug!(
                subsystem = "db",
                component = "articles",
                op = "insert_bulk",
                inserted_count = inserted,
                batch_size = reqs.len(),
                "Some articles already existed; treated as ingested"
            );
        }

        Ok(inserted)
    }

    async fn exists_by_link(&self, link: &str) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM articles WHERE link = $1) AS found")
            .bind(link)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.get("found"))
    }

    async fn find_by_link(&self, link: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE link = $1"
        ))
        .bind(link)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(article_from_row))
    }

    async fn select_unembedded(&self, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles
             WHERE embedding IS NULL
             ORDER BY id ASC
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(article_from_row).collect())
    }

    async fn store_embeddings(&self, updates: Vec<(Uuid, Vector)>) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let count = updates.len();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for (id, vector) in updates {
            sqlx::query("UPDATE articles SET embedding = $1 WHERE id = $2")
                .bind(vector)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "articles",
            op = "store_embeddings",
            batch_size = count,
            "Stored embedding batch"
        );
        Ok(())
    }

    async fn newest(&self, organization_name: Option<&str>, limit: i64) -> Result<Vec<Article>> {
        let rows = match organization_name {
            None => {
                sqlx::query(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles {NEWEST_ORDER} LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            Some(name) => {
                sqlx::query(&format!(
                    "SELECT a.{} FROM articles a
                     JOIN organizations o ON a.organization_id = o.id
                     WHERE lower(o.name) = lower($1)
                     {NEWEST_ORDER}
                     LIMIT $2",
                    ARTICLE_COLUMNS.replace(", ", ", a.")
                ))
                .bind(name.trim())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        Ok(rows.iter().map(article_from_row).collect())
    }

    async fn search(
        &self,
        text: &str,
        organization_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<Article>> {
        let pattern = format!("%{}%", escape_like(text.trim()));

        let org_clause = if organization_id.is_some() {
            "AND organization_id = $3"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles
             WHERE (headline ILIKE $1
                    OR summary ILIKE $1
                    OR description ILIKE $1
                    OR content ILIKE $1)
               {org_clause}
             {NEWEST_ORDER}
             LIMIT $2"
        );

        let mut query = sqlx::query(&sql).bind(&pattern).bind(limit);
        if let Some(org_id) = organization_id {
            query = query.bind(org_id);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(Error::Database)?;
        Ok(rows.iter().map(article_from_row).collect())
    }

    async fn find_similar(
        &self,
        query_vec: &Vector,
        exclude_id: Option<Uuid>,
        organization_name: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Article>> {
        let mut clauses = vec!["a.embedding IS NOT NULL".to_string()];
        let mut next_param = 3;

        if exclude_id.is_some() {
            clauses.push(format!("a.id <> ${next_param}"));
            next_param += 1;
        }
        if organization_name.is_some() {
            clauses.push(format!("lower(o.name) = lower(${next_param})"));
        }

        let sql = format!(
            "SELECT a.{} FROM articles a
             LEFT JOIN organizations o ON a.organization_id = o.id
             WHERE {}
             ORDER BY a.embedding <-> $1
             LIMIT $2",
            ARTICLE_COLUMNS.replace(", ", ", a."),
            clauses.join(" AND ")
        );

        let mut query = sqlx::query(&sql).bind(query_vec).bind(limit);
        if let Some(id) = exclude_id {
            query = query.bind(id);
        }
        if let Some(name) = organization_name {
            query = query.bind(name.trim());
        }

        let rows = query.fetch_all(&self.pool).await.map_err(Error::Database)?;
        Ok(rows.iter().map(article_from_row).collect())
    }

    async fn published_since(
        &self,
        cutoff: DateTime<Utc>,
        organization_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<Article>> {
        let org_clause = if organization_id.is_some() {
            "AND organization_id = $2"
        } else {
            ""
        };
        let limit_clause = match (limit, organization_id) {
            (Some(_), Some(_)) => "LIMIT $3",
            (Some(_), None) => "LIMIT $2",
            _ => "",
        };
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles
             WHERE publication_date IS NOT NULL AND publication_date >= $1
               {org_clause}
             {NEWEST_ORDER}
             {limit_clause}"
        );

        let mut query = sqlx::query(&sql).bind(cutoff);
        if let Some(org_id) = organization_id {
            query = query.bind(org_id);
        }
        if let Some(n) = limit {
            query = query.bind(n);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(Error::Database)?;
        Ok(rows.iter().map(article_from_row).collect())
    }

    async fn list_for_organization(&self, organization_id: Uuid) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles
             WHERE organization_id = $1
             {NEWEST_ORDER}"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(article_from_row).collect())
    }

    async fn counts(&self) -> Result<ArticleCounts> {
        let row = sqlx::query(
            "SELECT count(*) AS total,
                    count(*) FILTER (WHERE embedding IS NULL) AS missing_embedding
             FROM articles",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(ArticleCounts {
            total: row.get("total"),
            missing_embedding: row.get("missing_embedding"),
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ArticleNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM articles")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100% _done_"), "100\\% \\_done\\_");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_article_columns_prefixing() {
        let prefixed = ARTICLE_COLUMNS.replace(", ", ", a.");
        assert!(prefixed.starts_with("id"));
        assert!(prefixed.contains("a.link"));
        assert!(prefixed.contains("a.embedding"));
    }
}
