//! Organization repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use newswire_core::{
    CreateOrganizationRequest, Error, Organization, OrganizationRepository, Result,
};

/// PostgreSQL implementation of `OrganizationRepository`.
pub struct PgOrganizationRepository {
    pool: Pool<Postgres>,
}

impl PgOrganizationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn organization_from_row(row: &sqlx::postgres::PgRow) -> Organization {
    Organization {
        id: row.get("id"),
        name: row.get("name"),
        url: row.get("url"),
    }
}

#[async_trait]
impl OrganizationRepository for PgOrganizationRepository {
    async fn insert(&self, req: CreateOrganizationRequest) -> Result<Organization> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO organizations (id, name, url) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&req.name)
            .bind(&req.url)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "organizations",
            op = "insert",
            organization = %req.name,
            "Created organization"
        );

        Ok(Organization {
            id,
            name: req.name,
            url: req.url,
        })
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Organization>> {
        let row = sqlx::query("SELECT id, name, url FROM organizations WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(organization_from_row))
    }

    async fn get_or_create(&self, req: CreateOrganizationRequest) -> Result<Organization> {
        if let Some(existing) = self.find_by_name(&req.name).await? {
            debug!(
                subsystem = "db",
                component = "organizations",
                op = "get_or_create",
                organization = %existing.name,
                "Organization already exists"
            );
            return Ok(existing);
        }
        self.insert(req).await
    }

    async fn list(&self) -> Result<Vec<Organization>> {
        let rows = sqlx::query("SELECT id, name, url FROM organizations ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(organization_from_row).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Articles go first so the delete cascades within one transaction.
        let articles = sqlx::query("DELETE FROM articles WHERE organization_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::OrganizationNotFound(id.to_string()));
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "organizations",
            op = "delete",
            result_count = articles.rows_affected(),
            "Deleted organization and its articles"
        );
        Ok(())
    }
}
