use cordia_core::models::{Org, Profile, ProfileRole};
use cordia_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use super::user::map_unique_violation;

#[derive(Clone)]
pub struct OrgRepository {
    pool: PgPool,
}

impl OrgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an org and its first admin profile in one transaction.
    ///
    /// This is the only path that produces a tenant's first admin: the
    /// creator gets `role = ADMIN` and `is_organization_admin = true`. A
    /// duplicate name maps to `Conflict`; on any failure neither row exists.
    #[tracing::instrument(skip(self, api_key), fields(db.table = "orgs", db.operation = "insert"))]
    pub async fn create_org_with_admin(
        &self,
        name: &str,
        api_key: &str,
        creator_user_id: Uuid,
    ) -> Result<(Org, Profile), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let org = sqlx::query_as::<_, Org>(
            r#"
            INSERT INTO orgs (name, api_key)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(api_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "Organization already exists with this name"))?;

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, org_id, role, is_organization_admin)
            VALUES ($1, $2, $3, TRUE)
            RETURNING *
            "#,
        )
        .bind(creator_user_id)
        .bind(org.id)
        .bind(ProfileRole::Admin)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create admin profile for new org");
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(org_id = %org.id, name = %org.name, "Org created with admin profile");
        Ok((org, profile))
    }

    #[tracing::instrument(skip(self), fields(db.table = "orgs", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Org>, AppError> {
        let org = sqlx::query_as::<_, Org>("SELECT * FROM orgs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch org by id");
                AppError::Database(e)
            })?;

        Ok(org)
    }

    /// Exact-match lookup by API key. The key is the tenant-wide secret; a
    /// hit pins the request to this org.
    #[tracing::instrument(skip_all, fields(db.table = "orgs", db.operation = "select"))]
    pub async fn get_by_api_key(&self, api_key: &str) -> Result<Option<Org>, AppError> {
        let org = sqlx::query_as::<_, Org>("SELECT * FROM orgs WHERE api_key = $1")
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch org by api key");
                AppError::Database(e)
            })?;

        Ok(org)
    }

    /// Idempotently get or create an org by name. Used for the fallback
    /// "Default Org" that every fresh user is bound to; concurrent callers
    /// race safely on the name constraint.
    #[tracing::instrument(skip(self, api_key), fields(db.table = "orgs", db.operation = "upsert"))]
    pub async fn get_or_create_by_name(&self, name: &str, api_key: &str) -> Result<Org, AppError> {
        if let Some(org) = sqlx::query_as::<_, Org>("SELECT * FROM orgs WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch org by name");
                AppError::Database(e)
            })?
        {
            return Ok(org);
        }

        let inserted = sqlx::query_as::<_, Org>(
            r#"
            INSERT INTO orgs (name, api_key)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create org");
            AppError::Database(e)
        })?;

        match inserted {
            Some(org) => {
                tracing::info!(org_id = %org.id, name = %org.name, "Org created");
                Ok(org)
            }
            // Lost the race; the row exists now.
            None => sqlx::query_as::<_, Org>("SELECT * FROM orgs WHERE name = $1")
                .bind(name)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to fetch org after conflict");
                    AppError::Database(e)
                }),
        }
    }
}
