use cordia_core::models::{Lead, LeadSource, LeadStatus};
use cordia_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

/// Fields for creating or replacing a lead. Tenant and creator come from the
/// request context, never from the body.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub title: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: LeadStatus,
    pub source: Option<LeadSource>,
    pub company_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub description: Option<String>,
    pub website: Option<String>,
}

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, lead), fields(db.table = "leads", db.operation = "insert"))]
    pub async fn create(
        &self,
        org_id: Uuid,
        created_by: Uuid,
        lead: &NewLead,
    ) -> Result<Lead, AppError> {
        let created = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                org_id, title, first_name, last_name, email, phone,
                status, source, company_id, assigned_to, description, website, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(&lead.title)
        .bind(&lead.first_name)
        .bind(&lead.last_name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(lead.status)
        .bind(lead.source)
        .bind(lead.company_id)
        .bind(lead.assigned_to)
        .bind(&lead.description)
        .bind(&lead.website)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create lead");
            AppError::Database(e)
        })?;

        tracing::info!(lead_id = %created.id, org_id = %org_id, "Lead created");
        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "leads", db.operation = "select"))]
    pub async fn get_by_id(&self, org_id: Uuid, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch lead");
                AppError::Database(e)
            })?;

        Ok(lead)
    }

    /// Leads visible to the caller, newest first. With `restrict_to` set (a
    /// non-admin member), only leads assigned to that profile or created by
    /// that user are returned.
    #[tracing::instrument(skip(self), fields(db.table = "leads", db.operation = "select"))]
    pub async fn list_visible(
        &self,
        org_id: Uuid,
        restrict_to: Option<(Uuid, Uuid)>,
    ) -> Result<Vec<Lead>, AppError> {
        let leads = match restrict_to {
            None => {
                sqlx::query_as::<_, Lead>(
                    r#"
                    SELECT * FROM leads
                    WHERE org_id = $1 AND status <> 'converted'
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(org_id)
                .fetch_all(&self.pool)
                .await
            }
            Some((profile_id, user_id)) => {
                sqlx::query_as::<_, Lead>(
                    r#"
                    SELECT * FROM leads
                    WHERE org_id = $1 AND status <> 'converted'
                      AND (assigned_to = $2 OR created_by = $3)
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(org_id)
                .bind(profile_id)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| {
            tracing::error!(error = %e, org_id = %org_id, "Failed to list leads");
            AppError::Database(e)
        })?;

        Ok(leads)
    }

    #[tracing::instrument(skip(self, lead), fields(db.table = "leads", db.operation = "update"))]
    pub async fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        lead: &NewLead,
    ) -> Result<Option<Lead>, AppError> {
        let updated = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                title = $3, first_name = $4, last_name = $5, email = $6, phone = $7,
                status = $8, source = $9, company_id = $10, assigned_to = $11,
                description = $12, website = $13, updated_at = NOW()
            WHERE id = $1 AND org_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(org_id)
        .bind(&lead.title)
        .bind(&lead.first_name)
        .bind(&lead.last_name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(lead.status)
        .bind(lead.source)
        .bind(lead.company_id)
        .bind(lead.assigned_to)
        .bind(&lead.description)
        .bind(&lead.website)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, lead_id = %id, "Failed to update lead");
            AppError::Database(e)
        })?;

        Ok(updated)
    }

    #[tracing::instrument(skip(self), fields(db.table = "leads", db.operation = "delete"))]
    pub async fn delete(&self, org_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, lead_id = %id, "Failed to delete lead");
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Org-scoped count of open leads (neither converted nor closed).
    #[tracing::instrument(skip(self), fields(db.table = "leads", db.operation = "select"))]
    pub async fn count_open(&self, org_id: Uuid) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM leads WHERE org_id = $1 AND status NOT IN ('converted', 'closed')",
        )
        .bind(org_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, org_id = %org_id, "Failed to count leads");
            AppError::Database(e)
        })?;

        Ok(count)
    }
}
