use cordia_core::models::Company;
use cordia_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::control::user::map_unique_violation;

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
}

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, company), fields(db.table = "companies", db.operation = "insert"))]
    pub async fn create(&self, org_id: Uuid, company: &NewCompany) -> Result<Company, AppError> {
        let created = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (org_id, name, website, phone, billing_address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(&company.name)
        .bind(&company.website)
        .bind(&company.phone)
        .bind(&company.billing_address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Company already exists with this name"))?;

        tracing::info!(company_id = %created.id, org_id = %org_id, "Company created");
        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "companies", db.operation = "select"))]
    pub async fn get_by_id(&self, org_id: Uuid, id: Uuid) -> Result<Option<Company>, AppError> {
        let company =
            sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1 AND org_id = $2")
                .bind(id)
                .bind(org_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to fetch company");
                    AppError::Database(e)
                })?;

        Ok(company)
    }

    #[tracing::instrument(skip(self), fields(db.table = "companies", db.operation = "select"))]
    pub async fn list_by_org(&self, org_id: Uuid) -> Result<Vec<Company>, AppError> {
        let companies =
            sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE org_id = $1 ORDER BY name")
                .bind(org_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, org_id = %org_id, "Failed to list companies");
                    AppError::Database(e)
                })?;

        Ok(companies)
    }

    #[tracing::instrument(skip(self, company), fields(db.table = "companies", db.operation = "update"))]
    pub async fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        company: &NewCompany,
    ) -> Result<Option<Company>, AppError> {
        let updated = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                name = $3, website = $4, phone = $5, billing_address = $6, updated_at = NOW()
            WHERE id = $1 AND org_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(org_id)
        .bind(&company.name)
        .bind(&company.website)
        .bind(&company.phone)
        .bind(&company.billing_address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Company already exists with this name"))?;

        Ok(updated)
    }

    #[tracing::instrument(skip(self), fields(db.table = "companies", db.operation = "delete"))]
    pub async fn delete(&self, org_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, company_id = %id, "Failed to delete company");
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "companies", db.operation = "select"))]
    pub async fn count_by_org(&self, org_id: Uuid) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies WHERE org_id = $1")
            .bind(org_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, org_id = %org_id, "Failed to count companies");
                AppError::Database(e)
            })?;

        Ok(count)
    }
}
