use cordia_core::models::Attachment;
use cordia_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, attachment), fields(db.table = "attachments", db.operation = "insert"))]
    pub async fn create(
        &self,
        lead_id: Uuid,
        created_by: Uuid,
        file_name: &str,
        attachment: &str,
    ) -> Result<Attachment, AppError> {
        let created = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (lead_id, file_name, attachment, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(lead_id)
        .bind(file_name)
        .bind(attachment)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create attachment");
            AppError::Database(e)
        })?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "attachments", db.operation = "select"))]
    pub async fn list_by_lead(&self, lead_id: Uuid) -> Result<Vec<Attachment>, AppError> {
        let attachments = sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE lead_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, lead_id = %lead_id, "Failed to list attachments");
            AppError::Database(e)
        })?;

        Ok(attachments)
    }

    #[tracing::instrument(skip(self), fields(db.table = "attachments", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, attachment_id = %id, "Failed to delete attachment");
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
