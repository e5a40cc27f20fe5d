use cordia_core::models::{Document, DocumentStatus};
use cordia_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub document_file: String,
    pub status: DocumentStatus,
}

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, document), fields(db.table = "documents", db.operation = "insert"))]
    pub async fn create(
        &self,
        org_id: Uuid,
        created_by: Uuid,
        document: &NewDocument,
    ) -> Result<Document, AppError> {
        let created = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (org_id, title, document_file, status, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(&document.title)
        .bind(&document.document_file)
        .bind(document.status)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create document");
            AppError::Database(e)
        })?;

        tracing::info!(document_id = %created.id, org_id = %org_id, "Document created");
        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    pub async fn get_by_id(&self, org_id: Uuid, id: Uuid) -> Result<Option<Document>, AppError> {
        let document =
            sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1 AND org_id = $2")
                .bind(id)
                .bind(org_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to fetch document");
                    AppError::Database(e)
                })?;

        Ok(document)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    pub async fn list_by_org(&self, org_id: Uuid) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE org_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, org_id = %org_id, "Failed to list documents");
            AppError::Database(e)
        })?;

        Ok(documents)
    }

    #[tracing::instrument(skip(self, document), fields(db.table = "documents", db.operation = "update"))]
    pub async fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        document: &NewDocument,
    ) -> Result<Option<Document>, AppError> {
        let updated = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents SET
                title = $3, document_file = $4, status = $5, updated_at = NOW()
            WHERE id = $1 AND org_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(org_id)
        .bind(&document.title)
        .bind(&document.document_file)
        .bind(document.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, document_id = %id, "Failed to update document");
            AppError::Database(e)
        })?;

        Ok(updated)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "delete"))]
    pub async fn delete(&self, org_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, document_id = %id, "Failed to delete document");
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
