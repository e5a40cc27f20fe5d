use cordia_core::models::Comment;
use cordia_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, comment), fields(db.table = "comments", db.operation = "insert"))]
    pub async fn create(
        &self,
        lead_id: Uuid,
        commented_by: Uuid,
        comment: &str,
    ) -> Result<Comment, AppError> {
        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (lead_id, comment, commented_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(lead_id)
        .bind(comment)
        .bind(commented_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create comment");
            AppError::Database(e)
        })?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "comments", db.operation = "select"))]
    pub async fn list_by_lead(&self, lead_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE lead_id = $1 ORDER BY commented_on DESC, id DESC",
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, lead_id = %lead_id, "Failed to list comments");
            AppError::Database(e)
        })?;

        Ok(comments)
    }

    #[tracing::instrument(skip(self), fields(db.table = "comments", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, comment_id = %id, "Failed to delete comment");
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
