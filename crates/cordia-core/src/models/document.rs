use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "document_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Active,
    Inactive,
}

/// Org-scoped document. Only the file reference is stored here; file storage
/// itself is an external concern.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Document {
    pub id: Uuid,
    pub org_id: Uuid,
    pub title: String,
    pub document_file: String,
    pub status: DocumentStatus,
    /// User who created the document.
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
