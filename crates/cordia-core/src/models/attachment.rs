use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// File attached to a lead. Stores the file reference only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Attachment {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub file_name: String,
    pub attachment: String,
    /// User who uploaded the file.
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}
