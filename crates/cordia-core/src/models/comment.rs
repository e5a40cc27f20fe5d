use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Comment on a lead, written by a profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Comment {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub comment: String,
    /// Profile that wrote the comment.
    pub commented_by: Uuid,
    pub commented_on: DateTime<Utc>,
}
