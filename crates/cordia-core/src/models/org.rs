use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Org (tenant) entity. The isolation boundary for all CRM data.
///
/// `api_key` is the tenant-wide shared secret: presenting it authenticates a
/// request as the org's admin representative. It is returned to org admins
/// (the org creation response and the caller's own org listing) and must
/// never appear in cross-tenant responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Org {
    pub id: Uuid,
    pub name: String,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
