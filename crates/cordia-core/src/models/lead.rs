use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lead pipeline status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "lead_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Assigned,
    InProcess,
    Converted,
    Recycled,
    Closed,
}

/// Where a lead came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "lead_source", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Call,
    Email,
    ExistingCustomer,
    Partner,
    PublicRelations,
    Campaign,
    Website,
    Other,
}

/// Lead record, scoped to one org.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Lead {
    pub id: Uuid,
    pub org_id: Uuid,
    pub title: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: LeadStatus,
    pub source: Option<LeadSource>,
    pub company_id: Option<Uuid>,
    /// Profile the lead is assigned to, if any.
    pub assigned_to: Option<Uuid>,
    pub description: Option<String>,
    pub website: Option<String>,
    /// User who created the lead.
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
