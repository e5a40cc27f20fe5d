use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-org role carried on a profile.
///
/// Kept as a separate signal from `Profile::is_organization_admin`: the
/// API-key resolution path selects by role while the org-admin authorization
/// predicate checks the boolean flag. Nothing forces the two into agreement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "profile_role", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProfileRole {
    Admin,
    User,
}

impl Display for ProfileRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProfileRole::Admin => write!(f, "ADMIN"),
            ProfileRole::User => write!(f, "USER"),
        }
    }
}

/// Profile: the membership record binding a User to an Org.
///
/// A user holds at most one active profile per org and may hold profiles in
/// many orgs. All per-tenant authority (role, org-admin flag, feature access)
/// lives here, not on the user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub org_id: Uuid,
    pub role: ProfileRole,
    pub is_organization_admin: bool,
    pub is_active: bool,
    pub phone: Option<String>,
    pub alternate_phone: Option<String>,
    pub address: Option<String>,
    pub has_sales_access: bool,
    pub has_marketing_access: bool,
    pub date_of_joining: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display_matches_wire_form() {
        assert_eq!(ProfileRole::Admin.to_string(), "ADMIN");
        assert_eq!(ProfileRole::User.to_string(), "USER");
    }

    #[test]
    fn test_role_serde_uppercase() {
        assert_eq!(
            serde_json::to_string(&ProfileRole::Admin).expect("serialize"),
            "\"ADMIN\""
        );
        let role: ProfileRole = serde_json::from_str("\"USER\"").expect("deserialize");
        assert_eq!(role, ProfileRole::User);
    }
}
