use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User account. The email is the identity key and is stored lowercased;
/// lookups are case-insensitive.
///
/// `is_staff` and `is_superuser` are platform-level flags: they bypass org
/// scoping entirely and are distinct from the per-org admin flag carried on
/// `Profile`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// bcrypt hash; never exposed over the API.
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,
    pub profile_pic: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user carries a platform-level flag (staff or superuser).
    pub fn is_platform_admin(&self) -> bool {
        self.is_superuser || self.is_staff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(staff: bool, superuser: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            password_hash: "hash".to_string(),
            profile_pic: None,
            is_active: true,
            is_staff: staff,
            is_superuser: superuser,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_platform_admin_flags() {
        assert!(!user(false, false).is_platform_admin());
        assert!(user(true, false).is_platform_admin());
        assert!(user(false, true).is_platform_admin());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(user(false, false)).expect("serialize");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email").is_some());
    }
}
