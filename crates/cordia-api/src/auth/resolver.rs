//! Request-context resolution.
//!
//! Turns raw request credentials (bearer token, org API key, org header) into
//! a fully bound [`RequestContext`] or a typed failure. Resolution is total:
//! it yields either a complete context, `None` for a request that presented
//! no credentials, or an error. A partially bound context (user without
//! profile, profile without org) is never produced.
//!
//! Store lookups go through the [`ContextStore`] trait so the resolution
//! logic is testable without a database.

use async_trait::async_trait;
use cordia_core::models::{Org, Profile, User};
use cordia_core::AppError;
use uuid::Uuid;

use crate::auth::context::RequestContext;
use crate::auth::jwt::{JwtService, TokenType};

/// Raw credential material pulled from request headers.
#[derive(Debug, Clone, Default)]
pub struct RawCredentials {
    /// Full `Authorization` header value, scheme included.
    pub authorization: Option<String>,
    /// `Token` header: an org API key.
    pub api_key: Option<String>,
    /// `org` header: tenant selector (org id).
    pub org_header: Option<String>,
}

impl RawCredentials {
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };
        Self {
            authorization: get("authorization"),
            api_key: get("token"),
            org_header: get("org"),
        }
    }

    fn is_empty(&self) -> bool {
        self.authorization.is_none() && self.api_key.is_none()
    }
}

/// Typed failure union for resolution. The middleware maps every variant to
/// the same generic rejection; the split exists so the failure path stays
/// auditable and testable per kind.
#[derive(Debug)]
pub enum ResolveError {
    /// Malformed/expired/invalid bearer token, or unknown API key.
    Authentication(String),
    /// Identity was established but no usable tenant binding exists.
    TenantResolution(String),
    /// The backing store failed. Never retried on the resolution path.
    Store(AppError),
}

impl ResolveError {
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::Authentication(_) => "authentication",
            ResolveError::TenantResolution(_) => "tenant_resolution",
            ResolveError::Store(_) => "store",
        }
    }
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Authentication(msg) => write!(f, "authentication failed: {}", msg),
            ResolveError::TenantResolution(msg) => write!(f, "tenant resolution failed: {}", msg),
            ResolveError::Store(err) => write!(f, "store lookup failed: {}", err),
        }
    }
}

/// Store lookups the resolver needs. Implemented by [`SqlContextStore`] for
/// production and by in-memory fakes in tests.
#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn org_by_api_key(&self, api_key: &str) -> Result<Option<Org>, AppError>;
    async fn org_by_id(&self, org_id: Uuid) -> Result<Option<Org>, AppError>;
    /// Oldest active ADMIN-role profile of the org.
    async fn org_admin_profile(&self, org_id: Uuid) -> Result<Option<Profile>, AppError>;
    async fn active_profile_in_org(
        &self,
        user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Option<Profile>, AppError>;
    /// First active profile for the user, deterministically ordered.
    async fn first_active_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;
    async fn user_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError>;
}

/// Resolve request credentials into a bound context.
///
/// Precedence: bearer token is decoded first and any failure aborts
/// resolution outright. An API key then pins the org and overrides the
/// acting user with the org's admin representative, ignoring the org header.
/// With only a bearer token, the org header selects the membership, falling
/// back to the user's first active profile when absent.
pub async fn resolve_context(
    credentials: &RawCredentials,
    jwt: &JwtService,
    store: &dyn ContextStore,
) -> Result<Option<RequestContext>, ResolveError> {
    if credentials.is_empty() {
        return Ok(None);
    }

    let mut user_id: Option<Uuid> = None;

    if let Some(raw) = credentials.authorization.as_deref() {
        let token = raw
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                ResolveError::Authentication("Invalid authorization header format".to_string())
            })?
            .trim();
        let claims = jwt
            .decode(token, TokenType::Access)
            .map_err(|e| ResolveError::Authentication(e.to_string()))?;
        user_id = Some(claims.user_id);
    }

    // API key path: the key pins the org and the acting user is the org's
    // admin representative, regardless of the bearer token or org header.
    if let Some(api_key) = credentials.api_key.as_deref() {
        let org = store
            .org_by_api_key(api_key)
            .await
            .map_err(ResolveError::Store)?
            .ok_or_else(|| ResolveError::Authentication("Invalid API key".to_string()))?;

        let profile = store
            .org_admin_profile(org.id)
            .await
            .map_err(ResolveError::Store)?
            .ok_or_else(|| {
                ResolveError::TenantResolution(format!("Org {} has no admin profile", org.id))
            })?;

        let user = load_active_user(store, profile.user_id).await?;

        return Ok(Some(RequestContext {
            user,
            profile,
            org,
            org_pinned_by_api_key: true,
        }));
    }

    let Some(user_id) = user_id else {
        return Ok(None);
    };

    let profile = match credentials.org_header.as_deref() {
        Some(raw) => {
            let org_id = Uuid::parse_str(raw.trim()).map_err(|_| {
                ResolveError::TenantResolution(format!("Invalid org header: {}", raw))
            })?;
            store
                .active_profile_in_org(user_id, org_id)
                .await
                .map_err(ResolveError::Store)?
                .ok_or_else(|| {
                    ResolveError::TenantResolution(format!(
                        "No active profile for user {} in org {}",
                        user_id, org_id
                    ))
                })?
        }
        // Convenience fallback for clients that omit tenant selection
        // (e.g. interactive API explorers). Deterministic: oldest profile.
        None => store
            .first_active_profile(user_id)
            .await
            .map_err(ResolveError::Store)?
            .ok_or_else(|| {
                ResolveError::TenantResolution(format!("No active profile for user {}", user_id))
            })?,
    };

    let org = store
        .org_by_id(profile.org_id)
        .await
        .map_err(ResolveError::Store)?
        .ok_or_else(|| {
            ResolveError::TenantResolution(format!("Org {} not found", profile.org_id))
        })?;

    let user = load_active_user(store, user_id).await?;

    Ok(Some(RequestContext {
        user,
        profile,
        org,
        org_pinned_by_api_key: false,
    }))
}

async fn load_active_user(
    store: &dyn ContextStore,
    user_id: Uuid,
) -> Result<User, ResolveError> {
    let user = store
        .user_by_id(user_id)
        .await
        .map_err(ResolveError::Store)?
        .ok_or_else(|| ResolveError::Authentication(format!("Unknown user {}", user_id)))?;

    if !user.is_active {
        return Err(ResolveError::Authentication(format!(
            "User {} is inactive",
            user_id
        )));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cordia_core::models::ProfileRole;
    use std::collections::HashMap;

    /// In-memory store for exercising resolution without a database.
    #[derive(Default)]
    struct InMemoryStore {
        users: HashMap<Uuid, User>,
        orgs: HashMap<Uuid, Org>,
        profiles: Vec<Profile>,
        fail_lookups: bool,
    }

    impl InMemoryStore {
        fn add_user(&mut self, is_active: bool) -> Uuid {
            let id = Uuid::new_v4();
            self.users.insert(
                id,
                User {
                    id,
                    email: format!("{}@example.com", id),
                    password_hash: "hash".to_string(),
                    profile_pic: None,
                    is_active,
                    is_staff: false,
                    is_superuser: false,
                    last_login: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                },
            );
            id
        }

        fn add_org(&mut self, name: &str, api_key: &str) -> Uuid {
            let id = Uuid::new_v4();
            self.orgs.insert(
                id,
                Org {
                    id,
                    name: name.to_string(),
                    api_key: api_key.to_string(),
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                },
            );
            id
        }

        fn add_profile(
            &mut self,
            user_id: Uuid,
            org_id: Uuid,
            role: ProfileRole,
            is_active: bool,
        ) -> Uuid {
            let id = Uuid::new_v4();
            self.profiles.push(Profile {
                id,
                user_id,
                org_id,
                role,
                is_organization_admin: role == ProfileRole::Admin,
                is_active,
                phone: None,
                alternate_phone: None,
                address: None,
                has_sales_access: false,
                has_marketing_access: false,
                date_of_joining: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
            id
        }
    }

    #[async_trait]
    impl ContextStore for InMemoryStore {
        async fn org_by_api_key(&self, api_key: &str) -> Result<Option<Org>, AppError> {
            if self.fail_lookups {
                return Err(AppError::Internal("store down".to_string()));
            }
            Ok(self.orgs.values().find(|o| o.api_key == api_key).cloned())
        }

        async fn org_by_id(&self, org_id: Uuid) -> Result<Option<Org>, AppError> {
            if self.fail_lookups {
                return Err(AppError::Internal("store down".to_string()));
            }
            Ok(self.orgs.get(&org_id).cloned())
        }

        async fn org_admin_profile(&self, org_id: Uuid) -> Result<Option<Profile>, AppError> {
            if self.fail_lookups {
                return Err(AppError::Internal("store down".to_string()));
            }
            Ok(self
                .profiles
                .iter()
                .find(|p| p.org_id == org_id && p.role == ProfileRole::Admin && p.is_active)
                .cloned())
        }

        async fn active_profile_in_org(
            &self,
            user_id: Uuid,
            org_id: Uuid,
        ) -> Result<Option<Profile>, AppError> {
            if self.fail_lookups {
                return Err(AppError::Internal("store down".to_string()));
            }
            Ok(self
                .profiles
                .iter()
                .find(|p| p.user_id == user_id && p.org_id == org_id && p.is_active)
                .cloned())
        }

        async fn first_active_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
            if self.fail_lookups {
                return Err(AppError::Internal("store down".to_string()));
            }
            // Insertion order stands in for (created_at, id) ordering.
            Ok(self
                .profiles
                .iter()
                .find(|p| p.user_id == user_id && p.is_active)
                .cloned())
        }

        async fn user_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
            if self.fail_lookups {
                return Err(AppError::Internal("store down".to_string()));
            }
            Ok(self.users.get(&user_id).cloned())
        }
    }

    fn jwt() -> JwtService {
        JwtService::new("0123456789abcdef0123456789abcdef", "HS256", 1, 30).unwrap()
    }

    fn bearer(jwt: &JwtService, user_id: Uuid) -> Option<String> {
        Some(format!("Bearer {}", jwt.issue_access(user_id).unwrap()))
    }

    #[tokio::test]
    async fn no_credentials_resolves_to_none() {
        let store = InMemoryStore::default();
        let result = resolve_context(&RawCredentials::default(), &jwt(), &store)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn valid_token_with_org_header_binds_exactly_that_profile() {
        let mut store = InMemoryStore::default();
        let user = store.add_user(true);
        let org_a = store.add_org("Org A", "key-a");
        let org_b = store.add_org("Org B", "key-b");
        store.add_profile(user, org_a, ProfileRole::User, true);
        let profile_b = store.add_profile(user, org_b, ProfileRole::User, true);

        let jwt = jwt();
        let credentials = RawCredentials {
            authorization: bearer(&jwt, user),
            api_key: None,
            org_header: Some(org_b.to_string()),
        };

        let ctx = resolve_context(&credentials, &jwt, &store)
            .await
            .unwrap()
            .expect("context resolved");
        assert_eq!(ctx.profile.id, profile_b);
        assert_eq!(ctx.org.id, org_b);
        assert!(!ctx.org_pinned_by_api_key);
    }

    #[tokio::test]
    async fn valid_token_without_org_header_falls_back_to_first_profile() {
        let mut store = InMemoryStore::default();
        let user = store.add_user(true);
        let org = store.add_org("Solo Org", "key");
        let profile = store.add_profile(user, org, ProfileRole::User, true);

        let jwt = jwt();
        let credentials = RawCredentials {
            authorization: bearer(&jwt, user),
            ..Default::default()
        };

        let ctx = resolve_context(&credentials, &jwt, &store)
            .await
            .unwrap()
            .expect("context resolved");
        assert_eq!(ctx.profile.id, profile);
        assert_eq!(ctx.org.id, org);
    }

    #[tokio::test]
    async fn valid_token_with_no_profile_fails_tenant_resolution() {
        let mut store = InMemoryStore::default();
        let user = store.add_user(true);

        let jwt = jwt();
        let credentials = RawCredentials {
            authorization: bearer(&jwt, user),
            ..Default::default()
        };

        let err = resolve_context(&credentials, &jwt, &store)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "tenant_resolution");
    }

    #[tokio::test]
    async fn org_header_without_membership_is_rejected_despite_valid_token() {
        let mut store = InMemoryStore::default();
        let user = store.add_user(true);
        let org_a = store.add_org("Org A", "key-a");
        let org_b = store.add_org("Org B", "key-b");
        store.add_profile(user, org_a, ProfileRole::User, true);

        let jwt = jwt();
        let credentials = RawCredentials {
            authorization: bearer(&jwt, user),
            api_key: None,
            org_header: Some(org_b.to_string()),
        };

        let err = resolve_context(&credentials, &jwt, &store)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "tenant_resolution");
    }

    #[tokio::test]
    async fn inactive_profile_does_not_satisfy_org_header() {
        let mut store = InMemoryStore::default();
        let user = store.add_user(true);
        let org = store.add_org("Org", "key");
        store.add_profile(user, org, ProfileRole::User, false);

        let jwt = jwt();
        let credentials = RawCredentials {
            authorization: bearer(&jwt, user),
            api_key: None,
            org_header: Some(org.to_string()),
        };

        let err = resolve_context(&credentials, &jwt, &store)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "tenant_resolution");
    }

    #[tokio::test]
    async fn malformed_bearer_token_is_authentication_failure() {
        let mut store = InMemoryStore::default();
        let user = store.add_user(true);
        let org = store.add_org("Org", "key");
        store.add_profile(user, org, ProfileRole::User, true);

        let credentials = RawCredentials {
            authorization: Some("Bearer not-a-jwt".to_string()),
            ..Default::default()
        };

        let err = resolve_context(&credentials, &jwt(), &store)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "authentication");
    }

    #[tokio::test]
    async fn non_bearer_authorization_header_is_rejected_not_ignored() {
        let store = InMemoryStore::default();
        let credentials = RawCredentials {
            authorization: Some("Basic dXNlcjpwYXNz".to_string()),
            ..Default::default()
        };

        let err = resolve_context(&credentials, &jwt(), &store)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "authentication");
    }

    #[tokio::test]
    async fn api_key_resolves_org_and_admin_user_regardless_of_org_header() {
        let mut store = InMemoryStore::default();
        let admin = store.add_user(true);
        let acme = store.add_org("Acme", "acme-key");
        let other = store.add_org("Other", "other-key");
        let admin_profile = store.add_profile(admin, acme, ProfileRole::Admin, true);

        // org header pointing elsewhere must not win over the API key.
        let credentials = RawCredentials {
            authorization: None,
            api_key: Some("acme-key".to_string()),
            org_header: Some(other.to_string()),
        };

        let ctx = resolve_context(&credentials, &jwt(), &store)
            .await
            .unwrap()
            .expect("context resolved");
        assert_eq!(ctx.org.id, acme);
        assert_eq!(ctx.profile.id, admin_profile);
        assert_eq!(ctx.user.id, admin);
        assert!(ctx.org_pinned_by_api_key);
    }

    #[tokio::test]
    async fn api_key_overrides_bearer_identity() {
        let mut store = InMemoryStore::default();
        let admin = store.add_user(true);
        let someone_else = store.add_user(true);
        let acme = store.add_org("Acme", "acme-key");
        store.add_profile(admin, acme, ProfileRole::Admin, true);
        store.add_profile(someone_else, acme, ProfileRole::User, true);

        let jwt = jwt();
        let credentials = RawCredentials {
            authorization: bearer(&jwt, someone_else),
            api_key: Some("acme-key".to_string()),
            org_header: None,
        };

        let ctx = resolve_context(&credentials, &jwt, &store)
            .await
            .unwrap()
            .expect("context resolved");
        assert_eq!(ctx.user.id, admin);
    }

    #[tokio::test]
    async fn unknown_api_key_is_authentication_failure() {
        let mut store = InMemoryStore::default();
        store.add_org("Acme", "acme-key");

        let credentials = RawCredentials {
            api_key: Some("wrong-key".to_string()),
            ..Default::default()
        };

        let err = resolve_context(&credentials, &jwt(), &store)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "authentication");
    }

    #[tokio::test]
    async fn api_key_for_org_without_admin_fails_closed() {
        let mut store = InMemoryStore::default();
        let user = store.add_user(true);
        let org = store.add_org("Headless", "key");
        store.add_profile(user, org, ProfileRole::User, true);

        let credentials = RawCredentials {
            api_key: Some("key".to_string()),
            ..Default::default()
        };

        let err = resolve_context(&credentials, &jwt(), &store)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "tenant_resolution");
    }

    #[tokio::test]
    async fn invalid_bearer_aborts_even_with_valid_api_key() {
        let mut store = InMemoryStore::default();
        let admin = store.add_user(true);
        let acme = store.add_org("Acme", "acme-key");
        store.add_profile(admin, acme, ProfileRole::Admin, true);

        let credentials = RawCredentials {
            authorization: Some("Bearer expired-or-garbage".to_string()),
            api_key: Some("acme-key".to_string()),
            org_header: None,
        };

        let err = resolve_context(&credentials, &jwt(), &store)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "authentication");
    }

    #[tokio::test]
    async fn inactive_user_is_rejected() {
        let mut store = InMemoryStore::default();
        let user = store.add_user(false);
        let org = store.add_org("Org", "key");
        store.add_profile(user, org, ProfileRole::User, true);

        let jwt = jwt();
        let credentials = RawCredentials {
            authorization: bearer(&jwt, user),
            ..Default::default()
        };

        let err = resolve_context(&credentials, &jwt, &store)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "authentication");
    }

    #[tokio::test]
    async fn store_error_surfaces_as_store_failure_without_retry() {
        let mut store = InMemoryStore::default();
        let user = store.add_user(true);
        let org = store.add_org("Org", "key");
        store.add_profile(user, org, ProfileRole::User, true);

        let jwt = jwt();
        let credentials = RawCredentials {
            authorization: bearer(&jwt, user),
            ..Default::default()
        };
        store.fail_lookups = true;

        let err = resolve_context(&credentials, &jwt, &store)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "store");
    }

    #[tokio::test]
    async fn resolved_context_is_internally_consistent() {
        let mut store = InMemoryStore::default();
        let user = store.add_user(true);
        let org = store.add_org("Org", "key");
        store.add_profile(user, org, ProfileRole::Admin, true);

        let jwt = jwt();
        let credentials = RawCredentials {
            authorization: bearer(&jwt, user),
            ..Default::default()
        };

        let ctx = resolve_context(&credentials, &jwt, &store)
            .await
            .unwrap()
            .expect("context resolved");
        assert_eq!(ctx.profile.user_id, ctx.user.id);
        assert_eq!(ctx.profile.org_id, ctx.org.id);
        assert!(ctx.profile.is_active);
        assert!(ctx.user.is_active);
    }
}
