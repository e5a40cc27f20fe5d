//! End-to-end tests of the context-resolution middleware over a real router,
//! backed by an in-memory store. Covers the full credential matrix: bearer
//! token, org API key, org header, and their failure modes.

use async_trait::async_trait;
use axum::{middleware::from_fn_with_state, response::IntoResponse, routing::get, Json, Router};
use axum_test::TestServer;
use chrono::Utc;
use cordia_api::auth::{
    context_resolution_middleware, is_org_admin, AuthState, ContextStore, JwtService,
    RequestContext,
};
use cordia_core::models::{Org, Profile, ProfileRole, User};
use cordia_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";

/// In-memory store shared by all tests in this file.
#[derive(Default, Clone)]
struct FakeStore {
    users: Vec<User>,
    orgs: Vec<Org>,
    profiles: Vec<Profile>,
}

impl FakeStore {
    fn add_user(&mut self, is_active: bool, is_staff: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.users.push(User {
            id,
            email: format!("{}@example.com", id),
            password_hash: "hash".to_string(),
            profile_pic: None,
            is_active,
            is_staff,
            is_superuser: false,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    fn add_org(&mut self, name: &str, api_key: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.orgs.push(Org {
            id,
            name: name.to_string(),
            api_key: api_key.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    fn add_profile(
        &mut self,
        user_id: Uuid,
        org_id: Uuid,
        role: ProfileRole,
        is_organization_admin: bool,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.profiles.push(Profile {
            id,
            user_id,
            org_id,
            role,
            is_organization_admin,
            is_active: true,
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
impl ContextStore for FakeStore {
    async fn org_by_api_key(&self, api_key: &str) -> Result<Option<Org>, AppError> {
        Ok(self.orgs.iter().find(|o| o.api_key == api_key).cloned())
    }

    async fn org_by_id(&self, org_id: Uuid) -> Result<Option<Org>, AppError> {
        Ok(self.orgs.iter().find(|o| o.id == org_id).cloned())
    }

    async fn org_admin_profile(&self, org_id: Uuid) -> Result<Option<Profile>, AppError> {
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
        Ok(self
            .profiles
            .iter()
            .find(|p| p.user_id == user_id && p.org_id == org_id && p.is_active)
            .cloned())
    }

    async fn first_active_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.user_id == user_id && p.is_active)
            .cloned())
    }

    async fn user_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.iter().find(|u| u.id == user_id).cloned())
    }
}

async fn whoami(ctx: RequestContext) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "user_id": ctx.user.id,
        "profile_id": ctx.profile.id,
        "org_id": ctx.org.id,
        "api_key_pinned": ctx.org_pinned_by_api_key,
    }))
}

async fn admin_only(ctx: RequestContext) -> impl IntoResponse {
    if !is_org_admin(Some(&ctx)) {
        return (
            axum::http::StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "error": "No organization admin context" })),
        );
    }
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({ "ok": true })),
    )
}

async fn open() -> &'static str {
    "ok"
}

fn test_server(store: FakeStore) -> (TestServer, JwtService) {
    let jwt = JwtService::new(TEST_SECRET, "HS256", 1, 30).expect("jwt service");
    let auth_state = Arc::new(AuthState::new(jwt.clone(), Arc::new(store)));

    let app = Router::new()
        .route("/whoami", get(whoami))
        .route("/admin-only", get(admin_only))
        .route("/open", get(open))
        .layer(from_fn_with_state(auth_state, context_resolution_middleware));

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");
    (server, jwt)
}

fn bearer(jwt: &JwtService, user_id: Uuid) -> String {
    format!("Bearer {}", jwt.issue_access(user_id).expect("token"))
}

#[tokio::test]
async fn unauthenticated_request_passes_open_routes_but_not_protected_ones() {
    let (server, _jwt) = test_server(FakeStore::default());

    let response = server.get("/open").await;
    response.assert_status_ok();

    let response = server.get("/whoami").await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn org_header_selects_exactly_that_membership() {
    let mut store = FakeStore::default();
    let user = store.add_user(true, false);
    let org_a = store.add_org("Org A", "key-a");
    let org_b = store.add_org("Org B", "key-b");
    store.add_profile(user, org_a, ProfileRole::User, false);
    let profile_b = store.add_profile(user, org_b, ProfileRole::User, false);

    let (server, jwt) = test_server(store);

    let response = server
        .get("/whoami")
        .add_header("Authorization", bearer(&jwt, user))
        .add_header("org", org_b.to_string())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["org_id"], serde_json::json!(org_b));
    assert_eq!(body["profile_id"], serde_json::json!(profile_b));
    assert_eq!(body["api_key_pinned"], serde_json::json!(false));
}

#[tokio::test]
async fn missing_org_header_falls_back_to_first_active_profile() {
    let mut store = FakeStore::default();
    let user = store.add_user(true, false);
    let org = store.add_org("Solo", "key");
    let profile = store.add_profile(user, org, ProfileRole::User, false);

    let (server, jwt) = test_server(store);

    let response = server
        .get("/whoami")
        .add_header("Authorization", bearer(&jwt, user))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["org_id"], serde_json::json!(org));
    assert_eq!(body["profile_id"], serde_json::json!(profile));
}

#[tokio::test]
async fn valid_token_without_any_profile_is_rejected_everywhere() {
    let mut store = FakeStore::default();
    let user = store.add_user(true, false);

    let (server, jwt) = test_server(store);

    // Fail-closed: even a route that needs no context rejects when presented
    // credentials cannot be resolved to a tenant.
    let response = server
        .get("/open")
        .add_header("Authorization", bearer(&jwt, user))
        .await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn foreign_org_header_is_rejected_despite_valid_token() {
    let mut store = FakeStore::default();
    let user = store.add_user(true, false);
    let org_a = store.add_org("Mine", "key-a");
    let org_b = store.add_org("Theirs", "key-b");
    store.add_profile(user, org_a, ProfileRole::User, false);

    let (server, jwt) = test_server(store);

    let response = server
        .get("/whoami")
        .add_header("Authorization", bearer(&jwt, user))
        .add_header("org", org_b.to_string())
        .await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);

    // The rejection is generic: no hint which step failed.
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], serde_json::json!("Forbidden"));
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn api_key_pins_org_and_acts_as_its_admin() {
    let mut store = FakeStore::default();
    let admin = store.add_user(true, false);
    let acme = store.add_org("Acme", "acme-key");
    let other = store.add_org("Other", "other-key");
    let admin_profile = store.add_profile(admin, acme, ProfileRole::Admin, true);

    let (server, _jwt) = test_server(store);

    // org header pointing at another org is ignored on the API-key path.
    let response = server
        .get("/whoami")
        .add_header("Token", "acme-key")
        .add_header("org", other.to_string())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["org_id"], serde_json::json!(acme));
    assert_eq!(body["user_id"], serde_json::json!(admin));
    assert_eq!(body["profile_id"], serde_json::json!(admin_profile));
    assert_eq!(body["api_key_pinned"], serde_json::json!(true));
}

#[tokio::test]
async fn unknown_api_key_is_rejected_generically() {
    let mut store = FakeStore::default();
    store.add_org("Acme", "acme-key");

    let (server, _jwt) = test_server(store);

    let response = server.get("/whoami").add_header("Token", "nope").await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], serde_json::json!("Forbidden"));
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let mut store = FakeStore::default();
    let user = store.add_user(true, false);
    let org = store.add_org("Org", "key");
    store.add_profile(user, org, ProfileRole::User, false);

    let (server, _jwt) = test_server(store);

    let response = server
        .get("/whoami")
        .add_header("Authorization", "Bearer garbage")
        .await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_gate_rejects_plain_member_and_passes_org_admin() {
    let mut store = FakeStore::default();
    let member = store.add_user(true, false);
    let admin = store.add_user(true, false);
    let org = store.add_org("Org", "key");
    store.add_profile(member, org, ProfileRole::User, false);
    store.add_profile(admin, org, ProfileRole::User, true);

    let (server, jwt) = test_server(store);

    let response = server
        .get("/admin-only")
        .add_header("Authorization", bearer(&jwt, member))
        .await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["error"],
        serde_json::json!("No organization admin context")
    );

    let response = server
        .get("/admin-only")
        .add_header("Authorization", bearer(&jwt, admin))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn staff_passes_admin_gate_without_org_admin_flag() {
    let mut store = FakeStore::default();
    let staff = store.add_user(true, true);
    let org = store.add_org("Org", "key");
    store.add_profile(staff, org, ProfileRole::User, false);

    let (server, jwt) = test_server(store);

    let response = server
        .get("/admin-only")
        .add_header("Authorization", bearer(&jwt, staff))
        .await;
    response.assert_status_ok();
}
