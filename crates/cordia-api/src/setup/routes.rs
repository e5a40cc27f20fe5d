//! Route setup.
//!
//! The context-resolution middleware is layered over the whole router: it
//! runs for every request, attaches the resolved context when credentials
//! are present, and fails closed when they are present but broken. Handlers
//! that require authentication enforce it via the `RequestContext` extractor.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::auth::middleware::{context_resolution_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;

pub fn setup_routes(state: Arc<AppState>, auth_state: Arc<AuthState>) -> Router {
    let cors = if state.config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        // Auth (no resolved context required)
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        // Orgs
        .route(
            "/api/org",
            post(handlers::orgs::create_org).get(handlers::orgs::list_my_orgs),
        )
        // Profile / roster / dashboard
        .route("/api/profile", get(handlers::profile::get_profile))
        .route("/api/teams-users", get(handlers::profile::teams_users))
        .route("/api/dashboard", get(handlers::dashboard::dashboard))
        // User management
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/api/users/me/password", post(handlers::users::me_password))
        .route(
            "/api/users/{id}/password",
            post(handlers::users::admin_reset_password),
        )
        // Leads
        .route(
            "/api/leads",
            get(handlers::leads::list_leads).post(handlers::leads::create_lead),
        )
        .route(
            "/api/leads/{id}",
            get(handlers::leads::get_lead)
                .put(handlers::leads::update_lead)
                .delete(handlers::leads::delete_lead),
        )
        .route(
            "/api/leads/{id}/comments",
            get(handlers::leads::list_comments).post(handlers::leads::create_comment),
        )
        .route(
            "/api/leads/{id}/attachments",
            get(handlers::leads::list_attachments).post(handlers::leads::create_attachment),
        )
        // Companies
        .route(
            "/api/leads/companies",
            get(handlers::companies::list_companies).post(handlers::companies::create_company),
        )
        .route(
            "/api/leads/companies/{id}",
            get(handlers::companies::get_company)
                .put(handlers::companies::update_company)
                .delete(handlers::companies::delete_company),
        )
        // Teams
        .route(
            "/api/teams",
            get(handlers::teams::list_teams).post(handlers::teams::create_team),
        )
        .route(
            "/api/teams/{id}",
            get(handlers::teams::get_team)
                .put(handlers::teams::update_team)
                .delete(handlers::teams::delete_team),
        )
        // Documents
        .route(
            "/api/documents",
            get(handlers::documents::list_documents).post(handlers::documents::create_document),
        )
        .route(
            "/api/documents/{id}",
            get(handlers::documents::get_document)
                .put(handlers::documents::update_document)
                .delete(handlers::documents::delete_document),
        )
        // OpenAPI document
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(from_fn_with_state(
            auth_state,
            context_resolution_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
