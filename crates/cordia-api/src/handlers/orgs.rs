//! Org creation and the caller's org listing.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use cordia_core::models::{Org, Profile};
use cordia_core::validation::validate_org_name;

use crate::auth::api_key::generate_org_api_key;
use crate::auth::context::RequestContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrgRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrgResponse {
    pub org: Org,
    pub profile: Profile,
}

/// One entry of the caller's org listing: their membership plus the org.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileOrgEntry {
    pub role: cordia_core::models::ProfileRole,
    pub is_organization_admin: bool,
    pub is_active: bool,
    pub org: Org,
}

/// Create an org. The caller becomes its first admin: the org row, a fresh
/// API key, and the ADMIN profile are committed as one unit.
#[utoipa::path(
    post,
    path = "/api/org",
    tag = "orgs",
    request_body = CreateOrgRequest,
    responses(
        (status = 201, description = "Org created", body = CreateOrgResponse),
        (status = 400, description = "Invalid org name"),
        (status = 409, description = "Org name already taken"),
    )
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn create_org(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(body): ValidatedJson<CreateOrgRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let name = body.name.trim();
    validate_org_name(name).map_err(HttpAppError::from)?;

    let api_key = generate_org_api_key();
    let (org, profile) = state
        .orgs
        .create_org_with_admin(name, &api_key, ctx.user.id)
        .await
        .map_err(HttpAppError::from)?;

    Ok((StatusCode::CREATED, Json(CreateOrgResponse { org, profile })))
}

/// List the orgs the caller belongs to, with their membership in each.
#[utoipa::path(
    get,
    path = "/api/org",
    tag = "orgs",
    responses((status = 200, description = "Caller's orgs", body = [ProfileOrgEntry]))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_my_orgs(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let entries: Vec<ProfileOrgEntry> = state
        .profiles
        .list_for_user_with_orgs(ctx.user.id)
        .await
        .map_err(HttpAppError::from)?
        .into_iter()
        .map(|(profile, org)| ProfileOrgEntry {
            role: profile.role,
            is_organization_admin: profile.is_organization_admin,
            is_active: profile.is_active,
            org,
        })
        .collect();

    Ok(Json(entries))
}
