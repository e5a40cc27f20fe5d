//! Current-profile view and the combined teams/users roster.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use cordia_core::models::{Profile, TeamWithMembers};

use crate::auth::context::RequestContext;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user_obj: Profile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamsAndProfilesResponse {
    pub teams: Vec<TeamWithMembers>,
    pub profiles: Vec<Profile>,
}

/// The caller's resolved profile for the current org.
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "users",
    responses((status = 200, description = "Resolved profile", body = ProfileResponse))
)]
#[tracing::instrument(skip(ctx))]
pub async fn get_profile(ctx: RequestContext) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(ProfileResponse {
        user_obj: ctx.profile,
    }))
}

/// All teams and active profiles of the caller's org.
#[utoipa::path(
    get,
    path = "/api/teams-users",
    tag = "users",
    responses((status = 200, description = "Teams and profiles", body = TeamsAndProfilesResponse))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn teams_users(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let org_id = ctx.org_id();

    let mut teams = Vec::new();
    for team in state
        .teams
        .list_by_org(org_id)
        .await
        .map_err(HttpAppError::from)?
    {
        let members = state
            .teams
            .list_members(team.id)
            .await
            .map_err(HttpAppError::from)?;
        teams.push(TeamWithMembers { team, members });
    }

    let profiles = state
        .profiles
        .list_active_by_org(org_id)
        .await
        .map_err(HttpAppError::from)?;

    Ok(Json(TeamsAndProfilesResponse { teams, profiles }))
}
