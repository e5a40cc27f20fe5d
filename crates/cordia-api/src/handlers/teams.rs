//! Team CRUD, org-scoped. Team membership references profiles of the same
//! org; foreign profile ids are silently dropped by the repository guard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use cordia_core::models::TeamWithMembers;
use cordia_core::AppError;
use cordia_db::NewTeam;

use crate::auth::context::RequestContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TeamWriteRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<Uuid>,
}

impl TeamWriteRequest {
    fn into_new_team(self) -> Result<NewTeam, AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Team name is required".to_string()));
        }
        Ok(NewTeam {
            name,
            description: self.description,
            members: self.members,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/teams",
    tag = "teams",
    responses((status = 200, description = "Teams of the caller's org", body = [TeamWithMembers]))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut response = Vec::new();
    for team in state
        .teams
        .list_by_org(ctx.org_id())
        .await
        .map_err(HttpAppError::from)?
    {
        let members = state
            .teams
            .list_members(team.id)
            .await
            .map_err(HttpAppError::from)?;
        response.push(TeamWithMembers { team, members });
    }
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/teams",
    tag = "teams",
    request_body = TeamWriteRequest,
    responses(
        (status = 201, description = "Team created", body = TeamWithMembers),
        (status = 409, description = "Name already used in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(body): ValidatedJson<TeamWriteRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let new_team = body.into_new_team().map_err(HttpAppError::from)?;
    let team = state
        .teams
        .create(ctx.org_id(), ctx.user.id, &new_team)
        .await
        .map_err(HttpAppError::from)?;
    let members = state
        .teams
        .list_members(team.id)
        .await
        .map_err(HttpAppError::from)?;
    Ok((StatusCode::CREATED, Json(TeamWithMembers { team, members })))
}

#[utoipa::path(
    get,
    path = "/api/teams/{id}",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Team id")),
    responses(
        (status = 200, description = "Team", body = TeamWithMembers),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let team = state
        .teams
        .get_by_id(ctx.org_id(), id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("Team not found".to_string())))?;
    let members = state
        .teams
        .list_members(team.id)
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(TeamWithMembers { team, members }))
}

#[utoipa::path(
    put,
    path = "/api/teams/{id}",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Team id")),
    request_body = TeamWriteRequest,
    responses(
        (status = 200, description = "Team updated", body = TeamWithMembers),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn update_team(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<TeamWriteRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let new_team = body.into_new_team().map_err(HttpAppError::from)?;
    let team = state
        .teams
        .update(ctx.org_id(), id, &new_team)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("Team not found".to_string())))?;
    let members = state
        .teams
        .list_members(team.id)
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(TeamWithMembers { team, members }))
}

#[utoipa::path(
    delete,
    path = "/api/teams/{id}",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Team id")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_team(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deleted = state
        .teams
        .delete(ctx.org_id(), id)
        .await
        .map_err(HttpAppError::from)?;
    if !deleted {
        return Err(AppError::NotFound("Team not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
