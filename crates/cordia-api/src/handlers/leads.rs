//! Lead CRUD plus lead comments and attachments.
//!
//! Everything is scoped by the resolved org. Non-admin members additionally
//! only see leads assigned to them or created by them.

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

use cordia_core::models::{Lead, LeadSource, LeadStatus, ProfileRole};
use cordia_core::AppError;
use cordia_db::NewLead;

use crate::auth::context::RequestContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LeadWriteRequest {
    pub title: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default = "default_status")]
    pub status: LeadStatus,
    pub source: Option<LeadSource>,
    pub company_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub description: Option<String>,
    pub website: Option<String>,
}

fn default_status() -> LeadStatus {
    LeadStatus::Assigned
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentCreateRequest {
    pub comment: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttachmentCreateRequest {
    pub file_name: String,
    pub attachment: String,
}

impl LeadWriteRequest {
    fn into_new_lead(self) -> Result<NewLead, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Lead title is required".to_string()));
        }
        Ok(NewLead {
            title,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            status: self.status,
            source: self.source,
            company_id: self.company_id,
            assigned_to: self.assigned_to,
            description: self.description,
            website: self.website,
        })
    }
}

/// Whether the caller sees every lead in the org, or only their own slice.
fn visibility_restriction(ctx: &RequestContext) -> Option<(Uuid, Uuid)> {
    if ctx.profile.role == ProfileRole::Admin || ctx.user.is_superuser {
        None
    } else {
        Some((ctx.profile.id, ctx.user.id))
    }
}

fn lead_visible_to(ctx: &RequestContext, lead: &Lead) -> bool {
    match visibility_restriction(ctx) {
        None => true,
        Some((profile_id, user_id)) => {
            lead.assigned_to == Some(profile_id) || lead.created_by == user_id
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "leads",
    responses((status = 200, description = "Leads visible to the caller", body = [Lead]))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let leads = state
        .leads
        .list_visible(ctx.org_id(), visibility_restriction(&ctx))
        .await
        .map_err(HttpAppError::from)?;

    Ok(Json(leads))
}

#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "leads",
    request_body = LeadWriteRequest,
    responses((status = 201, description = "Lead created", body = Lead))
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(body): ValidatedJson<LeadWriteRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let new_lead = body.into_new_lead().map_err(HttpAppError::from)?;
    let lead = state
        .leads
        .create(ctx.org_id(), ctx.user.id, &new_lead)
        .await
        .map_err(HttpAppError::from)?;

    Ok((StatusCode::CREATED, Json(lead)))
}

#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "leads",
    params(("id" = Uuid, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead", body = Lead),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let lead = fetch_visible_lead(&state, &ctx, id).await?;
    Ok(Json(lead))
}

#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "leads",
    params(("id" = Uuid, Path, description = "Lead id")),
    request_body = LeadWriteRequest,
    responses(
        (status = 200, description = "Lead updated", body = Lead),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<LeadWriteRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    fetch_visible_lead(&state, &ctx, id).await?;

    let new_lead = body.into_new_lead().map_err(HttpAppError::from)?;
    let lead = state
        .leads
        .update(ctx.org_id(), id, &new_lead)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("Lead not found".to_string())))?;

    Ok(Json(lead))
}

#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "leads",
    params(("id" = Uuid, Path, description = "Lead id")),
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    fetch_visible_lead(&state, &ctx, id).await?;

    state
        .leads
        .delete(ctx.org_id(), id)
        .await
        .map_err(HttpAppError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/leads/{id}/comments",
    tag = "leads",
    params(("id" = Uuid, Path, description = "Lead id")),
    responses((status = 200, description = "Comments on the lead"))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    fetch_visible_lead(&state, &ctx, id).await?;

    let comments = state
        .comments
        .list_by_lead(id)
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(comments))
}

#[utoipa::path(
    post,
    path = "/api/leads/{id}/comments",
    tag = "leads",
    params(("id" = Uuid, Path, description = "Lead id")),
    request_body = CommentCreateRequest,
    responses((status = 201, description = "Comment added"))
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<CommentCreateRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    fetch_visible_lead(&state, &ctx, id).await?;

    let comment = body.comment.trim();
    if comment.is_empty() {
        return Err(AppError::InvalidInput("Comment is required".to_string()).into());
    }

    let created = state
        .comments
        .create(id, ctx.profile.id, comment)
        .await
        .map_err(HttpAppError::from)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/leads/{id}/attachments",
    tag = "leads",
    params(("id" = Uuid, Path, description = "Lead id")),
    responses((status = 200, description = "Attachments on the lead"))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_attachments(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    fetch_visible_lead(&state, &ctx, id).await?;

    let attachments = state
        .attachments
        .list_by_lead(id)
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(attachments))
}

#[utoipa::path(
    post,
    path = "/api/leads/{id}/attachments",
    tag = "leads",
    params(("id" = Uuid, Path, description = "Lead id")),
    request_body = AttachmentCreateRequest,
    responses((status = 201, description = "Attachment recorded"))
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn create_attachment(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<AttachmentCreateRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    fetch_visible_lead(&state, &ctx, id).await?;

    if body.file_name.trim().is_empty() {
        return Err(AppError::InvalidInput("file_name is required".to_string()).into());
    }

    let created = state
        .attachments
        .create(id, ctx.user.id, body.file_name.trim(), &body.attachment)
        .await
        .map_err(HttpAppError::from)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetch a lead in the caller's org, applying the non-admin visibility rule.
/// Outside-the-slice leads answer 404, not 403, so their existence leaks
/// nothing.
async fn fetch_visible_lead(
    state: &AppState,
    ctx: &RequestContext,
    id: Uuid,
) -> Result<Lead, HttpAppError> {
    let lead = state
        .leads
        .get_by_id(ctx.org_id(), id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("Lead not found".to_string())))?;

    if !lead_visible_to(ctx, &lead) {
        return Err(AppError::NotFound("Lead not found".to_string()).into());
    }

    Ok(lead)
}
