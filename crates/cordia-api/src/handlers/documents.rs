//! Document CRUD, org-scoped. File storage is external; only the reference
//! travels through this API.

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

use cordia_core::models::{Document, DocumentStatus};
use cordia_core::AppError;
use cordia_db::NewDocument;

use crate::auth::context::RequestContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DocumentWriteRequest {
    pub title: String,
    pub document_file: String,
    #[serde(default = "default_status")]
    pub status: DocumentStatus,
}

fn default_status() -> DocumentStatus {
    DocumentStatus::Active
}

impl DocumentWriteRequest {
    fn into_new_document(self) -> Result<NewDocument, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::InvalidInput(
                "Document title is required".to_string(),
            ));
        }
        Ok(NewDocument {
            title,
            document_file: self.document_file,
            status: self.status,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "documents",
    responses((status = 200, description = "Documents of the caller's org", body = [Document]))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let documents = state
        .documents
        .list_by_org(ctx.org_id())
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(documents))
}

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "documents",
    request_body = DocumentWriteRequest,
    responses((status = 201, description = "Document created", body = Document))
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn create_document(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(body): ValidatedJson<DocumentWriteRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let new_document = body.into_new_document().map_err(HttpAppError::from)?;
    let document = state
        .documents
        .create(ctx.org_id(), ctx.user.id, &new_document)
        .await
        .map_err(HttpAppError::from)?;
    Ok((StatusCode::CREATED, Json(document)))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document", body = Document),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .documents
        .get_by_id(ctx.org_id(), id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("Document not found".to_string())))?;
    Ok(Json(document))
}

#[utoipa::path(
    put,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = DocumentWriteRequest,
    responses(
        (status = 200, description = "Document updated", body = Document),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<DocumentWriteRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let new_document = body.into_new_document().map_err(HttpAppError::from)?;
    let document = state
        .documents
        .update(ctx.org_id(), id, &new_document)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("Document not found".to_string())))?;
    Ok(Json(document))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deleted = state
        .documents
        .delete(ctx.org_id(), id)
        .await
        .map_err(HttpAppError::from)?;
    if !deleted {
        return Err(AppError::NotFound("Document not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
