//! Company CRUD, org-scoped.

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

use cordia_core::models::Company;
use cordia_core::AppError;
use cordia_db::NewCompany;

use crate::auth::context::RequestContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompanyWriteRequest {
    pub name: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
}

impl CompanyWriteRequest {
    fn into_new_company(self) -> Result<NewCompany, AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidInput(
                "Company name is required".to_string(),
            ));
        }
        Ok(NewCompany {
            name,
            website: self.website,
            phone: self.phone,
            billing_address: self.billing_address,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/leads/companies",
    tag = "companies",
    responses((status = 200, description = "Companies of the caller's org", body = [Company]))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let companies = state
        .companies
        .list_by_org(ctx.org_id())
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(companies))
}

#[utoipa::path(
    post,
    path = "/api/leads/companies",
    tag = "companies",
    request_body = CompanyWriteRequest,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 409, description = "Name already used in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn create_company(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(body): ValidatedJson<CompanyWriteRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let new_company = body.into_new_company().map_err(HttpAppError::from)?;
    let company = state
        .companies
        .create(ctx.org_id(), &new_company)
        .await
        .map_err(HttpAppError::from)?;
    Ok((StatusCode::CREATED, Json(company)))
}

#[utoipa::path(
    get,
    path = "/api/leads/companies/{id}",
    tag = "companies",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 200, description = "Company", body = Company),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let company = state
        .companies
        .get_by_id(ctx.org_id(), id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("Company not found".to_string())))?;
    Ok(Json(company))
}

#[utoipa::path(
    put,
    path = "/api/leads/companies/{id}",
    tag = "companies",
    params(("id" = Uuid, Path, description = "Company id")),
    request_body = CompanyWriteRequest,
    responses(
        (status = 200, description = "Company updated", body = Company),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn update_company(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<CompanyWriteRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let new_company = body.into_new_company().map_err(HttpAppError::from)?;
    let company = state
        .companies
        .update(ctx.org_id(), id, &new_company)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("Company not found".to_string())))?;
    Ok(Json(company))
}

#[utoipa::path(
    delete,
    path = "/api/leads/companies/{id}",
    tag = "companies",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 204, description = "Company deleted"),
        (status = 404, description = "Not found in this org"),
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_company(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deleted = state
        .companies
        .delete(ctx.org_id(), id)
        .await
        .map_err(HttpAppError::from)?;
    if !deleted {
        return Err(AppError::NotFound("Company not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
