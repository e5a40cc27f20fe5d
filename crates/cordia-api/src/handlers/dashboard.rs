//! Org dashboard: headline counts for the resolved org.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::context::RequestContext;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub leads_count: i64,
    pub companies_count: i64,
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "dashboard",
    responses((status = 200, description = "Org headline counts", body = DashboardResponse))
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let org_id = ctx.org_id();

    let leads_count = state
        .leads
        .count_open(org_id)
        .await
        .map_err(HttpAppError::from)?;
    let companies_count = state
        .companies
        .count_by_org(org_id)
        .await
        .map_err(HttpAppError::from)?;

    Ok(Json(DashboardResponse {
        leads_count,
        companies_count,
    }))
}
