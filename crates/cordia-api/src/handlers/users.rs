//! Org-admin gated user management and password operations.
//!
//! Platform admins (staff/superuser) operate across orgs; org admins are
//! scoped strictly to their own org's members.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use cordia_core::models::User;
use cordia_core::validation::{normalize_email, validate_email, validate_password};
use cordia_core::AppError;
use cordia_db::NewUser;

use crate::auth::context::RequestContext;
use crate::auth::permissions::{is_org_admin, is_self_or_org_admin};
use crate::auth::provisioning::ensure_default_membership;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

const NO_ORG_ADMIN_CONTEXT: &str = "No organization admin context";

#[derive(Debug, Serialize, ToSchema)]
pub struct UserReadResponse {
    pub id: Uuid,
    pub email: String,
    pub profile_pic: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserReadResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            profile_pic: user.profile_pic,
            is_active: user.is_active,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminUserCreateRequest {
    pub email: String,
    pub password: String,
    pub profile_pic: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminUserUpdateRequest {
    pub profile_pic: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminPasswordResetRequest {
    pub new_password: String,
}

fn require_org_admin(ctx: &RequestContext) -> Result<(), HttpAppError> {
    if !is_org_admin(Some(ctx)) {
        return Err(AppError::PermissionDenied(NO_ORG_ADMIN_CONTEXT.to_string()).into());
    }
    Ok(())
}

/// Whether the target user is manageable by the caller: platform admins see
/// everyone, org admins only members of their own org.
async fn target_in_scope(
    state: &AppState,
    ctx: &RequestContext,
    target_user_id: Uuid,
) -> Result<bool, HttpAppError> {
    if ctx.user.is_platform_admin() {
        return Ok(true);
    }
    Ok(state
        .profiles
        .get_active_for_user_in_org(target_user_id, ctx.org_id())
        .await
        .map_err(HttpAppError::from)?
        .is_some())
}

/// List users: all of them for platform admins, the caller's org otherwise.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "Users visible to the caller", body = [UserReadResponse]),
        (status = 403, description = "Not an org admin"),
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, HttpAppError> {
    require_org_admin(&ctx)?;

    let users = if ctx.user.is_platform_admin() {
        state.users.list_all().await.map_err(HttpAppError::from)?
    } else {
        state
            .users
            .list_by_org(ctx.org_id())
            .await
            .map_err(HttpAppError::from)?
    };

    let response: Vec<UserReadResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// Create a user. Org admins attach the new user to their own org
/// atomically; platform admins create a bare account, which then goes
/// through default-org provisioning so it still resolves somewhere.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = AdminUserCreateRequest,
    responses(
        (status = 201, description = "User created", body = UserReadResponse),
        (status = 403, description = "Not an org admin"),
        (status = 409, description = "Email already registered"),
    )
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(body): ValidatedJson<AdminUserCreateRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_org_admin(&ctx)?;
    validate_email(&body.email).map_err(HttpAppError::from)?;
    validate_password(&body.password).map_err(HttpAppError::from)?;

    let password_hash = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
    let new_user = NewUser {
        email: normalize_email(&body.email),
        password_hash,
        profile_pic: body.profile_pic.clone(),
        is_active: body.is_active,
        // Only a platform admin may mint another staff account.
        is_staff: body.is_staff && ctx.user.is_platform_admin(),
    };

    let user = if ctx.user.is_platform_admin() {
        let user = state
            .users
            .create_user(&new_user)
            .await
            .map_err(HttpAppError::from)?;
        ensure_default_membership(&state, user.id)
            .await
            .map_err(HttpAppError::from)?;
        user
    } else {
        let (user, _profile) = state
            .users
            .create_user_with_profile(&new_user, ctx.org_id())
            .await
            .map_err(HttpAppError::from)?;
        user
    };

    Ok((StatusCode::CREATED, Json(UserReadResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserReadResponse),
        (status = 404, description = "Not found or out of scope"),
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_org_admin(&ctx)?;
    if !target_in_scope(&state, &ctx, id).await? {
        return Err(AppError::NotFound("User not found".to_string()).into());
    }

    let user = state
        .users
        .get_by_id(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("User not found".to_string())))?;

    Ok(Json(UserReadResponse::from(user)))
}

/// Update a user's admin-editable fields. The email is immutable; the staff
/// flag only moves when a platform admin asks.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = AdminUserUpdateRequest,
    responses(
        (status = 200, description = "User updated", body = UserReadResponse),
        (status = 404, description = "Not found or out of scope"),
    )
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<AdminUserUpdateRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_org_admin(&ctx)?;
    if !target_in_scope(&state, &ctx, id).await? {
        return Err(AppError::NotFound("User not found".to_string()).into());
    }

    let is_staff = body.is_staff.filter(|_| ctx.user.is_platform_admin());
    let user = state
        .users
        .update_admin_fields(id, body.profile_pic, body.is_active, is_staff)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("User not found".to_string())))?;

    Ok(Json(UserReadResponse::from(user)))
}

/// Remove a user from service by deactivating the account. Rows are kept;
/// deactivation is preferred over deletion.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deactivated"),
        (status = 404, description = "Not found or out of scope"),
    )
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_org_admin(&ctx)?;
    if !target_in_scope(&state, &ctx, id).await? {
        return Err(AppError::NotFound("User not found".to_string()).into());
    }

    let removed = state
        .users
        .set_active(id, false)
        .await
        .map_err(HttpAppError::from)?;
    if !removed {
        return Err(AppError::NotFound("User not found".to_string()).into());
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Change the caller's own password. Always permitted for oneself; the
/// current password is verified first.
#[utoipa::path(
    post,
    path = "/api/users/me/password",
    tag = "users",
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Wrong current password or weak new one"),
    )
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn me_password(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(body): ValidatedJson<PasswordChangeRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let current_ok = bcrypt::verify(&body.current_password, &ctx.user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
    if !current_ok {
        return Err(AppError::BadRequest("Current password is incorrect".to_string()).into());
    }
    validate_password(&body.new_password).map_err(HttpAppError::from)?;

    let password_hash = bcrypt::hash(&body.new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
    state
        .users
        .update_password(ctx.user.id, &password_hash)
        .await
        .map_err(HttpAppError::from)?;

    tracing::info!(user_id = %ctx.user.id, "Password changed");
    Ok(Json(serde_json::json!({ "detail": "Password updated." })))
}

/// Reset another user's password. Staff reach anyone; org admins only
/// members of their own org.
#[utoipa::path(
    post,
    path = "/api/users/{id}/password",
    tag = "users",
    params(("id" = Uuid, Path, description = "Target user id")),
    request_body = AdminPasswordResetRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 403, description = "Not an org admin"),
        (status = 404, description = "Target not found or out of scope"),
    )
)]
#[tracing::instrument(skip(state, ctx, body))]
pub async fn admin_reset_password(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<AdminPasswordResetRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !is_self_or_org_admin(Some(&ctx), id) {
        require_org_admin(&ctx)?;
        if !target_in_scope(&state, &ctx, id).await? {
            return Err(AppError::NotFound("User not found".to_string()).into());
        }
    }
    validate_password(&body.new_password).map_err(HttpAppError::from)?;

    let password_hash = bcrypt::hash(&body.new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
    let updated = state
        .users
        .update_password(id, &password_hash)
        .await
        .map_err(HttpAppError::from)?;
    if !updated {
        return Err(AppError::NotFound("User not found".to_string()).into());
    }

    tracing::info!(target_user_id = %id, by = %ctx.user.id, "Password reset");
    Ok(Json(serde_json::json!({ "detail": "Password reset." })))
}
