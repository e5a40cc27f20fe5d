//! Login, registration, and token refresh.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use cordia_core::validation::{normalize_email, validate_email, validate_password};
use cordia_core::AppError;
use cordia_db::NewUser;

use crate::auth::jwt::{TokenPair, TokenType};
use crate::auth::provisioning::ensure_default_membership;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Login with email (case-insensitive) and password, returning a JWT pair.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "JWT token pair"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "User inactive"),
    )
)]
#[tracing::instrument(skip(state, body))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state
        .users
        .get_by_email(&normalize_email(&body.email))
        .await
        .map_err(HttpAppError::from)?;

    // Same rejection whether the email is unknown or the password is wrong.
    let Some(user) = user else {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()).into());
    };
    let password_ok = bcrypt::verify(&body.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
    if !password_ok {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()).into());
    }
    if !user.is_active {
        return Err(AppError::PermissionDenied("User inactive".to_string()).into());
    }

    state
        .users
        .update_last_login(user.id)
        .await
        .map_err(HttpAppError::from)?;

    let pair: TokenPair = state.jwt.issue_pair(user.id).map_err(HttpAppError::from)?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(pair))
}

/// Self-registration: create the account and bind it to the fallback org so
/// the new identity always resolves to some tenant.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created; JWT token pair"),
        (status = 409, description = "Email already registered"),
    )
)]
#[tracing::instrument(skip(state, body))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    validate_email(&body.email).map_err(HttpAppError::from)?;
    validate_password(&body.password).map_err(HttpAppError::from)?;

    let password_hash = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

    let user = state
        .users
        .create_user(&NewUser {
            email: normalize_email(&body.email),
            password_hash,
            profile_pic: None,
            is_active: true,
            is_staff: false,
        })
        .await
        .map_err(HttpAppError::from)?;

    ensure_default_membership(&state, user.id)
        .await
        .map_err(HttpAppError::from)?;

    let pair = state.jwt.issue_pair(user.id).map_err(HttpAppError::from)?;
    Ok((StatusCode::CREATED, Json(pair)))
}

/// Exchange a refresh token for a fresh access token.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token"),
        (status = 401, description = "Invalid refresh token"),
    )
)]
#[tracing::instrument(skip(state, body))]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<RefreshRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let claims = state
        .jwt
        .decode(&body.refresh, TokenType::Refresh)
        .map_err(HttpAppError::from)?;

    let user = state
        .users
        .get_by_id(claims.user_id)
        .await
        .map_err(HttpAppError::from)?
        .filter(|u| u.is_active)
        .ok_or_else(|| HttpAppError::from(AppError::Unauthorized("Invalid token".to_string())))?;

    let access = state.jwt.issue_access(user.id).map_err(HttpAppError::from)?;
    Ok(Json(serde_json::json!({ "access": access })))
}
