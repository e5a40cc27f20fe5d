//! Context-resolution middleware.
//!
//! Runs once per request, before any handler. On success the resolved
//! [`RequestContext`] is attached to the request extensions; a request with
//! no credentials passes through unauthenticated and protected handlers
//! reject it themselves. Every resolution failure, whatever its kind, is
//! mapped to one generic 403 so the response never reveals whether the
//! token, the API key, or the tenant lookup failed.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cordia_core::AppError;
use std::sync::Arc;

use crate::auth::context::ApiKeyOrg;
use crate::auth::jwt::JwtService;
use crate::auth::resolver::{resolve_context, ContextStore, RawCredentials};
use crate::error::HttpAppError;

/// State for the resolution middleware. The store is held as a trait object
/// so tests can run the full middleware against an in-memory store.
#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
    pub store: Arc<dyn ContextStore>,
}

impl AuthState {
    pub fn new(jwt: JwtService, store: Arc<dyn ContextStore>) -> Self {
        Self { jwt, store }
    }
}

pub async fn context_resolution_middleware(
    State(auth): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let credentials = RawCredentials::from_headers(request.headers());

    match resolve_context(&credentials, &auth.jwt, auth.store.as_ref()).await {
        Ok(Some(ctx)) => {
            if ctx.org_pinned_by_api_key {
                request.extensions_mut().insert(ApiKeyOrg(ctx.org.id));
            }
            tracing::debug!(
                user_id = %ctx.user.id,
                org_id = %ctx.org.id,
                api_key = ctx.org_pinned_by_api_key,
                "Request context resolved"
            );
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Ok(None) => next.run(request).await,
        Err(e) => {
            // Fail closed: the kind is logged for operators, never returned.
            tracing::warn!(kind = e.kind(), error = %e, "Request context resolution failed");
            HttpAppError(AppError::Forbidden).into_response()
        }
    }
}
