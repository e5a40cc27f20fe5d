//! Resolved per-request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::Json;
use cordia_core::models::{Org, Profile, User};
use uuid::Uuid;

use crate::error::ErrorResponse;

/// Fully bound request context: the acting user, their membership in exactly
/// one org, and that org. Constructed once per request by the resolution
/// middleware and dropped with the request.
///
/// Invariants guaranteed by construction: `profile.user_id == user.id`,
/// `profile.org_id == org.id`, `profile.is_active`, and `user.is_active`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: User,
    pub profile: Profile,
    pub org: Org,
    /// True when the org was pinned by an API key rather than chosen by the
    /// caller's org header or the fallback.
    pub org_pinned_by_api_key: bool,
}

impl RequestContext {
    /// Org id every tenant-scoped query must filter by.
    pub fn org_id(&self) -> Uuid {
        self.org.id
    }
}

/// Org id derived from an API key, written into request extensions for
/// downstream consumers that care how the tenant was selected.
#[derive(Debug, Clone, Copy)]
pub struct ApiKeyOrg(pub Uuid);

// Handlers take `ctx: RequestContext` as an argument; a request that reached
// a protected handler without a resolved context is unauthenticated and is
// rejected here with the same generic outcome as a resolution failure.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = (axum::http::StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    axum::http::StatusCode::FORBIDDEN,
                    Json(ErrorResponse {
                        error: "Forbidden".to_string(),
                        details: None,
                        error_type: None,
                        code: "FORBIDDEN".to_string(),
                        recoverable: false,
                        suggested_action: Some(
                            "Check authentication token, API key, and org header".to_string(),
                        ),
                    }),
                )
            })
    }
}
