//! Default-org provisioning for freshly created users.
//!
//! Invoked synchronously by every user-creation path (registration and
//! admin creation) as an explicit post-creation step: if the user holds no
//! profile at all, the fallback org is created on demand and a membership is
//! attached. This guarantees the resolver's no-org-header fallback never
//! dead-ends for a new account.

use cordia_core::config::DEFAULT_ORG_NAME;
use cordia_core::models::Profile;
use cordia_core::AppError;
use uuid::Uuid;

use crate::auth::api_key::generate_org_api_key;
use crate::state::AppState;

/// Ensure the user is bound to at least one org. Idempotent: a user that
/// already holds any profile (active or not) is left untouched and `None`
/// is returned; otherwise the newly attached default-org profile comes back.
pub async fn ensure_default_membership(
    state: &AppState,
    user_id: Uuid,
) -> Result<Option<Profile>, AppError> {
    if state.profiles.exists_for_user(user_id).await? {
        return Ok(None);
    }

    let org = state
        .orgs
        .get_or_create_by_name(DEFAULT_ORG_NAME, &generate_org_api_key())
        .await?;
    let profile = state.profiles.get_or_create(user_id, org.id).await?;

    tracing::info!(user_id = %user_id, org_id = %org.id, "Default org membership provisioned");
    Ok(Some(profile))
}
