//! Production [`ContextStore`] backed by the sqlx repositories.

use async_trait::async_trait;
use cordia_core::models::{Org, Profile, User};
use cordia_core::AppError;
use cordia_db::{OrgRepository, ProfileRepository, UserRepository};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::resolver::ContextStore;

#[derive(Clone)]
pub struct SqlContextStore {
    users: UserRepository,
    orgs: OrgRepository,
    profiles: ProfileRepository,
}

impl SqlContextStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            orgs: OrgRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool),
        }
    }
}

#[async_trait]
impl ContextStore for SqlContextStore {
    async fn org_by_api_key(&self, api_key: &str) -> Result<Option<Org>, AppError> {
        self.orgs.get_by_api_key(api_key).await
    }

    async fn org_by_id(&self, org_id: Uuid) -> Result<Option<Org>, AppError> {
        self.orgs.get_by_id(org_id).await
    }

    async fn org_admin_profile(&self, org_id: Uuid) -> Result<Option<Profile>, AppError> {
        self.profiles.first_admin_in_org(org_id).await
    }

    async fn active_profile_in_org(
        &self,
        user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Option<Profile>, AppError> {
        self.profiles
            .get_active_for_user_in_org(user_id, org_id)
            .await
    }

    async fn first_active_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        self.profiles.first_active_for_user(user_id).await
    }

    async fn user_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        self.users.get_by_id(user_id).await
    }
}
