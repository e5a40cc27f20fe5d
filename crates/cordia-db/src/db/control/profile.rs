use cordia_core::models::{Org, Profile, ProfileRole};
use cordia_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "insert"))]
    pub async fn create(
        &self,
        user_id: Uuid,
        org_id: Uuid,
        role: ProfileRole,
        is_organization_admin: bool,
    ) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, org_id, role, is_organization_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .bind(role)
        .bind(is_organization_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            super::user::map_unique_violation(e, "Profile already exists for this user and org")
        })?;

        tracing::info!(profile_id = %profile.id, user_id = %user_id, org_id = %org_id, "Profile created");
        Ok(profile)
    }

    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch profile by id");
                AppError::Database(e)
            })?;

        Ok(profile)
    }

    /// The active profile binding `user_id` to `org_id`, if one exists.
    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select"))]
    pub async fn get_active_for_user_in_org(
        &self,
        user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE user_id = $1 AND org_id = $2 AND is_active = TRUE",
        )
        .bind(user_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch profile for user in org");
            AppError::Database(e)
        })?;

        Ok(profile)
    }

    /// First active profile for a user, by creation order then id. This is
    /// the documented fallback for requests that omit the org header; the
    /// ordering keeps it deterministic for users with several orgs.
    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select"))]
    pub async fn first_active_for_user(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT * FROM profiles
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY created_at, id
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch first active profile");
            AppError::Database(e)
        })?;

        Ok(profile)
    }

    /// Oldest active ADMIN-role profile of an org. The API-key path resolves
    /// the acting user through this profile. Selection keys off the role
    /// string, not the org-admin flag.
    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select"))]
    pub async fn first_admin_in_org(&self, org_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT * FROM profiles
            WHERE org_id = $1 AND role = 'ADMIN' AND is_active = TRUE
            ORDER BY created_at, id
            LIMIT 1
            "#,
        )
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, org_id = %org_id, "Failed to fetch admin profile for org");
            AppError::Database(e)
        })?;

        Ok(profile)
    }

    /// Active profiles of an org, ordered by member email.
    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select"))]
    pub async fn list_active_by_org(&self, org_id: Uuid) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT p.* FROM profiles p
            JOIN users u ON u.id = p.user_id
            WHERE p.org_id = $1 AND p.is_active = TRUE
            ORDER BY u.email
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, org_id = %org_id, "Failed to list profiles for org");
            AppError::Database(e)
        })?;

        Ok(profiles)
    }

    /// All profiles held by a user across orgs, with each profile's org.
    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select"))]
    pub async fn list_for_user_with_orgs(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Profile, Org)>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE user_id = $1 ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list profiles for user");
            AppError::Database(e)
        })?;

        let mut result = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let org = sqlx::query_as::<_, Org>("SELECT * FROM orgs WHERE id = $1")
                .bind(profile.org_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to fetch org for profile");
                    AppError::Database(e)
                })?;
            result.push((profile, org));
        }

        Ok(result)
    }

    /// Whether the user holds any profile at all, active or not.
    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select"))]
    pub async fn exists_for_user(&self, user_id: Uuid) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM profiles WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to check profiles for user");
                    AppError::Database(e)
                })?;

        Ok(exists)
    }

    /// Idempotently ensure a profile binds `user_id` to `org_id`.
    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "upsert"))]
    pub async fn get_or_create(&self, user_id: Uuid, org_id: Uuid) -> Result<Profile, AppError> {
        if let Some(profile) = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE user_id = $1 AND org_id = $2",
        )
        .bind(user_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch profile");
            AppError::Database(e)
        })? {
            return Ok(profile);
        }

        let inserted = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, org_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, org_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .bind(ProfileRole::User)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create profile");
            AppError::Database(e)
        })?;

        match inserted {
            Some(profile) => Ok(profile),
            // Lost the race; the row exists now.
            None => sqlx::query_as::<_, Profile>(
                "SELECT * FROM profiles WHERE user_id = $1 AND org_id = $2",
            )
            .bind(user_id)
            .bind(org_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch profile after conflict");
                AppError::Database(e)
            }),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "update"))]
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE profiles SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(is_active)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, profile_id = %id, "Failed to update profile");
                    AppError::Database(e)
                })?;

        Ok(result.rows_affected() > 0)
    }
}
