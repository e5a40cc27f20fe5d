use cordia_core::models::{Profile, ProfileRole, User};
use cordia_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

/// Fields for creating a user. The password must already be hashed; the email
/// must already be normalized (lowercased).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub profile_pic: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user. Duplicate email (case-insensitive) maps to `Conflict`.
    #[tracing::instrument(skip(self, user), fields(db.table = "users", db.operation = "insert"))]
    pub async fn create_user(&self, user: &NewUser) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, profile_pic, is_active, is_staff)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile_pic)
        .bind(user.is_active)
        .bind(user.is_staff)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "User already exists with this email"))?;

        tracing::info!(user_id = %created.id, "User created");
        Ok(created)
    }

    /// Create a user and bind a profile to the given org, atomically.
    /// This is the admin-driven creation path: a half-created user with no
    /// membership must never be observable.
    #[tracing::instrument(skip(self, user), fields(db.table = "users", db.operation = "insert"))]
    pub async fn create_user_with_profile(
        &self,
        user: &NewUser,
        org_id: Uuid,
    ) -> Result<(User, Profile), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, profile_pic, is_active, is_staff)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile_pic)
        .bind(user.is_active)
        .bind(user.is_staff)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "User already exists with this email"))?;

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, org_id, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(created.id)
        .bind(org_id)
        .bind(ProfileRole::User)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create profile for new user");
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(user_id = %created.id, org_id = %org_id, "User created with profile");
        Ok((created, profile))
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch user by id");
                AppError::Database(e)
            })?;

        Ok(user)
    }

    /// Lookup by email, case-insensitively.
    #[tracing::instrument(skip(self, email), fields(db.table = "users", db.operation = "select"))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch user by email");
                AppError::Database(e)
            })?;

        Ok(user)
    }

    /// All users, most recently active first. Platform-admin listings only.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn list_all(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY last_login DESC NULLS LAST, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list users");
            AppError::Database(e)
        })?;

        Ok(users)
    }

    /// Users holding a profile in the given org, most recently active first.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn list_by_org(&self, org_id: Uuid) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN profiles p ON p.user_id = u.id
            WHERE p.org_id = $1
            ORDER BY u.last_login DESC NULLS LAST, u.created_at DESC
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, org_id = %org_id, "Failed to list users for org");
            AppError::Database(e)
        })?;

        Ok(users)
    }

    /// Update the admin-editable fields. `None` leaves a field unchanged;
    /// the email is the identity key and cannot be changed here.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update"))]
    pub async fn update_admin_fields(
        &self,
        id: Uuid,
        profile_pic: Option<String>,
        is_active: Option<bool>,
        is_staff: Option<bool>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                profile_pic = COALESCE($2, profile_pic),
                is_active = COALESCE($3, is_active),
                is_staff = COALESCE($4, is_staff),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(profile_pic)
        .bind(is_active)
        .bind(is_staff)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %id, "Failed to update user");
            AppError::Database(e)
        })?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, password_hash), fields(db.table = "users", db.operation = "update"))]
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, user_id = %id, "Failed to update password");
                    AppError::Database(e)
                })?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update"))]
    pub async fn update_last_login(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %id, "Failed to update last_login");
                AppError::Database(e)
            })?;

        Ok(())
    }

    /// Deactivate instead of delete where possible.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update"))]
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(is_active)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, user_id = %id, "Failed to update is_active");
                    AppError::Database(e)
                })?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "delete"))]
    pub async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %id, "Failed to delete user");
                AppError::Database(e)
            })?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(user_id = %id, "User deleted");
        }
        Ok(deleted)
    }
}

/// Map a unique-constraint violation to `Conflict`; everything else stays a
/// database error.
pub(crate) fn map_unique_violation(e: sqlx::Error, conflict_msg: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(conflict_msg.to_string());
        }
    }
    tracing::error!(error = %e, "Database write failed");
    AppError::Database(e)
}
