use cordia_core::models::Team;
use cordia_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::control::user::map_unique_violation;

#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<Uuid>,
}

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a team and its member rows in one transaction. Members must be
    /// profiles of the same org; foreign rows are skipped by the WHERE guard.
    #[tracing::instrument(skip(self, team), fields(db.table = "teams", db.operation = "insert"))]
    pub async fn create(
        &self,
        org_id: Uuid,
        created_by: Uuid,
        team: &NewTeam,
    ) -> Result<Team, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (org_id, name, description, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(&team.name)
        .bind(&team.description)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "Team already exists with this name"))?;

        for profile_id in &team.members {
            sqlx::query(
                r#"
                INSERT INTO team_members (team_id, profile_id)
                SELECT $1, id FROM profiles WHERE id = $2 AND org_id = $3
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(created.id)
            .bind(profile_id)
            .bind(org_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to add team member");
                AppError::Database(e)
            })?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(team_id = %created.id, org_id = %org_id, "Team created");
        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "teams", db.operation = "select"))]
    pub async fn get_by_id(&self, org_id: Uuid, id: Uuid) -> Result<Option<Team>, AppError> {
        let team = sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch team");
                AppError::Database(e)
            })?;

        Ok(team)
    }

    #[tracing::instrument(skip(self), fields(db.table = "teams", db.operation = "select"))]
    pub async fn list_by_org(&self, org_id: Uuid) -> Result<Vec<Team>, AppError> {
        let teams = sqlx::query_as::<_, Team>(
            "SELECT * FROM teams WHERE org_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, org_id = %org_id, "Failed to list teams");
            AppError::Database(e)
        })?;

        Ok(teams)
    }

    /// Member profile ids of a team.
    #[tracing::instrument(skip(self), fields(db.table = "team_members", db.operation = "select"))]
    pub async fn list_members(&self, team_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT profile_id FROM team_members WHERE team_id = $1")
                .bind(team_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, team_id = %team_id, "Failed to list team members");
                    AppError::Database(e)
                })?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Replace name, description, and membership in one transaction.
    #[tracing::instrument(skip(self, team), fields(db.table = "teams", db.operation = "update"))]
    pub async fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        team: &NewTeam,
    ) -> Result<Option<Team>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams SET name = $3, description = $4, updated_at = NOW()
            WHERE id = $1 AND org_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(org_id)
        .bind(&team.name)
        .bind(&team.description)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "Team already exists with this name"))?;

        let Some(updated) = updated else {
            tx.rollback().await.ok();
            return Ok(None);
        };

        sqlx::query("DELETE FROM team_members WHERE team_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to clear team members");
                AppError::Database(e)
            })?;

        for profile_id in &team.members {
            sqlx::query(
                r#"
                INSERT INTO team_members (team_id, profile_id)
                SELECT $1, id FROM profiles WHERE id = $2 AND org_id = $3
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(profile_id)
            .bind(org_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to add team member");
                AppError::Database(e)
            })?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(Some(updated))
    }

    #[tracing::instrument(skip(self), fields(db.table = "teams", db.operation = "delete"))]
    pub async fn delete(&self, org_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, team_id = %id, "Failed to delete team");
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
