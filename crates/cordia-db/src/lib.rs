//! Cordia database layer: sqlx/Postgres repositories and migrations.

pub mod db;

pub use db::control::{NewUser, OrgRepository, ProfileRepository, UserRepository};
pub use db::crm::{
    AttachmentRepository, CommentRepository, CompanyRepository, DocumentRepository,
    LeadRepository, NewCompany, NewDocument, NewLead, NewTeam, TeamRepository,
};

/// Run pending migrations (embedded from `migrations/` at compile time).
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
