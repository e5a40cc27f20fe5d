//! Application state shared by handlers via `State<Arc<AppState>>`.

use cordia_core::Config;
use cordia_db::{
    AttachmentRepository, CommentRepository, CompanyRepository, DocumentRepository,
    LeadRepository, OrgRepository, ProfileRepository, TeamRepository, UserRepository,
};
use sqlx::PgPool;

use crate::auth::jwt::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub jwt: JwtService,
    pub users: UserRepository,
    pub orgs: OrgRepository,
    pub profiles: ProfileRepository,
    pub leads: LeadRepository,
    pub companies: CompanyRepository,
    pub teams: TeamRepository,
    pub documents: DocumentRepository,
    pub comments: CommentRepository,
    pub attachments: AttachmentRepository,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, jwt: JwtService) -> Self {
        Self {
            config,
            jwt,
            users: UserRepository::new(pool.clone()),
            orgs: OrgRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool.clone()),
            leads: LeadRepository::new(pool.clone()),
            companies: CompanyRepository::new(pool.clone()),
            teams: TeamRepository::new(pool.clone()),
            documents: DocumentRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            attachments: AttachmentRepository::new(pool.clone()),
            pool,
        }
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
