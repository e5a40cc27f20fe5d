//! Application setup and initialization.

pub mod database;
pub mod routes;
pub mod server;

use anyhow::Result;
use cordia_core::Config;
use std::sync::Arc;

use crate::auth::jwt::JwtService;
use crate::auth::middleware::AuthState;
use crate::auth::store::SqlContextStore;
use crate::state::AppState;

/// Initialize tracing with an env-filter (`RUST_LOG`); defaults to info.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

/// Initialize the application: database, state, and router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let pool = database::setup_database(&config).await?;

    let jwt = JwtService::new(
        &config.secret_key,
        &config.jwt_algorithm,
        config.access_token_expiry_hours,
        config.refresh_token_expiry_days,
    )
    .map_err(|e| anyhow::anyhow!("JWT configuration invalid: {}", e))?;

    let auth_state = Arc::new(AuthState::new(
        jwt.clone(),
        Arc::new(SqlContextStore::new(pool.clone())),
    ));
    let state = Arc::new(AppState::new(config, pool, jwt));

    let router = routes::setup_routes(state.clone(), auth_state);

    Ok((state, router))
}
