//! Configuration module
//!
//! Configuration is read from environment variables (with `.env` support via
//! dotenvy). `SECRET_KEY` and `DATABASE_URL` are required; everything else has
//! a default suitable for local development.

use std::env;

const DEFAULT_SERVER_PORT: u16 = 8000;
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ACCESS_TOKEN_EXPIRY_HOURS: i64 = 24;
const DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;
const DEFAULT_JWT_ALGO: &str = "HS256";

/// Name of the fallback org every new user is bound to until they join or
/// create a real one.
pub const DEFAULT_ORG_NAME: &str = "Default Org";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Symmetric secret used to sign and verify JWTs.
    pub secret_key: String,
    /// JWT signing algorithm name (e.g. "HS256").
    pub jwt_algorithm: String,
    pub access_token_expiry_hours: i64,
    pub refresh_token_expiry_days: i64,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let secret_key = env::var("SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("SECRET_KEY environment variable is required"))?;
        if secret_key.len() < 32 {
            return Err(anyhow::anyhow!(
                "SECRET_KEY must be at least 32 characters (got {})",
                secret_key.len()
            ));
        }

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        Ok(Self {
            server_port: env_parsed("PORT", DEFAULT_SERVER_PORT)?,
            database_url,
            db_max_connections: env_parsed("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            db_timeout_seconds: env_parsed("DB_TIMEOUT_SECONDS", DEFAULT_CONNECTION_TIMEOUT_SECS)?,
            secret_key,
            jwt_algorithm: env::var("JWT_ALGO").unwrap_or_else(|_| DEFAULT_JWT_ALGO.to_string()),
            access_token_expiry_hours: env_parsed(
                "ACCESS_TOKEN_EXPIRY_HOURS",
                DEFAULT_ACCESS_TOKEN_EXPIRY_HOURS,
            )?,
            refresh_token_expiry_days: env_parsed(
                "REFRESH_TOKEN_EXPIRY_DAYS",
                DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS,
            )?,
            cors_origins: parse_cors_origins(env::var("CORS_ORIGINS").ok().as_deref()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}

/// Parse a comma-separated origin list. Empty input means "allow any" and is
/// represented as an empty vec.
fn parse_cors_origins(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_port: 8000,
            database_url: "postgres://localhost/cordia_test".to_string(),
            db_max_connections: 5,
            db_timeout_seconds: 5,
            secret_key: "0123456789abcdef0123456789abcdef".to_string(),
            jwt_algorithm: "HS256".to_string(),
            access_token_expiry_hours: 24,
            refresh_token_expiry_days: 30,
            cors_origins: vec![],
            environment: "development".to_string(),
        }
    }

    #[test]
    fn test_parse_cors_origins() {
        assert!(parse_cors_origins(None).is_empty());
        assert!(parse_cors_origins(Some("")).is_empty());
        assert_eq!(
            parse_cors_origins(Some("https://a.example, https://b.example")),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_is_production() {
        let mut config = test_config();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
        config.environment = "prod".to_string();
        assert!(config.is_production());
    }
}
