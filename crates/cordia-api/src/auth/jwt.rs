//! JWT issuance and verification.
//!
//! Tokens are signed with the server-held symmetric secret (`SECRET_KEY`) and
//! the configured HMAC algorithm. Access and refresh tokens share one claims
//! shape; the `token_type` claim prevents a refresh token from being accepted
//! where an access token is expected and vice versa.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use cordia_core::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims embedded in every token. `user_id` is the only identity claim the
/// context resolver consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub token_type: TokenType,
    pub exp: i64,
    pub iat: i64,
}

/// Access + refresh token pair returned by login and registration.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_expiry: Duration,
    refresh_expiry: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &self.algorithm)
            .field("access_expiry", &self.access_expiry)
            .field("refresh_expiry", &self.refresh_expiry)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Build a service from the configured secret and algorithm name.
    /// Only HMAC algorithms are accepted; the secret is symmetric.
    pub fn new(
        secret: &str,
        algorithm_name: &str,
        access_expiry_hours: i64,
        refresh_expiry_days: i64,
    ) -> Result<Self, AppError> {
        let algorithm = Algorithm::from_str(algorithm_name)
            .map_err(|_| AppError::Internal(format!("Unknown JWT algorithm: {}", algorithm_name)))?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AppError::Internal(format!(
                "JWT algorithm {} is not an HMAC algorithm",
                algorithm_name
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            access_expiry: Duration::hours(access_expiry_hours),
            refresh_expiry: Duration::days(refresh_expiry_days),
        })
    }

    /// Issue an access + refresh pair for a user.
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenType::Access, self.access_expiry)?,
            refresh: self.issue(user_id, TokenType::Refresh, self.refresh_expiry)?,
        })
    }

    /// Issue a single access token (refresh flow).
    pub fn issue_access(&self, user_id: Uuid) -> Result<String, AppError> {
        self.issue(user_id, TokenType::Access, self.access_expiry)
    }

    fn issue(
        &self,
        user_id: Uuid,
        token_type: TokenType,
        expiry: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            token_type,
            iat: now.timestamp(),
            exp: (now + expiry).timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to encode JWT: {}", e)))
    }

    /// Verify signature and expiry, then check the token type. Every failure
    /// collapses to `Unauthorized`; callers on the resolution path convert it
    /// to the generic rejection.
    pub fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid token".to_string()),
            }
        })?;

        if data.claims.token_type != expected {
            return Err(AppError::Unauthorized("Wrong token type".to_string()));
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new("0123456789abcdef0123456789abcdef", "HS256", 1, 30)
            .expect("test service builds")
    }

    #[test]
    fn jwt_roundtrip() {
        let service = test_service();
        let user_id = Uuid::new_v4();

        let pair = service.issue_pair(user_id).unwrap();
        let access = service.decode(&pair.access, TokenType::Access).unwrap();
        let refresh = service.decode(&pair.refresh, TokenType::Refresh).unwrap();

        assert_eq!(access.user_id, user_id);
        assert_eq!(refresh.user_id, user_id);
        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(refresh.token_type, TokenType::Refresh);
    }

    #[test]
    fn refresh_token_rejected_as_access() {
        let service = test_service();
        let pair = service.issue_pair(Uuid::new_v4()).unwrap();

        let err = service.decode(&pair.refresh, TokenType::Access).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_rejected() {
        let service = test_service();
        let token = service
            .issue(Uuid::new_v4(), TokenType::Access, Duration::hours(-1))
            .unwrap();

        let err = service.decode(&token, TokenType::Access).unwrap_err();
        match err {
            AppError::Unauthorized(msg) => assert!(msg.contains("expired")),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let service = test_service();
        let other = JwtService::new("another-secret-another-secret-xx", "HS256", 1, 30).unwrap();

        let token = other.issue_access(Uuid::new_v4()).unwrap();
        assert!(service.decode(&token, TokenType::Access).is_err());
    }

    #[test]
    fn garbage_token_rejected() {
        let service = test_service();
        assert!(service.decode("not-a-jwt", TokenType::Access).is_err());
    }

    #[test]
    fn non_hmac_algorithm_rejected() {
        let err = JwtService::new("0123456789abcdef0123456789abcdef", "RS256", 1, 30).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
