//! Placeholder authentication: one configured identity, HS256 bearer tokens.
//!
//! There is no user table, password hashing or revocation here. The gate only
//! proves that a request carries a token this process (or one sharing its
//! `JWT_SECRET`) issued recently.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Claims expiring `expiry_hours` from now; an expiry past the i64 timestamp range is an error.
    pub fn new(sub: impl Into<String>, expiry_hours: u64) -> Result<Self, JwtError> {
        let iat = Utc::now().timestamp();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(|hours| hours.checked_mul(3600))
            .and_then(|secs| iat.checked_add(secs))
            .ok_or_else(|| JwtError::TokenGeneration(format!("expiry of {} hours is out of range", expiry_hours)))?;

        Ok(Self {
            sub: sub.into(),
            iat,
            exp,
        })
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Whether a login/password pair matches the configured identity.
pub fn credentials_match(security: &SecurityConfig, login: &str, password: &str) -> bool {
    login == security.login && password == security.password
}

/// Sign a token for `sub`. Returns the token and its lifetime in seconds.
pub fn generate_jwt(sub: &str, security: &SecurityConfig) -> Result<(String, i64), JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let claims = Claims::new(sub, security.jwt_expiry_hours)?;
    let expires_in = claims.exp - claims.iat;

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))?;

    Ok((token, expires_in))
}

/// Check signature and expiry, returning the claims.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security(secret: &str) -> SecurityConfig {
        let mut security = AppConfig::development().security;
        security.jwt_secret = secret.to_string();
        security
    }

    #[test]
    fn issued_tokens_validate_with_the_same_secret() {
        let security = security("test-secret");
        let (token, expires_in) = generate_jwt("admin", &security).unwrap();

        assert_eq!(expires_in, 24 * 3600);
        let claims = validate_jwt(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn foreign_and_garbage_tokens_are_rejected() {
        let (token, _) = generate_jwt("admin", &security("one")).unwrap();

        assert!(matches!(validate_jwt(&token, "two"), Err(JwtError::InvalidToken(_))));
        assert!(matches!(validate_jwt("not-a-jwt", "one"), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let claims = Claims {
            sub: "admin".to_string(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"s")).unwrap();
        assert!(validate_jwt(&token, "s").is_err());
    }

    #[test]
    fn expiry_beyond_timestamp_range_is_a_generation_error() {
        let mut security = security("s");
        security.jwt_expiry_hours = u64::MAX;
        assert!(matches!(generate_jwt("admin", &security), Err(JwtError::TokenGeneration(_))));

        security.jwt_expiry_hours = 10_000_000_000_000;
        let (_, expires_in) = generate_jwt("admin", &security).unwrap();
        assert_eq!(expires_in, 36_000_000_000_000_000);

        security.jwt_expiry_hours = 1;
        let (_, expires_in) = generate_jwt("admin", &security).unwrap();
        assert_eq!(expires_in, 3600);
    }

    #[test]
    fn empty_secret_cannot_sign() {
        assert!(matches!(generate_jwt("admin", &security("")), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn only_the_configured_identity_matches() {
        let security = security("s");
        assert!(credentials_match(&security, "admin", "admin"));
        assert!(!credentials_match(&security, "admin", "wrong"));
        assert!(!credentials_match(&security, "", ""));
    }
}
