use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Role, User};

pub const TOKEN_ISSUER: &str = "self";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
/// One year.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

/// Token lifetime for a minute count in `1..=MAX_TOKEN_TTL_MINUTES`.
pub fn ttl_from_minutes(minutes: i64) -> Result<Duration, AppError> {
    if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
        return Err(AppError::ConfigError(format!(
            "Token lifetime must be between 1 and {MAX_TOKEN_TTL_MINUTES} minutes, got {minutes}"
        )));
    }
    Duration::try_minutes(minutes).ok_or_else(|| {
        AppError::ConfigError(format!("Token lifetime of {minutes} minutes is out of range"))
    })
}

/// JWT payload issued on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    /// User e-mail.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub id: i64,
    pub role: Role,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Admins may manage any account, everyone else only their own.
    pub fn can_manage_user(&self, user_id: i64) -> bool {
        self.is_admin() || self.id == user_id
    }
}

/// Issues and validates HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::ConfigError("JWT secret must not be empty".into()));
        }
        if ttl <= Duration::zero() {
            return Err(AppError::ConfigError(
                "Token lifetime must be positive".into(),
            ));
        }
        if ttl > Duration::minutes(MAX_TOKEN_TTL_MINUTES) {
            return Err(AppError::ConfigError(format!(
                "Token lifetime must not exceed {MAX_TOKEN_TTL_MINUTES} minutes"
            )));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Generic("Token expiry is out of range".into()))?;
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            id: user.id,
            role: user.role,
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::Generic(format!("Failed to sign token: {e}")))
    }

    /// Check signature, issuer and expiry.
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AppError::Unauthorized("Invalid or expired token".into())
            })
    }
}
