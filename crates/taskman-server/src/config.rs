use chrono::Duration;
use taskman_core::AppError;
use taskman_core::seed::AdminAccount;
use taskman_core::token::{DEFAULT_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES, ttl_from_minutes};

pub const DEFAULT_PORT: u16 = 8080;

/// Signing secret used when `JWT_SECRET` is unset in debug builds.
const DEV_JWT_SECRET: &str = "taskman-development-secret-do-not-use-in-production";

/// Server settings read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub admin: AdminAccount,
    pub demo_data: bool,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: String,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `TASKMAN_PORT` (default 8080)
    /// - `JWT_SECRET` (required in release builds)
    /// - `JWT_TTL_MINUTES` (default 60)
    /// - `ADMIN_EMAIL`, `ADMIN_PASSWORD`
    /// - `TASKMAN_DEMO_DATA` (default false)
    /// - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` (default "development")
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("TASKMAN_PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid TASKMAN_PORT '{raw}': must be a port number"))
            })?,
        };

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using the built-in development secret");
                DEV_JWT_SECRET.to_string()
            }
            None => {
                return Err(AppError::ConfigError(
                    "JWT_SECRET not set. Required to sign access tokens.".into(),
                ));
            }
        };

        let token_ttl = match get("JWT_TTL_MINUTES") {
            None => ttl_from_minutes(DEFAULT_TOKEN_TTL_MINUTES)?,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(|minutes| ttl_from_minutes(minutes).ok())
                .ok_or_else(|| {
                    AppError::ConfigError(format!(
                        "Invalid JWT_TTL_MINUTES '{raw}': must be between 1 and {MAX_TOKEN_TTL_MINUTES}"
                    ))
                })?,
        };

        let defaults = AdminAccount::default();
        let admin = AdminAccount {
            email: get("ADMIN_EMAIL").unwrap_or(defaults.email),
            password: get("ADMIN_PASSWORD").unwrap_or(defaults.password),
        };

        let demo_data = match get("TASKMAN_DEMO_DATA") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                AppError::ConfigError(format!(
                    "Invalid TASKMAN_DEMO_DATA '{raw}': expected true or false"
                ))
            })?,
        };

        Ok(Self {
            port,
            jwt_secret,
            token_ttl,
            admin,
            demo_data,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT").unwrap_or_else(|| "development".into()),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.token_ttl, Duration::minutes(60));
        assert_eq!(cfg.admin.email, "hexlet@example.com");
        assert_eq!(cfg.admin.password, "qwerty");
        assert!(!cfg.demo_data);
        assert!(cfg.sentry_dsn.is_none());
        assert_eq!(cfg.sentry_environment, "development");
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("TASKMAN_PORT", "9000"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_MINUTES", "5"),
            ("ADMIN_EMAIL", "root@example.com"),
            ("TASKMAN_DEMO_DATA", "yes"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.token_ttl, Duration::minutes(5));
        assert_eq!(cfg.admin.email, "root@example.com");
        assert!(cfg.demo_data);
        assert!(cfg.sentry_dsn.is_some());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config(&[("JWT_SECRET", "s"), ("TASKMAN_PORT", "http")]).is_err());
        assert!(config(&[("JWT_SECRET", "s"), ("JWT_TTL_MINUTES", "0")]).is_err());
        assert!(config(&[("JWT_SECRET", "s"), ("JWT_TTL_MINUTES", "1000000000000")]).is_err());
        assert!(config(&[("JWT_SECRET", "s"), ("JWT_TTL_MINUTES", "525601")]).is_err());
        assert!(config(&[("JWT_SECRET", "s"), ("TASKMAN_DEMO_DATA", "maybe")]).is_err());
    }

    #[test]
    fn test_blank_values_fall_back() {
        let cfg = config(&[("JWT_SECRET", "s"), ("ADMIN_EMAIL", "  ")]).unwrap();
        assert_eq!(cfg.admin.email, "hexlet@example.com");
    }
}
