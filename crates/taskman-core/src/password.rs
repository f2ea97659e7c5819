use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::AppError;

/// Argon2id password hashing producing PHC strings (`$argon2id$v=19$...`).
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    /// Hasher with the library's recommended cost parameters.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Hasher with explicit memory (KiB) and iteration costs.
    ///
    /// Low values are only suitable for tests.
    pub fn with_params(memory_kib: u32, iterations: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| AppError::ConfigError(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Generic(format!("Password hashing failed: {e}")))
    }

    /// Check `password` against a stored digest.
    ///
    /// Cost parameters are read from the digest, so hashes made with other
    /// settings still verify. A malformed digest never matches.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            tracing::warn!("Stored password digest is not a valid PHC string");
            return false;
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::with_params(8, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap();
        let digest = hasher.hash("qwerty").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("qwerty", &digest));
        assert!(!hasher.verify("qwertz", &digest));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = cheap();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_verify_uses_params_from_digest() {
        let digest = cheap().hash("password123").unwrap();
        let other = PasswordHasher::with_params(16, 2).unwrap();
        assert!(other.verify("password123", &digest));
    }

    #[test]
    fn test_malformed_digest_never_matches() {
        assert!(!cheap().verify("anything", "plain-text"));
    }

    #[test]
    fn test_invalid_params_are_config_errors() {
        let err = PasswordHasher::with_params(0, 0).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
