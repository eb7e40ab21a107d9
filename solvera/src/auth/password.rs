//! Password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::{config::PasswordConfig, errors::Error};

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    fn to_argon2(self) -> Result<Argon2<'static>, Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None).map_err(|e| Error::Internal {
            operation: format!("create argon2 params: {e}"),
        })?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// Argon2id RFC recommendations
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Hash a password with the given parameters, or secure defaults if None.
pub fn hash_password_with_params(password: &str, params: Option<Argon2Params>) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = params.unwrap_or_default().to_argon2()?;

    let hash = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| Error::Internal {
        operation: format!("hash password: {e}"),
    })?;

    Ok(hash.to_string())
}

pub fn hash_password(password: &str) -> Result<String, Error> {
    hash_password_with_params(password, None)
}

/// Verify a password against a stored hash.
///
/// Verification uses the parameters embedded in the hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| Error::Internal {
        operation: format!("parse password hash: {e}"),
    })?;

    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
}

/// Checks a new password against the configured length bounds.
pub fn validate_password(password: &str, rules: &PasswordConfig) -> Result<(), Error> {
    let length = password.chars().count();
    if length < rules.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", rules.min_length),
        });
    }
    if length > rules.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at most {} characters", rules.max_length),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Option<Argon2Params> {
        Some(Argon2Params {
            memory_kib: 128,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password_with_params("rahasia123", fast()).unwrap();
        assert!(!hash.is_empty());
        assert!(verify_password("rahasia123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hash1 = hash_password_with_params("same_password", fast()).unwrap();
        let hash2 = hash_password_with_params("same_password", fast()).unwrap();

        // salted
        assert_ne!(hash1, hash2);
        assert!(verify_password("same_password", &hash1).unwrap());
        assert!(verify_password("same_password", &hash2).unwrap());
    }

    #[test]
    fn test_default_params_hash() {
        let hash = hash_password("admin").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        assert!(matches!(verify_password("x", "not-a-hash"), Err(Error::Internal { .. })));
    }

    #[test]
    fn test_validate_password_length() {
        let rules = PasswordConfig {
            min_length: 8,
            max_length: 12,
        };
        assert!(validate_password("12345678", &rules).is_ok());
        assert!(matches!(validate_password("short", &rules), Err(Error::BadRequest { .. })));
        assert!(matches!(validate_password("much-too-long-password", &rules), Err(Error::BadRequest { .. })));
    }
}
