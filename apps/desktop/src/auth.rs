//! # Password Hashing
//!
//! argon2id hashing for user passwords, stored as PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`).
//!
//! Verification reads the cost parameters from the stored hash, so hashes
//! made under older settings keep working after the config changes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use tracing::error;

use crate::error::{ApiError, ApiResult};

/// Prefix shared by every argon2 PHC string.
pub const HASH_PREFIX: &str = "$argon2";

/// Hashes and verifies passwords with fixed cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordService {
    params: Params,
    /// Hash of a random secret, checked when there is no account to check.
    decoy: Option<String>,
}

impl PasswordService {
    pub fn new(params: Params) -> Self {
        let mut service = PasswordService {
            params,
            decoy: None,
        };
        let secret = SaltString::generate(&mut OsRng);
        service.decoy = service.hash(secret.as_str()).ok();
        service
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password with a fresh random salt.
    pub fn hash(&self, password: &str) -> ApiResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!("Password hashing failed: {}", e);
                ApiError::internal("Password hashing failed")
            })
    }

    /// Checks a plaintext password against a stored hash.
    ///
    /// A malformed stored hash simply fails verification.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        self.hasher()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Runs a full verification against the decoy hash, discarding the
    /// result. An unknown account then costs the same argon2 work as a
    /// wrong password.
    pub fn reject(&self, password: &str) {
        if let Some(decoy) = &self.decoy {
            let _ = self.verify(password, decoy);
        }
    }

    /// Returns the value to store for a password supplied on update: an
    /// existing hash is kept as-is, plaintext is hashed.
    pub fn hash_if_plain(&self, password: &str) -> ApiResult<String> {
        if is_hash(password) {
            Ok(password.to_string())
        } else {
            self.hash(password)
        }
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        PasswordService::new(Params::default())
    }
}

/// Whether the value already looks like an argon2 hash.
pub fn is_hash(value: &str) -> bool {
    value.starts_with(HASH_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PasswordService {
        PasswordService::new(Params::new(256, 1, 1, None).unwrap())
    }

    #[test]
    fn test_hash_then_verify() {
        let passwords = service();
        let hash = passwords.hash("s3cret").unwrap();

        assert!(is_hash(&hash));
        assert!(passwords.verify("s3cret", &hash));
        assert!(!passwords.verify("S3cret", &hash));
        assert!(!passwords.verify("", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let passwords = service();
        assert_ne!(passwords.hash("same").unwrap(), passwords.hash("same").unwrap());
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let passwords = service();
        assert!(!passwords.verify("anything", "not-a-hash"));
        assert!(!passwords.verify("anything", ""));
    }

    #[test]
    fn test_reject_checks_a_real_hash() {
        let passwords = service();
        let decoy = passwords.decoy.clone().unwrap();

        assert!(is_hash(&decoy));
        assert!(!passwords.verify("", &decoy));

        let real = passwords.hash("x").unwrap();
        assert_eq!(
            PasswordHash::new(&decoy).unwrap().params.to_string(),
            PasswordHash::new(&real).unwrap().params.to_string()
        );
        passwords.reject("anything");
    }

    #[test]
    fn test_existing_hash_kept() {
        let passwords = service();
        let hash = passwords.hash("first").unwrap();

        assert_eq!(passwords.hash_if_plain(&hash).unwrap(), hash);

        let rehashed = passwords.hash_if_plain("second").unwrap();
        assert!(passwords.verify("second", &rehashed));
    }
}
