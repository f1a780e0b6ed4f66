//! Salted one-way password hashing (Argon2id).

use std::fmt;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};

use crate::config::HashCost;

/// Password hashing errors.
#[derive(Debug, Clone)]
pub enum PasswordError {
    /// Cost parameters were rejected by the hasher
    InvalidParams(String),
    /// Hashing itself failed
    Hash(String),
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParams(msg) => write!(f, "invalid hash parameters: {}", msg),
            Self::Hash(msg) => write!(f, "password hashing failed: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Argon2id hasher with a fixed cost.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(cost: HashCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password into a PHC string with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored PHC string.
    ///
    /// The stored string carries its own parameters, so hashes made under a
    /// different cost still verify. A malformed stored hash is a mismatch.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
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

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashCost::cheap()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("pw1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("pw1", &hash));
        assert!(!hasher.verify("pw2", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = hasher();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same", &a));
        assert!(hasher.verify("same", &b));
    }

    #[test]
    fn test_hash_does_not_contain_password() {
        let hash = hasher().hash("plaintext-password").unwrap();
        assert!(!hash.contains("plaintext-password"));
    }

    #[test]
    fn test_verify_malformed_hash() {
        assert!(!hasher().verify("pw", "not-a-phc-string"));
    }

    #[test]
    fn test_invalid_params() {
        let cost = HashCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(matches!(
            PasswordHasher::new(cost),
            Err(PasswordError::InvalidParams(_))
        ));
    }
}
