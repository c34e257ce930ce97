use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::SecurityConfig;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),
    #[error("Failed to hash password: {0}")]
    Hash(String),
}

/// Hashes and checks user passwords
pub trait CredentialVerifier: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// `false` on mismatch or on a digest that cannot be parsed
    fn compare(&self, plaintext: &str, digest: &str) -> bool;
}

/// Argon2id with PHC-format digests
pub struct Argon2Verifier {
    params: Params,
}

impl Argon2Verifier {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, PasswordError> {
        Self::new(config.password_memory_kib, config.password_iterations)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn compare(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(digest) else {
            tracing::warn!("Stored password digest is not in PHC format");
            return false;
        };
        // Parameters embedded in the digest win over ours, so old hashes keep verifying
        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> Argon2Verifier {
        Argon2Verifier::new(8, 1).unwrap()
    }

    #[test]
    fn hash_then_compare() {
        let v = verifier();
        let digest = v.hash("unhashedPassword1").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(v.compare("unhashedPassword1", &digest));
        assert!(!v.compare("wrongPassword", &digest));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let v = verifier();
        assert_ne!(v.hash("same").unwrap(), v.hash("same").unwrap());
    }

    #[test]
    fn malformed_digest_never_matches() {
        assert!(!verifier().compare("anything", "not-a-phc-string"));
    }

    #[test]
    fn rejects_impossible_params() {
        assert!(Argon2Verifier::new(0, 0).is_err());
    }
}
