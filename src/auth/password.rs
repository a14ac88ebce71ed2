// Password hashing and verification
//
// Stored passwords have the form `<salt>.<digest>`: a hex salt followed by the
// hex-encoded Argon2id output for the plaintext keyed on that salt.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::{rngs::OsRng, RngCore};

use crate::auth::error::AuthError;

/// Random bytes per salt, hex-encoded to twice this many characters
pub const SALT_LEN: usize = 8;

/// Digest length in bytes
pub const DIGEST_LEN: usize = 32;

const SEPARATOR: char = '.';

/// Password service for salting, hashing and verification
#[derive(Debug, Clone)]
pub struct PasswordService {
    params: Params,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self {
            params: Params::DEFAULT,
        }
    }
}

impl PasswordService {
    /// Create a service with explicit Argon2 cost parameters
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, 1, Some(DIGEST_LEN))
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?;
        Ok(Self { params })
    }

    /// Generate a fresh random salt
    pub fn generate_salt() -> String {
        let mut bytes = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Hash a password with the given salt, returning the hex digest
    pub fn hash(&self, password: &str, salt: &str) -> Result<String, AuthError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let mut digest = [0u8; DIGEST_LEN];

        argon2
            .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut digest)
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?;

        Ok(hex::encode(digest))
    }

    /// Hash a password under a new salt and return the stored form
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = Self::generate_salt();
        let digest = self.hash(password, &salt)?;
        Ok(format!("{}{}{}", salt, SEPARATOR, digest))
    }

    /// Verify a password against a stored `salt.digest` value
    pub fn verify_password(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let Some((salt, digest)) = stored.split_once(SEPARATOR) else {
            tracing::warn!("Stored password has no salt separator");
            return Ok(false);
        };
        if salt.len() < argon2::MIN_SALT_LEN {
            tracing::warn!("Stored password salt is shorter than {} bytes", argon2::MIN_SALT_LEN);
            return Ok(false);
        }
        if digest.len() != DIGEST_LEN * 2 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            tracing::warn!("Stored password digest is not {} hex characters", DIGEST_LEN * 2);
            return Ok(false);
        }

        let computed = self.hash(password, salt)?;
        Ok(constant_time_eq(computed.as_bytes(), digest.as_bytes()))
    }
}

/// Compare two byte slices without short-circuiting on the first difference
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
pub(crate) fn test_password_service() -> PasswordService {
    // Minimum Argon2 cost keeps the test suite fast
    PasswordService::new(8, 1).expect("valid test params")
}
