//! Argon2id password hashing and SHA-256 bearer-token hashing.
//!
//! Implements the `CredentialHasher` trait from `careerpath-core` using the
//! RustCrypto `argon2` and `sha2` crates.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sha2::{Digest, Sha256};

use careerpath_core::account::credentials::CredentialHasher;
use careerpath_types::error::AuthError;

/// Prefix of every issued bearer token.
pub const TOKEN_PREFIX: &str = "cp_";

/// Argon2id (default parameters) for passwords, random 32-byte tokens,
/// lowercase-hex SHA-256 for token storage.
#[derive(Default)]
pub struct Argon2CredentialHasher {
    argon2: Argon2<'static>,
}

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AuthError::Hashing)?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash).map_err(|_| AuthError::Hashing)?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn generate_token(&self) -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        format!(
            "{TOKEN_PREFIX}{}",
            bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
        )
    }

    fn hash_token(&self, token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }
}
