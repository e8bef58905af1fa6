//! Credential hashing abstraction.
//!
//! Keeps password hashing and token generation behind a trait so the
//! account service never depends on a concrete crypto crate.

use careerpath_types::error::AuthError;

/// Trait for password hashing and bearer-token generation.
///
/// Implementations live in careerpath-infra (e.g., `Argon2CredentialHasher`).
pub trait CredentialHasher: Send + Sync {
    /// Hash a password into a self-describing (PHC string) hash.
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// Check a password against a stored hash.
    fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AuthError>;

    /// Generate a new random bearer token (plaintext, shown once).
    fn generate_token(&self) -> String;

    /// Deterministic hash of a bearer token for storage and lookup.
    fn hash_token(&self, token: &str) -> String;
}
