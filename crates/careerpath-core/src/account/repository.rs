//! UserRepository trait definition.
//!
//! Users, their career profiles, and issued bearer tokens.

use careerpath_types::error::RepositoryError;
use careerpath_types::user::{AuthToken, ProfileRecord, User};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Repository trait for account persistence.
///
/// Implementations live in careerpath-infra (e.g., `SqliteUserRepository`).
pub trait UserRepository: Send + Sync {
    /// Create a user. Fails with `RepositoryError::Conflict` on a duplicate email.
    fn create_user(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    fn get_user(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Look up a user by (normalized, lowercase) email.
    fn get_user_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// The user's profile record, if one has been saved.
    fn get_profile(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ProfileRecord>, RepositoryError>> + Send;

    /// Insert or replace the user's profile record.
    fn upsert_profile(
        &self,
        profile: &ProfileRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn save_token(
        &self,
        token: &AuthToken,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get_token_by_hash(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<Option<AuthToken>, RepositoryError>> + Send;

    /// Record that a token was just used.
    fn touch_token(
        &self,
        token_id: &Uuid,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Revoke a token. Deleting an unknown hash is not an error.
    fn delete_token_by_hash(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Count registered users.
    fn count_users(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
