//! Account service: signup, login, bearer-token authentication, profiles.
//!
//! Bearer tokens are random strings handed to the client once; only their
//! hash is stored. Passwords are hashed through the [`CredentialHasher`].

use careerpath_types::error::{AuthError, RepositoryError};
use careerpath_types::user::{AuthToken, IssuedToken, ProfileRecord, User, UserProfile};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::account::credentials::CredentialHasher;
use crate::account::repository::UserRepository;

/// Default bearer-token lifetime (30 days).
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 30;

/// Longest accepted bearer-token lifetime (10 years).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

pub struct AccountService<U: UserRepository, H: CredentialHasher> {
    repo: U,
    hasher: H,
    token_ttl: Duration,
}

impl<U: UserRepository, H: CredentialHasher> AccountService<U, H> {
    pub fn new(repo: U, hasher: H, token_ttl_hours: i64) -> Self {
        let token_ttl = (1..=MAX_TOKEN_TTL_HOURS)
            .contains(&token_ttl_hours)
            .then(|| Duration::try_hours(token_ttl_hours))
            .flatten()
            .unwrap_or_else(|| {
                warn!(
                    token_ttl_hours,
                    max = MAX_TOKEN_TTL_HOURS,
                    "auth.token_ttl_hours out of range, using default"
                );
                default_token_ttl()
            });
        Self {
            repo,
            hasher,
            token_ttl,
        }
    }

    /// `now` plus the token lifetime, clamped to the representable date range.
    fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.token_ttl).unwrap_or_else(|| {
            warn!("Token expiry out of range, clamping");
            now.checked_add_signed(default_token_ttl())
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }

    /// Access the user repository.
    pub fn repo(&self) -> &U {
        &self.repo
    }

    /// Register a new user. The email is trimmed and lowercased.
    #[tracing::instrument(name = "signup", skip(self, password, name))]
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<User, AuthError> {
        let email = normalize_email(email).ok_or(AuthError::MissingField("email"))?;
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let user = User {
            id: Uuid::now_v7(),
            email: email.clone(),
            name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            password_hash: self.hasher.hash_password(password)?,
            created_at: Utc::now(),
        };

        let user = self.repo.create_user(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::EmailTaken(email),
            other => AuthError::Repository(other),
        })?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verify credentials and issue a fresh bearer token.
    ///
    /// Unknown email and wrong password produce the same error.
    #[tracing::instrument(name = "login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let email = normalize_email(email).ok_or(AuthError::MissingField("email"))?;
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let user = self
            .repo
            .get_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.hasher.generate_token();
        let now = Utc::now();
        let record = AuthToken {
            id: Uuid::now_v7(),
            user_id: user.id,
            token_hash: self.hasher.hash_token(&token),
            created_at: now,
            expires_at: self.expiry_from(now),
            last_used_at: None,
        };
        self.repo.save_token(&record).await?;

        info!(user_id = %user.id, "Token issued");
        Ok(IssuedToken {
            token,
            expires_at: record.expires_at,
            user,
        })
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let hash = self.hasher.hash_token(token);
        let record = self
            .repo
            .get_token_by_hash(&hash)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let now = Utc::now();
        if record.is_expired(now) {
            return Err(AuthError::InvalidToken);
        }

        let user = self
            .repo
            .get_user(&record.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        // Best-effort: a failed touch must not reject a valid token.
        if let Err(e) = self.repo.touch_token(&record.id, now).await {
            warn!(error = %e, "Failed to record token use");
        }

        Ok(user)
    }

    /// Revoke a bearer token. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let hash = self.hasher.hash_token(token.trim());
        self.repo.delete_token_by_hash(&hash).await?;
        Ok(())
    }

    /// The user's profile, or an empty one if none has been saved.
    pub async fn get_profile(&self, user_id: &Uuid) -> Result<UserProfile, AuthError> {
        Ok(self
            .repo
            .get_profile(user_id)
            .await?
            .map(|record| record.profile)
            .unwrap_or_default())
    }

    /// Replace the user's profile.
    pub async fn upsert_profile(
        &self,
        user_id: &Uuid,
        profile: UserProfile,
    ) -> Result<ProfileRecord, AuthError> {
        let record = ProfileRecord {
            user_id: *user_id,
            profile: tidy_profile(profile),
            updated_at: Utc::now(),
        };
        self.repo.upsert_profile(&record).await?;
        info!(user_id = %user_id, "Profile saved");
        Ok(record)
    }
}

fn default_token_ttl() -> Duration {
    Duration::hours(DEFAULT_TOKEN_TTL_HOURS)
}

fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    (!email.is_empty()).then_some(email)
}

/// Trim text fields and drop blank entries.
fn tidy_profile(profile: UserProfile) -> UserProfile {
    fn text(value: Option<String>) -> Option<String> {
        value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }
    fn list(values: Vec<String>) -> Vec<String> {
        values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }

    UserProfile {
        name: text(profile.name),
        current_skills: list(profile.current_skills),
        experience_years: profile.experience_years,
        education: text(profile.education),
        goals: text(profile.goals),
        interests: list(profile.interests),
    }
}
