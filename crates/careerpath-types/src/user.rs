//! User accounts, career profiles, and bearer tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// The password hash never leaves the server: it is skipped on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Career profile attributes used to personalize counselor responses.
///
/// At most one per user. Every attribute is optional; the profile prompt
/// substitutes placeholder text for anything missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_skills: Vec<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub goals: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// A stored profile record: the attributes plus ownership and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub updated_at: DateTime<Utc>,
}

/// A persisted bearer token. Only the SHA-256 hash of the token is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A freshly issued token, returned once to the client at login.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}
