//! SQLite user repository: accounts, career profiles and bearer tokens.
//!
//! Profile list attributes (skills, interests) are stored as JSON text.

use careerpath_core::account::repository::UserRepository;
use careerpath_types::error::RepositoryError;
use careerpath_types::user::{AuthToken, ProfileRecord, User, UserProfile};
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid, query_err};

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

struct UserRow {
    id: String,
    email: String,
    name: Option<String>,
    password_hash: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        Ok(User {
            id: parse_uuid(&self.id, "user id")?,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct ProfileRow {
    user_id: String,
    name: Option<String>,
    current_skills: String,
    experience_years: Option<i64>,
    education: Option<String>,
    goals: Option<String>,
    interests: String,
    updated_at: String,
}

impl ProfileRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            current_skills: row.try_get("current_skills")?,
            experience_years: row.try_get("experience_years")?,
            education: row.try_get("education")?,
            goals: row.try_get("goals")?,
            interests: row.try_get("interests")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_record(self) -> Result<ProfileRecord, RepositoryError> {
        Ok(ProfileRecord {
            user_id: parse_uuid(&self.user_id, "user_id")?,
            profile: UserProfile {
                name: self.name,
                current_skills: parse_list(&self.current_skills)?,
                experience_years: self.experience_years.map(|v| v as u32),
                education: self.education,
                goals: self.goals,
                interests: parse_list(&self.interests)?,
            },
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct TokenRow {
    id: String,
    user_id: String,
    token_hash: String,
    created_at: String,
    expires_at: String,
    last_used_at: Option<String>,
}

impl TokenRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            token_hash: row.try_get("token_hash")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
            last_used_at: row.try_get("last_used_at")?,
        })
    }

    fn into_token(self) -> Result<AuthToken, RepositoryError> {
        Ok(AuthToken {
            id: parse_uuid(&self.id, "token id")?,
            user_id: parse_uuid(&self.user_id, "user_id")?,
            token_hash: self.token_hash,
            created_at: parse_datetime(&self.created_at)?,
            expires_at: parse_datetime(&self.expires_at)?,
            last_used_at: self.last_used_at.as_deref().map(parse_datetime).transpose()?,
        })
    }
}

fn parse_list(json: &str) -> Result<Vec<String>, RepositoryError> {
    serde_json::from_str(json).map_err(|e| RepositoryError::Query(format!("invalid list: {e}")))
}

fn encode_list(values: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(values).map_err(|e| RepositoryError::Query(e.to_string()))
}

// ---------------------------------------------------------------------------
// UserRepository implementation
// ---------------------------------------------------------------------------

impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            r#"INSERT INTO users (id, email, name, password_hash, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(format_datetime(&user.created_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(user.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("email '{}' already registered", user.email)),
            ),
            Err(e) => Err(query_err(e)),
        }
    }

    async fn get_user(&self, user_id: &Uuid) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|r| UserRow::from_row(&r).map_err(query_err)?.into_user())
            .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|r| UserRow::from_row(&r).map_err(query_err)?.into_user())
            .transpose()
    }

    async fn get_profile(&self, user_id: &Uuid) -> Result<Option<ProfileRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|r| ProfileRow::from_row(&r).map_err(query_err)?.into_record())
            .transpose()
    }

    async fn upsert_profile(&self, record: &ProfileRecord) -> Result<(), RepositoryError> {
        let profile = &record.profile;
        sqlx::query(
            r#"INSERT INTO user_profiles
                   (user_id, name, current_skills, experience_years, education, goals, interests, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET
                   name = excluded.name,
                   current_skills = excluded.current_skills,
                   experience_years = excluded.experience_years,
                   education = excluded.education,
                   goals = excluded.goals,
                   interests = excluded.interests,
                   updated_at = excluded.updated_at"#,
        )
        .bind(record.user_id.to_string())
        .bind(&profile.name)
        .bind(encode_list(&profile.current_skills)?)
        .bind(profile.experience_years.map(i64::from))
        .bind(&profile.education)
        .bind(&profile.goals)
        .bind(encode_list(&profile.interests)?)
        .bind(format_datetime(&record.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(())
    }

    async fn save_token(&self, token: &AuthToken) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO auth_tokens (id, user_id, token_hash, created_at, expires_at, last_used_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(&token.token_hash)
        .bind(format_datetime(&token.created_at))
        .bind(format_datetime(&token.expires_at))
        .bind(token.last_used_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(())
    }

    async fn get_token_by_hash(&self, token_hash: &str) -> Result<Option<AuthToken>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM auth_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|r| TokenRow::from_row(&r).map_err(query_err)?.into_token())
            .transpose()
    }

    async fn touch_token(&self, token_id: &Uuid, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE auth_tokens SET last_used_at = ? WHERE id = ?")
            .bind(format_datetime(&at))
            .bind(token_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        Ok(())
    }

    async fn delete_token_by_hash(&self, token_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM auth_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        Ok(())
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_err)?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SubsecRound};

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_user(email: &str) -> User {
        User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            name: Some("Ada".to_string()),
            password_hash: "$argon2id$v=19$stub".to_string(),
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_user() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = make_user("ada@example.com");
        repo.create_user(&user).await.unwrap();

        assert_eq!(repo.get_user(&user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.get_user_by_email("ada@example.com").await.unwrap(),
            Some(user)
        );
        assert!(repo.get_user_by_email("bob@example.com").await.unwrap().is_none());
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = SqliteUserRepository::new(test_pool().await);
        repo.create_user(&make_user("ada@example.com")).await.unwrap();
        let err = repo
            .create_user(&make_user("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_profile_upsert_replaces() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = make_user("ada@example.com");
        repo.create_user(&user).await.unwrap();
        assert!(repo.get_profile(&user.id).await.unwrap().is_none());

        let mut record = ProfileRecord {
            user_id: user.id,
            profile: UserProfile {
                name: Some("Ada".to_string()),
                current_skills: vec!["Rust".to_string(), "SQL".to_string()],
                experience_years: Some(6),
                education: Some("BSc Mathematics".to_string()),
                goals: None,
                interests: vec!["compilers".to_string()],
            },
            updated_at: Utc::now().trunc_subsecs(6),
        };
        repo.upsert_profile(&record).await.unwrap();
        assert_eq!(repo.get_profile(&user.id).await.unwrap(), Some(record.clone()));

        record.profile.goals = Some("Lead a platform team".to_string());
        record.profile.current_skills.clear();
        repo.upsert_profile(&record).await.unwrap();
        let loaded = repo.get_profile(&user.id).await.unwrap().unwrap();
        assert_eq!(loaded.profile.goals.as_deref(), Some("Lead a platform team"));
        assert!(loaded.profile.current_skills.is_empty());
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = make_user("ada@example.com");
        repo.create_user(&user).await.unwrap();

        let now = Utc::now().trunc_subsecs(6);
        let token = AuthToken {
            id: Uuid::now_v7(),
            user_id: user.id,
            token_hash: "deadbeef".to_string(),
            created_at: now,
            expires_at: now + Duration::days(30),
            last_used_at: None,
        };
        repo.save_token(&token).await.unwrap();
        assert_eq!(
            repo.get_token_by_hash("deadbeef").await.unwrap(),
            Some(token.clone())
        );

        let used_at = now + Duration::minutes(5);
        repo.touch_token(&token.id, used_at).await.unwrap();
        let loaded = repo.get_token_by_hash("deadbeef").await.unwrap().unwrap();
        assert_eq!(loaded.last_used_at, Some(used_at));

        repo.delete_token_by_hash("deadbeef").await.unwrap();
        assert!(repo.get_token_by_hash("deadbeef").await.unwrap().is_none());
        repo.delete_token_by_hash("deadbeef").await.unwrap();
    }
}
