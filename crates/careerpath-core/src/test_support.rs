//! In-memory repositories and fakes shared by the service tests.

use std::sync::Mutex;

use careerpath_types::chat::{ChatMessage, ChatSession, SessionOverview};
use careerpath_types::error::{AuthError, RepositoryError};
use careerpath_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, Usage,
};
use careerpath_types::user::{AuthToken, ProfileRecord, User};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::account::credentials::CredentialHasher;
use crate::account::repository::UserRepository;
use crate::chat::repository::ChatRepository;
use crate::llm::provider::LlmProvider;

fn page<T: Clone>(items: Vec<T>, limit: Option<i64>, offset: Option<i64>) -> Vec<T> {
    let offset = offset.unwrap_or(0).max(0) as usize;
    let limit = limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

#[derive(Default)]
pub struct MemoryChatRepository {
    sessions: Mutex<Vec<ChatSession>>,
    messages: Mutex<Vec<ChatMessage>>,
}

impl ChatRepository for MemoryChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == *session_id)
            .cloned())
    }

    async fn update_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        let stored = sessions
            .iter_mut()
            .find(|s| s.id == session.id)
            .ok_or(RepositoryError::NotFound)?;
        stored.title = session.title.clone();
        stored.topic = session.topic.clone();
        stored.updated_at = session.updated_at;
        Ok(())
    }

    async fn list_sessions(
        &self,
        user_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<SessionOverview>, RepositoryError> {
        let mut owned: Vec<ChatSession> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let messages = self.messages.lock().unwrap();
        let overviews = owned
            .into_iter()
            .map(|session| {
                let last_message = messages
                    .iter()
                    .rev()
                    .find(|m| m.session_id == session.id)
                    .cloned();
                SessionOverview {
                    session,
                    last_message,
                }
            })
            .collect();
        Ok(page(overviews, limit, offset))
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        self.sessions.lock().unwrap().retain(|s| s.id != *session_id);
        self.messages
            .lock()
            .unwrap()
            .retain(|m| m.session_id != *session_id);
        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let messages: Vec<ChatMessage> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.session_id == *session_id)
            .cloned()
            .collect();
        Ok(page(messages, limit, offset))
    }

    async fn get_message_count(&self, session_id: &Uuid) -> Result<u32, RepositoryError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.session_id == *session_id)
            .count() as u32)
    }

    async fn count_sessions(&self) -> Result<u64, RepositoryError> {
        Ok(self.sessions.lock().unwrap().len() as u64)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        Ok(self.messages.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
    profiles: Mutex<Vec<ProfileRecord>>,
    tokens: Mutex<Vec<AuthToken>>,
}

impl MemoryUserRepository {
    pub fn token_count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    /// Overwrite a stored token's expiry.
    pub fn set_token_expiry(&self, token_hash: &str, expires_at: DateTime<Utc>) {
        if let Some(token) = self
            .tokens
            .lock()
            .unwrap()
            .iter_mut()
            .find(|t| t.token_hash == token_hash)
        {
            token.expires_at = expires_at;
        }
    }
}

impl UserRepository for MemoryUserRepository {
    async fn create_user(&self, user: &User) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(format!(
                "email '{}' already registered",
                user.email
            )));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn get_user(&self, user_id: &Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == *user_id)
            .cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_profile(&self, user_id: &Uuid) -> Result<Option<ProfileRecord>, RepositoryError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == *user_id)
            .cloned())
    }

    async fn upsert_profile(&self, profile: &ProfileRecord) -> Result<(), RepositoryError> {
        let mut profiles = self.profiles.lock().unwrap();
        profiles.retain(|p| p.user_id != profile.user_id);
        profiles.push(profile.clone());
        Ok(())
    }

    async fn save_token(&self, token: &AuthToken) -> Result<(), RepositoryError> {
        self.tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn get_token_by_hash(&self, token_hash: &str) -> Result<Option<AuthToken>, RepositoryError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn touch_token(&self, token_id: &Uuid, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        if let Some(token) = self
            .tokens
            .lock()
            .unwrap()
            .iter_mut()
            .find(|t| t.id == *token_id)
        {
            token.last_used_at = Some(at);
        }
        Ok(())
    }

    async fn delete_token_by_hash(&self, token_hash: &str) -> Result<(), RepositoryError> {
        self.tokens
            .lock()
            .unwrap()
            .retain(|t| t.token_hash != token_hash);
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        Ok(self.users.lock().unwrap().len() as u64)
    }
}

/// Provider double that records the last request it was given.
pub struct MockProvider {
    reply: Option<String>,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            last_request: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        static CAPS: ProviderCapabilities = ProviderCapabilities {
            max_context_tokens: 8_192,
            max_output_tokens: 1_024,
        };
        &CAPS
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.reply {
            Some(reply) => Ok(CompletionResponse {
                id: "resp-1".to_string(),
                content: reply.clone(),
                model: "mock-model".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: Usage {
                    input_tokens: 11,
                    output_tokens: 7,
                },
            }),
            None => Err(LlmError::Overloaded("try again later".to_string())),
        }
    }
}

/// Reversible, non-cryptographic hasher for service tests.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        Ok(password_hash == format!("plain:{password}"))
    }

    fn generate_token(&self) -> String {
        format!("cp_{}", Uuid::now_v7().simple())
    }

    fn hash_token(&self, token: &str) -> String {
        format!("hashed:{token}")
    }
}
