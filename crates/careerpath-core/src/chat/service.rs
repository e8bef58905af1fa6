//! Chat service orchestrating sessions, history, and completion calls.
//!
//! ChatService coordinates the ChatRepository, the UserRepository (for the
//! profile prompt), and the LlmProvider. Every operation is scoped to the
//! calling user: a session owned by someone else is reported exactly like a
//! missing one.

use std::time::Instant;

use careerpath_types::chat::{
    ChatExchange, ChatMessage, ChatSession, MessageRole, SessionOverview,
};
use careerpath_types::config::{DEFAULT_HISTORY_TOKEN_BUDGET, GlobalConfig};
use careerpath_types::error::ChatError;
use careerpath_types::llm::CompletionRequest;
use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::account::repository::UserRepository;
use crate::chat::repository::ChatRepository;
use crate::chat::title::infer_title;
use crate::context::prompt::{persona_prompt, profile_prompt};
use crate::context::window::{build_context_window, ContextWindow};
use crate::llm::provider::LlmProvider;

/// Title given to sessions created without one.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Longest accepted session title, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Largest page size accepted by the listing operations.
pub const MAX_PAGE_SIZE: u32 = 200;

pub const DEFAULT_SESSION_PAGE_SIZE: u32 = 10;
pub const DEFAULT_MESSAGE_PAGE_SIZE: u32 = 50;

/// Completion settings applied to every send.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    pub history_token_budget: i64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 2_048,
            temperature: None,
            history_token_budget: DEFAULT_HISTORY_TOKEN_BUDGET,
        }
    }
}

impl From<&GlobalConfig> for ChatSettings {
    fn from(config: &GlobalConfig) -> Self {
        Self {
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
            history_token_budget: config.chat.history_token_budget,
        }
    }
}

/// Orchestrates chat sessions and the send-message exchange.
///
/// Generic over its collaborators to maintain clean architecture
/// (careerpath-core never depends on careerpath-infra).
pub struct ChatService<C: ChatRepository, U: UserRepository, P: LlmProvider> {
    chat_repo: C,
    user_repo: U,
    provider: P,
    settings: ChatSettings,
}

impl<C: ChatRepository, U: UserRepository, P: LlmProvider> ChatService<C, U, P> {
    pub fn new(chat_repo: C, user_repo: U, provider: P, settings: ChatSettings) -> Self {
        Self {
            chat_repo,
            user_repo,
            provider,
            settings,
        }
    }

    /// Access the chat repository.
    pub fn chat_repo(&self) -> &C {
        &self.chat_repo
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    // --- Session lifecycle ---

    /// List the user's sessions, most recently active first.
    pub async fn list_sessions(
        &self,
        user_id: &Uuid,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Vec<SessionOverview>, ChatError> {
        let (limit, offset) = page_bounds(page, page_size, DEFAULT_SESSION_PAGE_SIZE)?;
        Ok(self
            .chat_repo
            .list_sessions(user_id, Some(limit), Some(offset))
            .await?)
    }

    /// Open a new session. A blank title becomes [`DEFAULT_SESSION_TITLE`].
    #[tracing::instrument(name = "create_session", skip(self, title, topic), fields(user_id = %user_id))]
    pub async fn create_session(
        &self,
        user_id: Uuid,
        title: Option<String>,
        topic: Option<String>,
    ) -> Result<ChatSession, ChatError> {
        let title = match title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => validate_title(t)?,
            _ => DEFAULT_SESSION_TITLE.to_string(),
        };
        let topic = topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let now = stored_now();
        let session = ChatSession {
            id: Uuid::now_v7(),
            user_id,
            title,
            topic,
            created_at: now,
            updated_at: now,
        };

        let session = self.chat_repo.create_session(&session).await?;
        info!(session_id = %session.id, "Session created");
        Ok(session)
    }

    /// Get one of the user's sessions.
    pub async fn get_session(
        &self,
        user_id: &Uuid,
        session_id: &Uuid,
    ) -> Result<ChatSession, ChatError> {
        self.owned_session(user_id, session_id).await
    }

    /// Rename a session. Titles are trimmed and must be 1..=100 characters.
    pub async fn update_session_title(
        &self,
        user_id: &Uuid,
        session_id: &Uuid,
        title: &str,
    ) -> Result<ChatSession, ChatError> {
        let title = validate_title(title.trim())?;
        let mut session = self.owned_session(user_id, session_id).await?;
        session.title = title;
        self.chat_repo.update_session(&session).await?;
        info!(session_id = %session_id, "Session title updated");
        Ok(session)
    }

    /// Delete a session together with its messages.
    pub async fn delete_session(&self, user_id: &Uuid, session_id: &Uuid) -> Result<(), ChatError> {
        self.owned_session(user_id, session_id).await?;
        self.chat_repo.delete_session(session_id).await?;
        info!(session_id = %session_id, "Session deleted");
        Ok(())
    }

    // --- Messages ---

    /// Page through a session's history in chronological order.
    pub async fn get_messages(
        &self,
        user_id: &Uuid,
        session_id: &Uuid,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let (limit, offset) = page_bounds(page, page_size, DEFAULT_MESSAGE_PAGE_SIZE)?;
        self.owned_session(user_id, session_id).await?;
        Ok(self
            .chat_repo
            .get_messages(session_id, Some(limit), Some(offset))
            .await?)
    }

    /// Send a user message and get the counselor's reply.
    ///
    /// Persists the user message, names the session after its first message,
    /// builds the context window from the full history, calls the provider,
    /// and persists the reply. If the provider fails the user message stays
    /// stored and the error is returned.
    #[tracing::instrument(
        name = "send_message",
        skip(self, content),
        fields(user_id = %user_id, session_id = %session_id)
    )]
    pub async fn send_message(
        &self,
        user_id: &Uuid,
        session_id: &Uuid,
        content: String,
    ) -> Result<ChatExchange, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::Validation(
                "message content must not be empty".to_string(),
            ));
        }

        let mut session = self.owned_session(user_id, session_id).await?;
        let is_first_message = self.chat_repo.get_message_count(session_id).await? == 0;

        let user_message = new_message(session.id, MessageRole::User, content);
        self.chat_repo.save_message(&user_message).await?;

        if is_first_message {
            session.title = infer_title(&user_message.content);
            self.chat_repo.update_session(&session).await?;
            debug!(title = %session.title, "Session title inferred from first message");
        }

        let window = self.assemble_window(&session, None).await?;
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: window.into_units(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let started = Instant::now();
        let response = self.provider.complete(&request).await?;
        let response_ms = started.elapsed().as_millis() as u64;

        let assistant_message = ChatMessage {
            model: Some(response.model),
            input_tokens: Some(response.usage.input_tokens),
            output_tokens: Some(response.usage.output_tokens),
            response_ms: Some(response_ms),
            ..new_message(session.id, MessageRole::Assistant, response.content)
        };
        self.chat_repo.save_message(&assistant_message).await?;

        session.updated_at = stored_now();
        self.chat_repo.update_session(&session).await?;

        info!(
            provider = self.provider.name(),
            response_ms,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Counselor reply stored"
        );

        Ok(ChatExchange {
            user_message,
            assistant_message,
        })
    }

    /// Build the context window the next send would use, without calling
    /// the provider.
    ///
    /// `user_id` scopes the lookup like every other operation; `None` skips
    /// the ownership check (local administrative use). `budget` overrides
    /// the configured history budget.
    pub async fn preview_context_window(
        &self,
        user_id: Option<&Uuid>,
        session_id: &Uuid,
        budget: Option<i64>,
    ) -> Result<ContextWindow, ChatError> {
        let session = match user_id {
            Some(user_id) => self.owned_session(user_id, session_id).await?,
            None => self
                .chat_repo
                .get_session(session_id)
                .await?
                .ok_or(ChatError::SessionNotFound)?,
        };
        self.assemble_window(&session, budget).await
    }

    // --- Internals ---

    async fn owned_session(
        &self,
        user_id: &Uuid,
        session_id: &Uuid,
    ) -> Result<ChatSession, ChatError> {
        match self.chat_repo.get_session(session_id).await? {
            Some(session) if session.user_id == *user_id => Ok(session),
            _ => Err(ChatError::SessionNotFound),
        }
    }

    async fn assemble_window(
        &self,
        session: &ChatSession,
        budget: Option<i64>,
    ) -> Result<ContextWindow, ChatError> {
        let profile = self.user_repo.get_profile(&session.user_id).await?;
        let history = self.chat_repo.get_messages(&session.id, None, None).await?;

        let window = build_context_window(
            &history,
            persona_prompt(),
            profile.map(|record| profile_prompt(&record.profile)),
            Some(budget.unwrap_or(self.settings.history_token_budget)),
        );

        if window.is_truncated() {
            debug!(
                session_id = %session.id,
                included = window.included_messages(),
                omitted = window.omitted_messages(),
                "History truncated to fit token budget"
            );
        }

        Ok(window)
    }
}

/// Current time at the microsecond precision the store keeps, so returned
/// records compare equal to what a later read gives back.
fn stored_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn new_message(session_id: Uuid, role: MessageRole, content: String) -> ChatMessage {
    ChatMessage {
        id: Uuid::now_v7(),
        session_id,
        role,
        content,
        created_at: stored_now(),
        model: None,
        input_tokens: None,
        output_tokens: None,
        response_ms: None,
    }
}

fn validate_title(title: &str) -> Result<String, ChatError> {
    let len = title.chars().count();
    if len == 0 || len > MAX_TITLE_CHARS {
        return Err(ChatError::Validation(format!(
            "title must be between 1 and {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

/// Turn 1-based page parameters into (limit, offset).
fn page_bounds(
    page: Option<u32>,
    page_size: Option<u32>,
    default_size: u32,
) -> Result<(i64, i64), ChatError> {
    let page = page.unwrap_or(1);
    let page_size = page_size.unwrap_or(default_size);
    if page == 0 {
        return Err(ChatError::Validation("page starts at 1".to_string()));
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ChatError::Validation(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    let limit = i64::from(page_size);
    Ok((limit, i64::from(page - 1) * limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::window::SUMMARY_NOTICE;
    use crate::test_support::{MockProvider, MemoryChatRepository, MemoryUserRepository};
    use careerpath_types::llm::{LlmError, PromptUnit};
    use careerpath_types::user::{ProfileRecord, UserProfile};

    type TestService = ChatService<MemoryChatRepository, MemoryUserRepository, MockProvider>;

    fn service_with(provider: MockProvider, budget: i64) -> TestService {
        ChatService::new(
            MemoryChatRepository::default(),
            MemoryUserRepository::default(),
            provider,
            ChatSettings {
                model: "test-model".to_string(),
                max_tokens: 512,
                temperature: Some(0.2),
                history_token_budget: budget,
            },
        )
    }

    fn service() -> TestService {
        service_with(MockProvider::replying("Here is my advice."), 4_000)
    }

    #[tokio::test]
    async fn test_create_session_defaults_title_and_drops_blank_topic() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc
            .create_session(user, Some("   ".to_string()), Some(" ".to_string()))
            .await
            .unwrap();
        assert_eq!(session.title, DEFAULT_SESSION_TITLE);
        assert!(session.topic.is_none());
        assert_eq!(session.user_id, user);
    }

    #[tokio::test]
    async fn test_create_session_rejects_long_title() {
        let svc = service();
        let err = svc
            .create_session(Uuid::now_v7(), Some("x".repeat(101)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
    }

    #[tokio::test]
    async fn test_send_message_persists_exchange_and_infers_title() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc.create_session(user, None, None).await.unwrap();

        let exchange = svc
            .send_message(
                &user,
                &session.id,
                "I want to move from marketing into product management".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(exchange.user_message.role, MessageRole::User);
        assert_eq!(exchange.assistant_message.role, MessageRole::Assistant);
        assert_eq!(exchange.assistant_message.content, "Here is my advice.");
        assert_eq!(exchange.assistant_message.model.as_deref(), Some("mock-model"));
        assert_eq!(exchange.assistant_message.input_tokens, Some(11));
        assert_eq!(exchange.assistant_message.output_tokens, Some(7));
        assert!(exchange.assistant_message.response_ms.is_some());

        let stored = svc.get_session(&user, &session.id).await.unwrap();
        assert_eq!(stored.title, "I want to move from marketing ...");
        assert!(stored.updated_at >= session.updated_at);

        let messages = svc.get_messages(&user, &session.id, None, None).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, exchange.user_message.id);
        assert_eq!(messages[1].id, exchange.assistant_message.id);
    }

    #[tokio::test]
    async fn test_returned_timestamps_use_stored_precision() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc.create_session(user, None, None).await.unwrap();
        assert_eq!(session.created_at.timestamp_subsec_nanos() % 1_000, 0);

        let exchange = svc
            .send_message(&user, &session.id, "Is a bootcamp worth it?".to_string())
            .await
            .unwrap();
        for message in [&exchange.user_message, &exchange.assistant_message] {
            assert_eq!(message.created_at, message.created_at.trunc_subsecs(6));
        }

        let stored = svc.get_session(&user, &session.id).await.unwrap();
        assert_eq!(stored.updated_at, stored.updated_at.trunc_subsecs(6));
    }

    #[tokio::test]
    async fn test_title_only_inferred_for_first_message() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc.create_session(user, None, None).await.unwrap();

        svc.send_message(&user, &session.id, "First question".to_string())
            .await
            .unwrap();
        svc.send_message(&user, &session.id, "Second question".to_string())
            .await
            .unwrap();

        let stored = svc.get_session(&user, &session.id).await.unwrap();
        assert_eq!(stored.title, "First question");
    }

    #[tokio::test]
    async fn test_send_message_sends_window_to_provider() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc.create_session(user, None, None).await.unwrap();

        svc.send_message(&user, &session.id, "Hello".to_string())
            .await
            .unwrap();

        let request = svc.provider.last_request().unwrap();
        assert_eq!(request.model, "test-model");
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0], persona_prompt());
        assert_eq!(request.messages[1], PromptUnit::new(MessageRole::User, "Hello"));
    }

    #[tokio::test]
    async fn test_send_message_includes_profile_prompt() {
        let svc = service();
        let user = Uuid::now_v7();
        let profile = UserProfile {
            name: Some("Grace".to_string()),
            ..Default::default()
        };
        svc.user_repo
            .upsert_profile(&ProfileRecord {
                user_id: user,
                profile: profile.clone(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        let session = svc.create_session(user, None, None).await.unwrap();

        svc.send_message(&user, &session.id, "Hi".to_string())
            .await
            .unwrap();

        let request = svc.provider.last_request().unwrap();
        assert_eq!(request.messages[0], persona_prompt());
        assert_eq!(request.messages[1], profile_prompt(&profile));
        assert_eq!(request.messages[2].content, "Hi");
    }

    #[tokio::test]
    async fn test_send_message_truncates_history_to_budget() {
        // Budget of 3 tokens: only the newest 12-char message fits.
        let svc = service_with(MockProvider::replying("ok"), 3);
        let user = Uuid::now_v7();
        let session = svc.create_session(user, None, None).await.unwrap();

        svc.send_message(&user, &session.id, "first".to_string())
            .await
            .unwrap();
        svc.send_message(&user, &session.id, "twelve chars".to_string())
            .await
            .unwrap();

        let request = svc.provider.last_request().unwrap();
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[1], PromptUnit::system(SUMMARY_NOTICE));
        assert_eq!(request.messages[2].content, "twelve chars");
    }

    #[tokio::test]
    async fn test_send_message_rejects_blank_content() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc.create_session(user, None, None).await.unwrap();
        let err = svc
            .send_message(&user, &session.id, "  \n".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
        assert!(svc.provider.last_request().is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_user_message() {
        let svc = service_with(MockProvider::failing(), 4_000);
        let user = Uuid::now_v7();
        let session = svc.create_session(user, None, None).await.unwrap();

        let err = svc
            .send_message(&user, &session.id, "Hello?".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Llm(LlmError::Overloaded(_))));

        let messages = svc.get_messages(&user, &session.id, None, None).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_foreign_session_looks_missing() {
        let svc = service();
        let owner = Uuid::now_v7();
        let intruder = Uuid::now_v7();
        let session = svc.create_session(owner, None, None).await.unwrap();

        let err = svc
            .send_message(&intruder, &session.id, "hi".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::SessionNotFound));

        assert!(matches!(
            svc.delete_session(&intruder, &session.id).await.unwrap_err(),
            ChatError::SessionNotFound
        ));
        assert!(matches!(
            svc.update_session_title(&intruder, &session.id, "mine").await.unwrap_err(),
            ChatError::SessionNotFound
        ));
        assert!(matches!(
            svc.get_messages(&intruder, &session.id, None, None).await.unwrap_err(),
            ChatError::SessionNotFound
        ));
        assert!(svc.get_session(&owner, &session.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_and_delete_session() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc.create_session(user, None, None).await.unwrap();

        let renamed = svc
            .update_session_title(&user, &session.id, "  Negotiating salary  ")
            .await
            .unwrap();
        assert_eq!(renamed.title, "Negotiating salary");

        let err = svc
            .update_session_title(&user, &session.id, "")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));

        svc.send_message(&user, &session.id, "hi".to_string())
            .await
            .unwrap();
        svc.delete_session(&user, &session.id).await.unwrap();
        assert!(matches!(
            svc.get_session(&user, &session.id).await.unwrap_err(),
            ChatError::SessionNotFound
        ));
        assert_eq!(svc.chat_repo.count_messages().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_sessions_paginates() {
        let svc = service();
        let user = Uuid::now_v7();
        for i in 0..3 {
            svc.create_session(user, Some(format!("Session {i}")), None)
                .await
                .unwrap();
        }
        svc.create_session(Uuid::now_v7(), None, None).await.unwrap();

        let all = svc.list_sessions(&user, None, None).await.unwrap();
        assert_eq!(all.len(), 3);

        let second_page = svc.list_sessions(&user, Some(2), Some(2)).await.unwrap();
        assert_eq!(second_page.len(), 1);

        let err = svc.list_sessions(&user, Some(0), None).await.unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
        let err = svc.list_sessions(&user, None, Some(500)).await.unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
    }

    #[tokio::test]
    async fn test_preview_context_window_uses_budget_override() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc.create_session(user, None, None).await.unwrap();
        svc.send_message(&user, &session.id, "What roles suit a physicist?".to_string())
            .await
            .unwrap();

        let full = svc
            .preview_context_window(Some(&user), &session.id, None)
            .await
            .unwrap();
        assert_eq!(full.included_messages(), 2);
        assert!(!full.is_truncated());

        let none = svc
            .preview_context_window(None, &session.id, Some(0))
            .await
            .unwrap();
        assert_eq!(none.included_messages(), 0);
        assert_eq!(none.omitted_messages(), 2);

        let err = svc
            .preview_context_window(Some(&Uuid::now_v7()), &session.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::SessionNotFound));
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(None, None, 10).unwrap(), (10, 0));
        assert_eq!(page_bounds(Some(3), Some(25), 10).unwrap(), (25, 50));
        assert!(page_bounds(Some(0), None, 10).is_err());
        assert!(page_bounds(None, Some(0), 10).is_err());
    }

    #[test]
    fn test_settings_from_global_config() {
        let config = GlobalConfig::default();
        let settings = ChatSettings::from(&config);
        assert_eq!(settings.model, "openai/gpt-oss-20b");
        assert_eq!(settings.history_token_budget, DEFAULT_HISTORY_TOKEN_BUDGET);
    }
}
