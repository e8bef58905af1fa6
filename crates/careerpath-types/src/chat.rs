//! Chat session and message types for careerpath.
//!
//! A user owns many sessions; a session holds an append-only, chronologically
//! ordered list of messages exchanged with the counselor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

use crate::llm::PromptUnit;

/// A counseling chat session owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// Optional free-form topic chosen when the session was opened.
    pub topic: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Bumped after every completed exchange; sessions list newest first.
    pub updated_at: DateTime<Utc>,
}

/// A single message within a chat session.
///
/// Messages are immutable and ordered by `created_at`, ties broken by
/// insertion order. Assistant messages carry provider metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Model that produced this message (assistant messages only).
    pub model: Option<String>,
    /// Input tokens consumed by this message (assistant messages only).
    pub input_tokens: Option<u32>,
    /// Output tokens generated for this message (assistant messages only).
    pub output_tokens: Option<u32>,
    /// Response latency in milliseconds (assistant messages only).
    pub response_ms: Option<u64>,
}

impl ChatMessage {
    /// The role/content pair this message contributes to a context window.
    pub fn to_prompt_unit(&self) -> PromptUnit {
        PromptUnit::new(self.role, self.content.clone())
    }
}

/// A session together with its most recent message, for history listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOverview {
    #[serde(flatten)]
    pub session: ChatSession,
    pub last_message: Option<ChatMessage>,
}

/// The pair of messages persisted by one send-message exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExchange {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}
