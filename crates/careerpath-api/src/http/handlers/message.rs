//! Message and context HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/v1/sessions/{id}/messages - Page through history
//! - POST /api/v1/sessions/{id}/messages - Send a message, get the reply
//! - GET  /api/v1/sessions/{id}/context  - Preview the next context window

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use careerpath_core::chat::service::DEFAULT_MESSAGE_PAGE_SIZE;
use careerpath_core::context::window::ContextWindow;
use careerpath_types::chat::{ChatExchange, ChatMessage};
use careerpath_types::llm::PromptUnit;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::query::{ContextQuery, PageQuery};
use crate::http::handlers::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
}

/// Serializable view of a context window.
#[derive(Debug, Serialize)]
pub struct ContextPreview {
    pub budget: i64,
    pub included_messages: usize,
    pub omitted_messages: usize,
    pub truncated: bool,
    pub history_tokens: i64,
    pub units: Vec<PromptUnit>,
}

impl ContextPreview {
    pub fn new(window: ContextWindow, budget: i64) -> Self {
        Self {
            budget,
            included_messages: window.included_messages(),
            omitted_messages: window.omitted_messages(),
            truncated: window.is_truncated(),
            history_tokens: window.history_tokens(),
            units: window.into_units(),
        }
    }
}

/// GET /api/v1/sessions/{id}/messages - Oldest first.
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<Vec<ChatMessage>>, AppError> {
    let start = Instant::now();
    let session_id = parse_uuid(&id)?;

    let messages = state
        .chat_service
        .get_messages(&auth.user.id, &session_id, query.page, query.page_size)
        .await?;

    let returned = messages.len();
    Ok(ApiResponse::success(messages, start)
        .with_page(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_MESSAGE_PAGE_SIZE),
            returned,
        )
        .with_link("self", &format!("/api/v1/sessions/{session_id}/messages")))
}

/// POST /api/v1/sessions/{id}/messages - Send a message and wait for the reply.
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<ApiResponse<ChatExchange>, AppError> {
    let start = Instant::now();
    let session_id = parse_uuid(&id)?;

    let exchange = state
        .chat_service
        .send_message(&auth.user.id, &session_id, body.content)
        .await?;

    Ok(ApiResponse::success(exchange, start)
        .created()
        .with_link("messages", &format!("/api/v1/sessions/{session_id}/messages")))
}

/// GET /api/v1/sessions/{id}/context - What the next send would put in front of the model.
pub async fn get_context(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<ContextQuery>,
) -> Result<ApiResponse<ContextPreview>, AppError> {
    let start = Instant::now();
    let session_id = parse_uuid(&id)?;
    let budget = query
        .budget
        .unwrap_or(state.chat_service.settings().history_token_budget);

    let window = state
        .chat_service
        .preview_context_window(Some(&auth.user.id), &session_id, Some(budget))
        .await?;

    Ok(ApiResponse::success(ContextPreview::new(window, budget), start))
}
