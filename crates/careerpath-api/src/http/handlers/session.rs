//! Session HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/sessions      - List the caller's sessions
//! - POST   /api/v1/sessions      - Start a new session
//! - PATCH  /api/v1/sessions/{id} - Rename a session
//! - DELETE /api/v1/sessions/{id} - Delete a session and its messages

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use careerpath_core::chat::service::DEFAULT_SESSION_PAGE_SIZE;
use careerpath_types::chat::{ChatSession, SessionOverview};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::query::PageQuery;
use crate::http::handlers::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for session creation. Both fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub title: Option<String>,
    pub topic: Option<String>,
}

/// Request body for renaming a session.
#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    pub title: String,
}

/// GET /api/v1/sessions - Most recently active first, each with its last message.
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<Vec<SessionOverview>>, AppError> {
    let start = Instant::now();

    let sessions = state
        .chat_service
        .list_sessions(&auth.user.id, query.page, query.page_size)
        .await?;

    let returned = sessions.len();
    Ok(ApiResponse::success(sessions, start)
        .with_page(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_SESSION_PAGE_SIZE),
            returned,
        )
        .with_link("self", "/api/v1/sessions"))
}

/// POST /api/v1/sessions - Start a new session.
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<ApiResponse<ChatSession>, AppError> {
    let start = Instant::now();
    let Json(body) = body.unwrap_or_default();

    let session = state
        .chat_service
        .create_session(auth.user.id, body.title, body.topic)
        .await?;

    let messages_link = format!("/api/v1/sessions/{}/messages", session.id);
    Ok(ApiResponse::success(session, start)
        .created()
        .with_link("messages", &messages_link))
}

/// PATCH /api/v1/sessions/{id} - Rename a session.
pub async fn update_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateSessionRequest>,
) -> Result<ApiResponse<ChatSession>, AppError> {
    let start = Instant::now();
    let session_id = parse_uuid(&id)?;

    let session = state
        .chat_service
        .update_session_title(&auth.user.id, &session_id, &body.title)
        .await?;

    Ok(ApiResponse::success(session, start)
        .with_link("self", &format!("/api/v1/sessions/{session_id}")))
}

/// DELETE /api/v1/sessions/{id} - Delete a session and its messages.
pub async fn delete_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let session_id = parse_uuid(&id)?;

    state
        .chat_service
        .delete_session(&auth.user.id, &session_id)
        .await?;

    Ok(ApiResponse::success(
        serde_json::json!({ "deleted": true, "id": session_id }),
        start,
    ))
}
