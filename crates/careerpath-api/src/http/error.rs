//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use careerpath_types::error::{AuthError, ChatError};
use careerpath_types::llm::LlmError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Chat(ChatError),
    Auth(AuthError),
    /// Authentication failure outside the account service (bad header).
    Unauthorized(String),
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl AppError {
    /// HTTP status, stable error code, and client-facing message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(ChatError::SessionNotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
            ),
            AppError::Chat(ChatError::Validation(msg)) | AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Chat(ChatError::Llm(e)) => {
                let message = match e {
                    LlmError::AuthenticationFailed => {
                        "Completion provider rejected the configured API key".to_string()
                    }
                    LlmError::RateLimited { .. } => {
                        "Completion provider is rate limiting requests; try again shortly"
                            .to_string()
                    }
                    other => {
                        tracing::warn!(error = %other, "Completion provider failed");
                        "Completion provider failed; try again later".to_string()
                    }
                };
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", message)
            }
            AppError::Auth(AuthError::MissingField(field)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Missing required field: {field}"),
            ),
            AppError::Auth(AuthError::EmailTaken(email)) => (
                StatusCode::CONFLICT,
                "EMAIL_TAKEN",
                format!("Email '{email}' is already registered"),
            ),
            AppError::Auth(e @ (AuthError::InvalidCredentials | AuthError::InvalidToken)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", e.to_string())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Chat(e) => internal(e.to_string()),
            AppError::Auth(e) => internal(e.to_string()),
        }
    }
}

fn internal(detail: String) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error while handling request");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        ApiResponse::<()>::failure(status, code, message).into_response()
    }
}
