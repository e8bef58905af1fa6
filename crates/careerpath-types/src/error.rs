use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in careerpath-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to chat session operations.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The session does not exist or belongs to another user.
    #[error("session not found")]
    SessionNotFound,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("completion failed: {0}")]
    Llm(#[from] LlmError),
}

/// Errors related to accounts and authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("email '{0}' is already registered")]
    EmailTaken(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("password hashing failed")]
    Hashing,

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}
