//! Account HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/auth/signup - Create an account
//! - POST /api/v1/auth/login  - Exchange credentials for a bearer token
//! - POST /api/v1/auth/logout - Revoke the current token
//! - GET  /api/v1/me          - The authenticated user

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use careerpath_types::user::{IssuedToken, User};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/v1/auth/signup - Create an account.
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<ApiResponse<User>, AppError> {
    let start = Instant::now();

    let user = state
        .account_service
        .signup(&body.email, &body.password, body.name)
        .await?;

    Ok(ApiResponse::success(user, start)
        .created()
        .with_link("login", "/api/v1/auth/login"))
}

/// POST /api/v1/auth/login - Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiResponse<IssuedToken>, AppError> {
    let start = Instant::now();

    let issued = state
        .account_service
        .login(&body.email, &body.password)
        .await?;

    Ok(ApiResponse::success(issued, start)
        .with_link("me", "/api/v1/me")
        .with_link("sessions", "/api/v1/sessions"))
}

/// POST /api/v1/auth/logout - Revoke the token used for this request.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();

    state.account_service.logout(&auth.token).await?;
    tracing::info!(user_id = %auth.user.id, "Logged out");

    Ok(ApiResponse::success(
        serde_json::json!({ "logged_out": true }),
        start,
    ))
}

/// GET /api/v1/me - The authenticated user.
pub async fn me(auth: AuthUser) -> Result<ApiResponse<User>, AppError> {
    let start = Instant::now();

    Ok(ApiResponse::success(auth.user, start)
        .with_link("self", "/api/v1/me")
        .with_link("profile", "/api/v1/profile"))
}
