//! Career profile HTTP handlers.
//!
//! Endpoints:
//! - GET /api/v1/profile - The caller's profile (empty if never saved)
//! - PUT /api/v1/profile - Replace the caller's profile

use std::time::Instant;

use axum::extract::State;
use axum::Json;

use careerpath_types::user::{ProfileRecord, UserProfile};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<UserProfile>, AppError> {
    let start = Instant::now();

    let profile = state.account_service.get_profile(&auth.user.id).await?;

    Ok(ApiResponse::success(profile, start).with_link("self", "/api/v1/profile"))
}

/// PUT /api/v1/profile
///
/// Fields left out of the body are cleared; the profile is replaced as a whole.
pub async fn put_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UserProfile>,
) -> Result<ApiResponse<ProfileRecord>, AppError> {
    let start = Instant::now();

    let record = state
        .account_service
        .upsert_profile(&auth.user.id, body)
        .await?;

    Ok(ApiResponse::success(record, start).with_link("self", "/api/v1/profile"))
}
