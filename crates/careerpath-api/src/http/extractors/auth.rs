//! Bearer token authentication extractor.
//!
//! Reads `Authorization: Bearer <token>` and resolves it to a user through
//! the account service. Tokens are stored as SHA-256 hashes, so the raw
//! value only lives for the duration of the request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use careerpath_types::user::User;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated caller. Extracting this validates the bearer token.
pub struct AuthUser {
    pub user: User,
    /// The raw token, kept so logout can revoke it.
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;
        let user = state.account_service.authenticate(&token).await?;
        Ok(AuthUser { user, token })
    }
}

/// Pull the token out of the `Authorization` header.
fn extract_bearer_token(parts: &Parts) -> Result<String, AppError> {
    let Some(auth) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
        return Err(AppError::Unauthorized(
            "Missing token. Provide it via 'Authorization: Bearer <token>'.".to_string(),
        ));
    };

    let auth_str = auth.to_str().map_err(|_| {
        AppError::Unauthorized("Invalid Authorization header encoding".to_string())
    })?;

    match auth_str.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AppError::Unauthorized(
            "Authorization header must use the Bearer scheme".to_string(),
        )),
    }
}
