//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/` except `/health`.
//! Middleware: CORS, request tracing.

use axum::extract::State;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Accounts
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
        .route(
            "/profile",
            get(handlers::profile::get_profile).put(handlers::profile::put_profile),
        )
        // Sessions
        .route(
            "/sessions",
            get(handlers::session::list_sessions).post(handlers::session::create_session),
        )
        .route(
            "/sessions/{id}",
            patch(handlers::session::update_session).delete(handlers::session::delete_session),
        )
        // Messages
        .route(
            "/sessions/{id}/messages",
            get(handlers::message::get_messages).post(handlers::message::send_message),
        )
        .route("/sessions/{id}/context", get(handlers::message::get_context));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness check (no auth required).
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "llm_configured": state.llm_configured,
    }))
}
