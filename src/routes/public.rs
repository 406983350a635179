use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. None of them render dashboard chrome.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check; returns "ok".
        .route("/health", get(handlers::health))
        // GET /
        // Redirects to the first registered page (which applies its own gate).
        .route("/", get(handlers::home))
        // GET/POST /login
        // The gate's fallback target and the sign-in form handler.
        .route("/login", get(handlers::login_page).post(handlers::login))
        // POST /logout
        .route("/logout", post(handlers::logout))
        // GET /api/routes
        // The route registry as JSON, for client-side navigation.
        .route("/api/routes", get(handlers::get_routes))
}
