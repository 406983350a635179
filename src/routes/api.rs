use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated API Router Module
///
/// JSON endpoints. Each handler takes `AuthUser` directly, so an unauthenticated
/// call is answered with 401 rather than the page gate's login redirect.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/session
        // The identity behind the caller's session.
        .route("/api/session", get(handlers::get_session))
}
