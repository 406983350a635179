use axum::{
    Form, Json,
    extract::{Query, State},
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{self, AuthUser},
    config::Env,
    models::{LoginQuery, RouteDescriptorView, SignInForm, UserProfile},
    pages,
    registry::PageId,
};

// --- Page Handlers ---

/// dashboard_page
///
/// Entry point shared by every registered page. On guarded pages the gate has
/// already resolved the user; open pages still show whoever is signed in.
pub async fn dashboard_page(
    page: PageId,
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> Html<String> {
    Html(pages::page(page, state.routes.descriptors(), user.as_ref()).into_string())
}

/// home
///
/// `GET /` sends the visitor to the registry's first page.
pub async fn home(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.routes.home().path)
}

/// login_page
///
/// `GET /login`. Rendered by the gate's redirect target.
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Html<String> {
    let next = sanitize_next(&state, query.next.as_deref());
    Html(pages::sign_in::sign_in(next, state.config.env == Env::Local, None).into_string())
}

/// login
///
/// `POST /login`. A `token` is validated like any other session credential. A bare
/// `user_id` signs in directly, but only in `Env::Local`.
pub async fn login(State(state): State<AppState>, Form(form): Form<SignInForm>) -> Response {
    let next = sanitize_next(&state, form.next.as_deref()).map(str::to_string);
    let allow_user_id = state.config.env == Env::Local;

    let token = form.token.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let user_id = form.user_id.as_deref().map(str::trim).filter(|u| !u.is_empty());

    let session = match (token, user_id) {
        (Some(token), _) => auth::authenticate_session(&state.config, &state.repo, token)
            .await
            .ok()
            .map(|(user, exp)| (user, token.to_string(), auth::remaining_lifetime(exp))),
        (None, Some(raw_id)) if allow_user_id => dev_sign_in(&state, raw_id).await,
        _ => None,
    };

    let Some((user, token, max_age)) = session else {
        tracing::warn!("sign-in rejected");
        let body = pages::sign_in::sign_in(next.as_deref(), allow_user_id, Some("Sign-in failed."));
        return (StatusCode::UNAUTHORIZED, Html(body.into_string())).into_response();
    };

    tracing::info!(user_id = %user.id, "signed in");
    let target = next.unwrap_or_else(|| state.routes.home().path.clone());
    (
        [(header::SET_COOKIE, auth::session_cookie_header(&token, max_age))],
        Redirect::to(&target),
    )
        .into_response()
}

/// logout
///
/// `POST /logout` clears the session cookie.
pub async fn logout() -> Response {
    (
        [(header::SET_COOKIE, auth::cleared_session_cookie_header())],
        Redirect::to("/login"),
    )
        .into_response()
}

pub async fn not_found(uri: Uri) -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(pages::sign_in::not_found(uri.path()).into_string()),
    )
}

// --- JSON API ---

/// health
///
/// Liveness check for load balancers.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// get_routes
///
/// [Public Route] The route registry, in navigation order.
#[utoipa::path(
    get,
    path = "/api/routes",
    responses((status = 200, description = "Registered dashboard pages", body = [RouteDescriptorView]))
)]
pub async fn get_routes(State(state): State<AppState>) -> Json<Vec<RouteDescriptorView>> {
    Json(state.routes.descriptors().iter().map(RouteDescriptorView::from).collect())
}

/// get_session
///
/// [Authenticated Route] The identity behind the current session.
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Signed-in user", body = UserProfile),
        (status = 401, description = "No valid session")
    )
)]
pub async fn get_session(user: AuthUser) -> Json<UserProfile> {
    Json(UserProfile {
        id: user.id,
        email: user.email,
        role: user.role,
    })
}

// --- Helpers ---

// Only registered page paths are accepted as redirect targets.
fn sanitize_next<'a>(state: &AppState, next: Option<&'a str>) -> Option<&'a str> {
    next.filter(|path| state.routes.is_page_path(path))
}

async fn dev_sign_in(state: &AppState, raw_id: &str) -> Option<(AuthUser, String, i64)> {
    let user_id = Uuid::parse_str(raw_id).ok()?;
    let user = state.repo.get_user(user_id).await?;
    let token = match auth::issue_token(&state.config, user.id) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to sign session token");
            return None;
        }
    };
    let user = AuthUser {
        id: user.id,
        email: user.email,
        role: user.role,
    };
    Some((user, token, state.config.session_ttl_secs))
}
