use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderName, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod registry;
pub mod repository;

// Routing segregated by access policy (public, gated pages, authenticated API).
pub mod routes;
use auth::AuthUser;
use routes::{api, dashboard, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use registry::{PageId, RouteRegistry};
pub use repository::{InMemoryUserRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for the JSON side of the dashboard, served at
/// `/api-docs/openapi.json` and browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::get_routes, handlers::get_session),
    components(schemas(models::RouteDescriptorView, models::UserProfile)),
    tags(
        (name = "dispatch-dashboard", description = "Dispatch dashboard shell API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// User lookup for the authorization gate.
    pub repo: RepositoryState,
    /// The canonical route table.
    pub routes: Arc<RouteRegistry>,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// page_gate
///
/// The authorization gate for dashboard pages. Runs the `AuthUser` extractor; on
/// success the identity is stored in the request extensions for the layout. On
/// failure the visitor gets only a redirect to `/login?next=<path>`: no layout
/// chrome, no feature body.
pub async fn page_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    match AuthUser::from_request_parts(&mut parts, &state).await {
        Ok(user) => {
            parts.extensions.insert(user);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(_) => {
            let path = parts.uri.path();
            tracing::info!(path, "unauthenticated page request, redirecting to sign-in");
            Redirect::to(&format!("/login?next={}", urlencoding::encode(path))).into_response()
        }
    }
}

/// create_router
///
/// Assembles public routes, the registry-generated page routes, the authenticated
/// API and the documentation, then applies the observability layers.
pub fn create_router(state: AppState) -> Router {
    // Other origins may read the public JSON API only. Cookies are not allowed
    // cross-origin and `Authorization` is left out of the allowed headers, so a
    // session is never presented from a foreign page.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(api::api_routes())
        .merge(dashboard::dashboard_routes(&state))
        .nest_service("/assets", ServeDir::new(&state.config.assets_dir))
        .fallback(handlers::not_found)
        .with_state(state);

    // Request ids are generated first so the trace span can record them.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one HTTP request, correlated by its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
