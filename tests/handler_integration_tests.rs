use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use dispatch_dashboard::{
    AppState, InMemoryUserRepository, PageId, RouteRegistry,
    auth::{Claims, SESSION_COOKIE, issue_token},
    config::{AppConfig, Env},
    create_router,
    models::{RouteDescriptorView, User, UserProfile},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

// --- Test Scaffolding ---

const OPERATOR_ID: Uuid = Uuid::from_u128(42);

fn operator() -> User {
    User {
        id: OPERATOR_ID,
        email: "operator@example.com".to_string(),
        role: "dispatcher".to_string(),
    }
}

fn test_state(env: Env, public_pages: &[PageId]) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    config.jwt_secret = "handler-test-secret".to_string();
    config.public_pages = public_pages.to_vec();

    AppState {
        repo: Arc::new(InMemoryUserRepository::new([operator()])),
        routes: Arc::new(RouteRegistry::canonical(public_pages)),
        config,
    }
}

fn app(env: Env, public_pages: &[PageId]) -> (Router, AppState) {
    let state = test_state(env, public_pages);
    (create_router(state.clone()), state)
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

fn token_expiring_in(state: &AppState, secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: OPERATOR_ID,
        iat: now as usize,
        exp: (now + secs) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .unwrap()
}

fn cookie_max_age(response: &Response) -> i64 {
    let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    cookie
        .split(';')
        .find_map(|attr| attr.trim().strip_prefix("Max-Age="))
        .unwrap()
        .parse()
        .unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
}

// --- Authorization Gate ---

#[tokio::test]
async fn unauthenticated_visitor_gets_only_the_gate_fallback() {
    for page in PageId::ALL {
        let (router, _) = app(Env::Production, &[]);
        let response = router.oneshot(get(&page.path())).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{page}");
        assert_eq!(
            location(&response),
            format!("/login?next=%2F{}", page.as_str())
        );

        let body = body_string(response).await;
        assert!(!body.contains("data-feature"), "{page} leaked feature content");
        assert!(!body.contains("<nav"), "{page} leaked layout chrome");
    }
}

#[tokio::test]
async fn authenticated_visitor_sees_layout_and_feature() {
    let (router, state) = app(Env::Production, &[]);
    let token = issue_token(&state.config, OPERATOR_ID).unwrap();

    let response = router
        .oneshot(get_with_token("/drivers", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains(r#"data-current-page="drivers""#));
    assert!(body.contains(r#"data-feature="drivers""#));
    assert!(body.contains("Loading drivers"));
    assert!(body.contains("operator@example.com"));
    assert_eq!(body.matches(r#"aria-current="page""#).count(), 1);
}

#[tokio::test]
async fn session_cookie_opens_the_gate() {
    let (router, state) = app(Env::Production, &[]);
    let token = issue_token(&state.config, OPERATOR_ID).unwrap();

    let request = Request::builder()
        .uri("/test-order")
        .header(header::COOKIE, format!("{SESSION_COOKIE}={token}"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains(r#"data-feature="test-order""#));
}

#[tokio::test]
async fn rendering_is_idempotent_for_the_same_session() {
    let (router, state) = app(Env::Production, &[]);
    let token = issue_token(&state.config, OPERATOR_ID).unwrap();

    let first = router
        .clone()
        .oneshot(get_with_token("/reports", &token))
        .await
        .unwrap();
    let second = router
        .oneshot(get_with_token("/reports", &token))
        .await
        .unwrap();

    assert_eq!(body_string(first).await, body_string(second).await);
}

#[tokio::test]
async fn configured_public_page_skips_the_gate() {
    let (router, _) = app(Env::Production, &[PageId::Settings]);

    let open = router.clone().oneshot(get("/settings")).await.unwrap();
    assert_eq!(open.status(), StatusCode::OK);
    let body = body_string(open).await;
    assert!(body.contains(r#"data-feature="settings""#));
    assert!(!body.contains(r#"action="/logout""#));

    let guarded = router.oneshot(get("/orders")).await.unwrap();
    assert_eq!(guarded.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn public_page_shows_the_signed_in_user() {
    let (router, state) = app(Env::Production, &[PageId::Settings]);
    let token = issue_token(&state.config, OPERATOR_ID).unwrap();

    let response = router
        .oneshot(get_with_token("/settings", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains(r#"data-feature="settings""#));
    assert!(body.contains("operator@example.com"));
    assert!(body.contains(r#"action="/logout""#));
}

#[tokio::test]
async fn public_page_ignores_an_invalid_session() {
    let (router, _) = app(Env::Production, &[PageId::Settings]);
    let response = router
        .oneshot(get_with_token("/settings", "not-a-jwt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!body_string(response).await.contains(r#"action="/logout""#));
}

#[tokio::test]
async fn fully_public_registry_still_serves_pages() {
    let (router, _) = app(Env::Production, &PageId::ALL);
    let response = router.oneshot(get("/billing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// --- Sign-in Flow ---

#[tokio::test]
async fn root_redirects_to_home_page() {
    let (router, _) = app(Env::Production, &[]);
    let response = router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/billing");
}

#[tokio::test]
async fn login_page_keeps_registered_next_only() {
    let (router, _) = app(Env::Production, &[]);

    let response = router
        .clone()
        .oneshot(get("/login?next=%2Forders"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(r#"name="next" value="/orders""#));
    assert!(!body.contains(r#"name="user_id""#));
    assert!(!body.contains("<nav"));

    let response = router
        .oneshot(get("/login?next=https%3A%2F%2Fevil.example"))
        .await
        .unwrap();
    assert!(!body_string(response).await.contains(r#"name="next""#));
}

#[tokio::test]
async fn token_sign_in_sets_cookie_and_redirects_to_next() {
    let (router, state) = app(Env::Production, &[]);
    let token = issue_token(&state.config, OPERATOR_ID).unwrap();

    let response = router
        .oneshot(post_form("/login", &format!("token={token}&next=%2Freports")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/reports");
    let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}={token};")));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn token_sign_in_cookie_expires_with_the_token() {
    let (router, state) = app(Env::Production, &[]);
    let token = token_expiring_in(&state, 600);

    let response = router
        .oneshot(post_form("/login", &format!("token={token}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let max_age = cookie_max_age(&response);
    assert!((595..=600).contains(&max_age), "Max-Age={max_age}");
}

#[tokio::test]
async fn local_sign_in_cookie_uses_the_session_ttl() {
    let (router, state) = app(Env::Local, &[]);
    let response = router
        .oneshot(post_form("/login", &format!("user_id={OPERATOR_ID}")))
        .await
        .unwrap();
    assert_eq!(cookie_max_age(&response), state.config.session_ttl_secs);
}

#[tokio::test]
async fn sign_in_with_foreign_next_lands_on_home() {
    let (router, state) = app(Env::Production, &[]);
    let token = issue_token(&state.config, OPERATOR_ID).unwrap();

    let response = router
        .oneshot(post_form(
            "/login",
            &format!("token={token}&next=https%3A%2F%2Fevil.example%2Fbilling"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/billing");
}

#[tokio::test]
async fn invalid_token_sign_in_is_rejected() {
    let (router, _) = app(Env::Production, &[]);
    let response = router
        .oneshot(post_form("/login", "token=not-a-jwt&next=%2Forders"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_string(response).await.contains("Sign-in failed."));
}

#[tokio::test]
async fn user_id_sign_in_only_in_local() {
    let form = format!("user_id={OPERATOR_ID}");

    let (prod, _) = app(Env::Production, &[]);
    let response = prod.oneshot(post_form("/login", &form)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (local, _) = app(Env::Local, &[]);
    let response = local.oneshot(post_form("/login", &form)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn unknown_user_id_sign_in_is_rejected() {
    let (router, _) = app(Env::Local, &[]);
    let response = router
        .oneshot(post_form("/login", &format!("user_id={}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let (router, _) = app(Env::Production, &[]);
    let response = router.oneshot(post_form("/logout", "")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

// --- JSON API ---

#[tokio::test]
async fn route_table_is_served_as_json() {
    let (router, _) = app(Env::Production, &[PageId::TestOrder]);
    let response = router.oneshot(get("/api/routes")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let routes: Vec<RouteDescriptorView> =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(routes.len(), PageId::ALL.len());
    assert_eq!(
        routes.last().unwrap(),
        &RouteDescriptorView {
            page_id: "test-order".to_string(),
            path: "/test-order".to_string(),
            label: "Test Order".to_string(),
            requires_auth: false,
        }
    );
    assert!(routes.iter().filter(|r| r.page_id != "test-order").all(|r| r.requires_auth));
}

#[tokio::test]
async fn session_endpoint_requires_authentication() {
    let (router, state) = app(Env::Production, &[]);

    let response = router.clone().oneshot(get("/api/session")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = issue_token(&state.config, OPERATOR_ID).unwrap();
    let response = router
        .oneshot(get_with_token("/api/session", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile: UserProfile = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(profile.id, OPERATOR_ID);
    assert_eq!(profile.role, "dispatcher");
}

#[tokio::test]
async fn unknown_path_renders_not_found() {
    let (router, _) = app(Env::Production, &[]);
    let response = router.oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("/dashboard"));
}

#[tokio::test]
async fn front_end_script_is_served() {
    let (router, _) = app(Env::Production, &[]);
    let response = router.oneshot(get("/assets/dashboard.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("feature-root"));
    assert!(body.contains("/api/session"));
}

#[tokio::test]
async fn cross_origin_requests_cannot_send_authorization() {
    let (router, _) = app(Env::Production, &[]);
    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/session")
        .header(header::ORIGIN, "https://elsewhere.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(preflight).await.unwrap();
    let allowed = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    assert!(allowed.contains("content-type"));
    assert!(!allowed.contains("authorization"));
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let (router, _) = app(Env::Production, &[]);
    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
