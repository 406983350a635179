use dispatch_dashboard::{
    AppState, InMemoryUserRepository, RouteRegistry,
    config::{AppConfig, Env},
    create_router,
    repository::RepositoryState,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initializes logging, builds the user repository and the
/// route registry, then serves the dashboard.
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dispatch_dashboard=debug,tower_http=info,axum=trace".into());

    // Pretty output locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Dashboard starting in {:?} mode", config.env);

    let users = match (&config.users_file, &config.env) {
        (Some(path), _) => InMemoryUserRepository::from_json_file(path)
            .unwrap_or_else(|e| panic!("FATAL: failed to load users from {path}: {e}")),
        (None, Env::Local) => {
            tracing::warn!("DASHBOARD_USERS_FILE not set, seeding the local development operator");
            InMemoryUserRepository::with_local_dev_user()
        }
        (None, Env::Production) => {
            tracing::warn!("DASHBOARD_USERS_FILE not set, no one will be able to sign in");
            InMemoryUserRepository::default()
        }
    };
    tracing::info!(users = users.len(), "user repository loaded");
    let repo = Arc::new(users) as RepositoryState;

    let routes =
        RouteRegistry::from_definitions(RouteRegistry::canonical_definitions(&config.public_pages))
            .unwrap_or_else(|e| panic!("FATAL: invalid route registry: {e}"));
    for route in routes.descriptors() {
        tracing::info!(path = %route.path, guarded = route.requires_auth, "registered page");
    }

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        repo,
        routes: Arc::new(routes),
        config,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: failed to bind {bind_addr}: {e}"));

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API documentation available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server terminated");
    }
}
