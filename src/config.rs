use std::env;

use crate::registry::PageId;

/// AppConfig
///
/// Holds the dashboard's configuration. Immutable once loaded and pulled into
/// handlers and extractors through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the development sign-in shortcuts.
    pub env: Env,
    // HS256 secret used to sign and validate session tokens.
    pub jwt_secret: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Optional JSON file holding the known dashboard users.
    pub users_file: Option<String>,
    // Pages served without the authorization gate.
    pub public_pages: Vec<PageId>,
    // Lifetime of tokens issued by the local sign-in form.
    pub session_ttl_secs: i64,
    // Directory served under `/assets` (front-end bundle for the feature pages).
    pub assets_dir: String,
}

/// Env
///
/// Distinguishes local development (pretty logs, `x-user-id` bypass, user-id
/// sign-in) from production (JSON logs, token-only sessions).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_SECS: i64 = 8 * 60 * 60;
const DEFAULT_ASSETS_DIR: &str = "assets";

impl Default for AppConfig {
    /// Non-panicking values for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            users_file: None,
            public_pages: Vec::new(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            assets_dir: DEFAULT_ASSETS_DIR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics when `APP_ENV` is set to anything but `local` or `production`,
    /// when `SESSION_JWT_SECRET` is missing in production, when
    /// `DASHBOARD_PUBLIC_PAGES` names an unknown page, or when
    /// `SESSION_TTL_SECS` is not a positive integer.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV") {
            Err(_) => Env::Local,
            Ok(raw) => parse_env(&raw),
        };

        let jwt_secret = match env {
            Env::Production => env::var("SESSION_JWT_SECRET")
                .expect("FATAL: SESSION_JWT_SECRET must be set in production."),
            Env::Local => {
                env::var("SESSION_JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string())
            }
        };

        let public_pages = env::var("DASHBOARD_PUBLIC_PAGES")
            .map(|raw| parse_page_list(&raw))
            .unwrap_or_default();

        let session_ttl_secs = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .expect("FATAL: SESSION_TTL_SECS must be a positive integer."),
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        Self {
            env,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            users_file: env::var("DASHBOARD_USERS_FILE").ok().filter(|p| !p.is_empty()),
            public_pages,
            session_ttl_secs,
            assets_dir: env::var("ASSETS_DIR").unwrap_or_else(|_| DEFAULT_ASSETS_DIR.to_string()),
        }
    }
}

// A typo must not silently enable the local sign-in shortcuts.
fn parse_env(raw: &str) -> Env {
    match raw {
        "local" => Env::Local,
        "production" => Env::Production,
        other => panic!("FATAL: APP_ENV must be `local` or `production`, got `{other}`."),
    }
}

fn parse_page_list(raw: &str) -> Vec<PageId> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<PageId>()
                .unwrap_or_else(|e| panic!("FATAL: DASHBOARD_PUBLIC_PAGES: {e}"))
        })
        .collect()
}
