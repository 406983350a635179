use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    repository::RepositoryState,
};

/// Name of the cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "dashboard_session";

/// Claims
///
/// JWT payload of a dashboard session.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id in the user repository.
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. The page gate inserts it
/// into the request extensions so the layout can show who is signed in.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

/// AuthUser Extractor
///
/// Resolution order:
/// 1. `Env::Local` only: an `x-user-id` header naming a known user.
/// 2. `Authorization: Bearer <jwt>`.
/// 3. The `dashboard_session` cookie.
///
/// Whatever credential is found, its subject must still exist in the repository.
/// Rejection: `StatusCode::UNAUTHORIZED` on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|id_str| Uuid::parse_str(id_str).ok());
            if let Some(user_id) = bypass_id {
                if let Some(user) = lookup(&repo, user_id).await {
                    return Ok(user);
                }
            }
        }

        let token = bearer_token(&parts.headers)
            .or_else(|| session_cookie(&parts.headers))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        authenticate_token(&config, &repo, &token).await
    }
}

/// Optional AuthUser Extractor
///
/// Used by pages that render with or without a session. Reuses the identity the
/// page gate already placed in the extensions before resolving credentials again.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(Some(user.clone()));
        }
        Ok(<AuthUser as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .ok())
    }
}

/// authenticate_token
///
/// Validates a session JWT and resolves its subject. Used by the extractor.
pub async fn authenticate_token(
    config: &AppConfig,
    repo: &RepositoryState,
    token: &str,
) -> Result<AuthUser, StatusCode> {
    authenticate_session(config, repo, token)
        .await
        .map(|(user, _)| user)
}

/// authenticate_session
///
/// Like `authenticate_token`, but also returns the token's `exp` (seconds since
/// the epoch) so a session cookie can expire together with its token.
pub async fn authenticate_session(
    config: &AppConfig,
    repo: &RepositoryState,
    token: &str,
) -> Result<(AuthUser, i64), StatusCode> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => tracing::debug!("rejected expired session token"),
            _ => tracing::debug!(error = %e, "rejected invalid session token"),
        }
        StatusCode::UNAUTHORIZED
    })?;

    // A valid token whose user has since been removed no longer grants access.
    let user = lookup(repo, token_data.claims.sub)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;
    Ok((user, token_data.claims.exp as i64))
}

/// Seconds until `exp`, never negative.
pub fn remaining_lifetime(exp: i64) -> i64 {
    (exp - Utc::now().timestamp()).max(0)
}

/// issue_token
///
/// Signs a session token for `user_id` valid for `config.session_ttl_secs`.
pub fn issue_token(config: &AppConfig, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + config.session_ttl_secs) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// Set-Cookie value storing a session token.
pub fn session_cookie_header(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// Set-Cookie value clearing the session.
pub fn cleared_session_cookie_header() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

async fn lookup(repo: &RepositoryState, user_id: Uuid) -> Option<AuthUser> {
    repo.get_user(user_id).await.map(|user| AuthUser {
        id: user.id,
        email: user.email,
        role: user.role,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
