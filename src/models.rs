use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::registry::RouteDescriptor;

/// User
///
/// A dashboard operator as known to the user repository.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    // RBAC field, e.g. 'dispatcher' or 'admin'.
    pub role: String,
}

/// UserProfile
///
/// Response body of `GET /api/session`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

/// RouteDescriptorView
///
/// Serialized form of a registry entry, served by `GET /api/routes` so client-side
/// feature components can build links without duplicating the route table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct RouteDescriptorView {
    #[schema(example = "billing")]
    pub page_id: String,
    #[schema(example = "/billing")]
    pub path: String,
    #[schema(example = "Billing")]
    pub label: String,
    pub requires_auth: bool,
}

impl From<&RouteDescriptor> for RouteDescriptorView {
    fn from(route: &RouteDescriptor) -> Self {
        Self {
            page_id: route.page.as_str().to_string(),
            path: route.path.clone(),
            label: route.label.to_string(),
            requires_auth: route.requires_auth,
        }
    }
}

/// SignInForm
///
/// Body of `POST /login`. A `token` is accepted in every environment; a bare
/// `user_id` only in `Env::Local`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SignInForm {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// LoginQuery
///
/// Query string of `GET /login`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoginQuery {
    pub next: Option<String>,
}
