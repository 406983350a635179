//! Server-rendered views (maud). Every page entry point is composed as
//! layout shell → feature body; the authorization gate sits in front of it as
//! route middleware.

/// Per-page feature bodies.
pub mod features;

/// Navigation chrome and the bare HTML document.
pub mod layout;

/// Spinner with optional caption.
pub mod loading;

/// Gate fallback and the 404 page.
pub mod sign_in;

use maud::Markup;

use crate::{auth::AuthUser, registry::{PageId, RouteDescriptor}};

/// Renders a complete dashboard page.
pub fn page(current: PageId, routes: &[RouteDescriptor], user: Option<&AuthUser>) -> Markup {
    layout::dashboard_layout(current, routes, user, features::feature(current))
}
