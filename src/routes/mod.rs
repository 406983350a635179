//! Router Module Index
//!
//! Routes are split by access policy. The dashboard pages are generated from
//! the route registry, so a page's gating is decided in exactly one place.

/// Routes accessible to anonymous clients: health, sign-in, the route table.
pub mod public;

/// Page entry points generated from the `RouteRegistry`.
pub mod dashboard;

/// JSON endpoints that resolve the caller through the `AuthUser` extractor.
pub mod api;
