use std::{fmt, str::FromStr};

use thiserror::Error;

/// PageId
///
/// The closed set of dashboard pages. The layout shell only ever receives one of
/// these values as its "current page", so an unrecognized identifier cannot reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Billing,
    Drivers,
    Orders,
    Reports,
    Users,
    Settings,
    TestOrder,
}

impl PageId {
    /// Every page, in navigation order.
    pub const ALL: [PageId; 7] = [
        PageId::Billing,
        PageId::Drivers,
        PageId::Orders,
        PageId::Reports,
        PageId::Users,
        PageId::Settings,
        PageId::TestOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageId::Billing => "billing",
            PageId::Drivers => "drivers",
            PageId::Orders => "orders",
            PageId::Reports => "reports",
            PageId::Users => "users",
            PageId::Settings => "settings",
            PageId::TestOrder => "test-order",
        }
    }

    /// Human-readable navigation label.
    pub fn label(&self) -> &'static str {
        match self {
            PageId::Billing => "Billing",
            PageId::Drivers => "Drivers",
            PageId::Orders => "Orders",
            PageId::Reports => "Reports",
            PageId::Users => "Users",
            PageId::Settings => "Settings",
            PageId::TestOrder => "Test Order",
        }
    }

    /// The URL path the page is served from.
    pub fn path(&self) -> String {
        format!("/{}", self.as_str())
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageId::ALL
            .into_iter()
            .find(|page| page.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownPage(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown page id `{0}`")]
    UnknownPage(String),
    #[error("page `{page}` is defined both with and without the authorization gate")]
    ConflictingPolicy { page: PageId },
    #[error("route registry has no pages")]
    Empty,
}

/// RouteDefinition
///
/// A route as authored by a route source: which page, and whether it sits
/// behind the authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDefinition {
    pub page: PageId,
    pub requires_auth: bool,
}

impl RouteDefinition {
    pub fn guarded(page: PageId) -> Self {
        Self { page, requires_auth: true }
    }

    pub fn open(page: PageId) -> Self {
        Self { page, requires_auth: false }
    }
}

/// RouteDescriptor
///
/// A resolved registry entry. Fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub page: PageId,
    pub path: String,
    pub label: &'static str,
    pub requires_auth: bool,
}

impl From<RouteDefinition> for RouteDescriptor {
    fn from(def: RouteDefinition) -> Self {
        Self {
            page: def.page,
            path: def.page.path(),
            label: def.page.label(),
            requires_auth: def.requires_auth,
        }
    }
}

/// RouteRegistry
///
/// The single source of truth mapping each page to its authorization policy.
/// Built once at startup and shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct RouteRegistry {
    routes: Vec<RouteDescriptor>,
}

impl RouteRegistry {
    /// from_definitions
    ///
    /// Consolidates definitions from any number of route sources. First-seen order
    /// is kept; a page defined twice with the same policy collapses into one entry,
    /// while a page defined twice with different policies is rejected.
    pub fn from_definitions<I>(definitions: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = RouteDefinition>,
    {
        let mut routes: Vec<RouteDescriptor> = Vec::new();

        for def in definitions {
            match routes.iter().find(|r| r.page == def.page) {
                Some(existing) if existing.requires_auth != def.requires_auth => {
                    return Err(RegistryError::ConflictingPolicy { page: def.page });
                }
                Some(_) => continue,
                None => routes.push(RouteDescriptor::from(def)),
            }
        }

        if routes.is_empty() {
            return Err(RegistryError::Empty);
        }

        Ok(Self { routes })
    }

    /// canonical_definitions
    ///
    /// Every dashboard page behind the gate, except the pages an operator has
    /// explicitly listed as public.
    pub fn canonical_definitions(public_pages: &[PageId]) -> Vec<RouteDefinition> {
        PageId::ALL
            .into_iter()
            .map(|page| RouteDefinition {
                page,
                requires_auth: !public_pages.contains(&page),
            })
            .collect()
    }

    /// The registry built from `canonical_definitions`, which never conflict.
    pub fn canonical(public_pages: &[PageId]) -> Self {
        let routes = Self::canonical_definitions(public_pages)
            .into_iter()
            .map(RouteDescriptor::from)
            .collect();
        Self { routes }
    }

    pub fn descriptors(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn get(&self, page: PageId) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.page == page)
    }

    /// The landing page for `/` and for sign-ins without a valid `next`.
    pub fn home(&self) -> &RouteDescriptor {
        // Construction guarantees at least one route.
        &self.routes[0]
    }

    pub fn resolve_path(&self, path: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.path == path)
    }

    pub fn is_page_path(&self, path: &str) -> bool {
        self.resolve_path(path).is_some()
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::canonical(&[])
    }
}
