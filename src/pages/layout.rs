use maud::{DOCTYPE, Markup, html};

use crate::{auth::AuthUser, registry::{PageId, RouteDescriptor}};

pub const APP_TITLE: &str = "Dispatch Dashboard";

/// Bare HTML document shared by the dashboard shell and the standalone pages
/// (sign-in, not found).
pub fn document(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · " (APP_TITLE) }
                link rel="stylesheet" href="/assets/dashboard.css";
                script defer src="/assets/dashboard.js" {}
            }
            body class="min-h-screen bg-gray-50" {
                (body)
            }
        }
    }
}

/// dashboard_layout
///
/// Navigation chrome around a feature body. `current` selects the highlighted
/// navigation entry; `routes` is the registry's descriptor list.
pub fn dashboard_layout(
    current: PageId,
    routes: &[RouteDescriptor],
    user: Option<&AuthUser>,
    body: Markup,
) -> Markup {
    document(
        current.label(),
        html! {
            div class="flex min-h-screen" data-current-page=(current.as_str()) {
                aside class="w-64 bg-gray-900 text-gray-100" {
                    div class="px-6 py-5 text-lg font-bold" { (APP_TITLE) }
                    nav {
                        ul {
                            @for route in routes {
                                li { (nav_link(route, route.page == current)) }
                            }
                        }
                    }
                }
                div class="flex flex-1 flex-col" {
                    header class="flex h-16 items-center justify-end border-b bg-white px-6" {
                        @if let Some(user) = user {
                            span class="mr-4 text-sm text-gray-700" { (user.email) }
                            form method="post" action="/logout" {
                                button type="submit" class="text-sm text-blue-600 hover:underline" { "Sign out" }
                            }
                        }
                    }
                    main class="flex-1 p-6" {
                        (body)
                    }
                }
            }
        },
    )
}

fn nav_link(route: &RouteDescriptor, active: bool) -> Markup {
    let class = if active {
        "block px-6 py-2 bg-gray-700 text-white"
    } else {
        "block px-6 py-2 text-gray-300 hover:bg-gray-800 hover:text-white"
    };
    html! {
        a href=(route.path) class=(class) aria-current=[active.then_some("page")] {
            (route.label)
        }
    }
}
