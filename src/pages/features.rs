//! Feature page bodies. Each is a client mount point: the page-specific
//! content is fetched and rendered by the front-end bundle, so the server only
//! emits the section skeleton and a loading indicator.

use maud::{Markup, html};

use super::loading::loading;
use crate::registry::PageId;

fn description(page: PageId) -> &'static str {
    match page {
        PageId::Billing => "Invoices, payouts and outstanding balances.",
        PageId::Drivers => "Driver roster, availability and assignments.",
        PageId::Orders => "Active, scheduled and completed delivery orders.",
        PageId::Reports => "Operational and financial reports.",
        PageId::Users => "Dashboard operators and their roles.",
        PageId::Settings => "Account and dispatch preferences.",
        PageId::TestOrder => "Create a test order to exercise the dispatch flow.",
    }
}

/// The body rendered inside the layout shell for `page`.
pub fn feature(page: PageId) -> Markup {
    let caption = format!("Loading {}", page.label().to_lowercase());
    html! {
        section class="feature" data-feature=(page.as_str()) {
            header class="mb-6" {
                h1 class="text-2xl font-semibold text-gray-900" { (page.label()) }
                p class="text-gray-600" { (description(page)) }
            }
            div id="feature-root" {
                (loading(&caption))
            }
        }
    }
}
