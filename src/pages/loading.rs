use maud::{Markup, html};

/// Centered spinner shown while a feature component fetches its data.
/// An empty `title` renders the spinner alone.
pub fn loading(title: &str) -> Markup {
    html! {
        div class="flex h-64 w-full flex-col items-center justify-center gap-3" {
            span class="loading-spinner h-8 w-8 animate-spin rounded-full border-4 border-gray-300 border-t-blue-600"
                role="status"
                aria-label="Loading" {}
            @if !title.is_empty() {
                p class="loading-title text-sm text-gray-500" { (title) }
            }
        }
    }
}
