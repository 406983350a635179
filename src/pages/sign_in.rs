use maud::{Markup, html};

use super::layout::{APP_TITLE, document};

/// The authorization gate's fallback page. Deliberately free of dashboard
/// chrome: nothing about the requested page is revealed.
pub fn sign_in(next: Option<&str>, allow_user_id: bool, error: Option<&str>) -> Markup {
    document(
        "Sign in",
        html! {
            div class="flex min-h-screen items-center justify-center" {
                form method="post" action="/login" class="w-96 rounded-lg bg-white p-8 shadow" {
                    h1 class="mb-6 text-xl font-bold text-gray-900" { "Sign in to " (APP_TITLE) }
                    @if let Some(error) = error {
                        p class="mb-4 text-sm text-red-600" role="alert" { (error) }
                    }
                    @if let Some(next) = next {
                        input type="hidden" name="next" value=(next);
                    }
                    label class="block text-sm font-medium text-gray-700" for="token" { "Session token" }
                    input id="token" name="token" type="password" autocomplete="off"
                        class="mt-1 mb-4 w-full rounded border px-3 py-2";
                    @if allow_user_id {
                        label class="block text-sm font-medium text-gray-700" for="user_id" { "Development user id" }
                        input id="user_id" name="user_id" type="text"
                            class="mt-1 mb-4 w-full rounded border px-3 py-2";
                    }
                    button type="submit" class="w-full rounded bg-blue-600 py-2 text-white" { "Sign in" }
                }
            }
        },
    )
}

pub fn not_found(path: &str) -> Markup {
    document(
        "Not found",
        html! {
            div class="flex min-h-screen items-center justify-center" {
                div class="text-center" {
                    h1 class="mb-4 text-6xl font-bold text-gray-900" { "404" }
                    p class="mb-8 text-xl text-gray-600" { "No page at " code { (path) } }
                    a href="/" class="text-blue-600 underline hover:text-blue-800" { "Back to the dashboard" }
                }
            }
        },
    )
}
