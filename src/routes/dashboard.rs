use crate::{AppState, auth::AuthUser, handlers, page_gate};
use axum::{
    Router,
    extract::State,
    middleware,
    routing::get,
};

/// Dashboard Router Module
///
/// One `GET` route per registry entry. Guarded pages are collected into their own
/// router and wrapped by `page_gate` as a route layer, so the gate always runs
/// before the layout and feature body are rendered, and runs once per request.
/// Open pages resolve the user optionally, so a signed-in visitor keeps the
/// header and sign-out form there too.
pub fn dashboard_routes(state: &AppState) -> Router<AppState> {
    let mut open = Router::new();
    let mut guarded = Router::new();
    let mut has_guarded = false;

    for route in state.routes.descriptors() {
        let page = route.page;
        let handler = get(
            move |state: State<AppState>, user: Option<AuthUser>| {
                handlers::dashboard_page(page, state, user)
            },
        );

        if route.requires_auth {
            guarded = guarded.route(&route.path, handler);
            has_guarded = true;
        } else {
            open = open.route(&route.path, handler);
        }
    }

    // route_layer refuses an empty router.
    if has_guarded {
        open.merge(guarded.route_layer(middleware::from_fn_with_state(state.clone(), page_gate)))
    } else {
        open
    }
}
