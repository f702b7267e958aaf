use crate::{AppState, handlers::{home, session}};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes available to any logged-in mentee. Wrapped in `auth_middleware`, which
/// redirects anonymous requests to `/login?next=...` before a handler runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/dashboard", get(home::dashboard))
        .route("/logout", get(session::logout))
}
