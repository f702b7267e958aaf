use crate::{AppState, handlers::{home, session}};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints open to anonymous clients: the landing page, the login form and
/// the health check used by load balancers.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check. Never touches the store.
        .route("/health", get(|| async { "ok" }))
        .route("/", get(home::homepage))
        // GET|POST /login?next=...
        .route("/login", get(session::login).post(session::login))
}
