use axum::{
    Json, Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore,
    cookie::{SameSite, time::Duration},
};
use tracing::{Level, Span};
use utoipa::OpenApi;

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod notices;
pub mod repository;
pub mod views;

// Routes grouped by guard (public, authenticated, admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "mentorship_session";

/// ApiDoc
///
/// OpenAPI document for every route, built from the `#[utoipa::path]` and
/// `ToSchema` annotations. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::home::homepage, handlers::home::dashboard, handlers::home::admin_dashboard,
        handlers::session::login, handlers::session::logout,
        handlers::departments::list_departments, handlers::departments::add_department,
        handlers::departments::edit_department, handlers::departments::delete_department,
        handlers::mentors::list_mentors, handlers::mentors::add_mentor,
        handlers::mentors::edit_mentor, handlers::mentors::delete_mentor,
        handlers::mentees::list_mentees, handlers::mentees::assign_mentee
    ),
    components(
        schemas(
            models::Department, models::Mentor, models::Mentee, auth::Principal,
            notices::Notice, notices::NoticeLevel,
            views::HomeContext, views::DashboardContext, views::LoginContext,
            views::DepartmentsContext, views::DepartmentFormContext,
            views::MentorsContext, views::MentorFormContext,
            views::MenteesContext, views::AssignContext, views::ErrorContext, views::FormAction,
            forms::EntryFormView, forms::AssignFormView, forms::LoginFormView, forms::Choice,
        )
    ),
    tags(
        (name = "mentorship-portal", description = "Mentorship administration")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared, cloneable container for the store and the configuration. Handlers
/// and extractors pull the parts they need through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// Department, mentor and mentee store.
    pub repo: RepositoryState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the guards as route layers and
/// wraps everything in the session, tracing, request-id and CORS layers.
///
/// The session store is a parameter so the server can use PostgreSQL and tests
/// can use `MemoryStore`.
pub fn create_router<Store>(state: AppState, store: Store) -> Router
where
    Store: SessionStore + Clone,
{
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // 2. Session cookie
    let sessions = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_secure(state.config.secure_cookies())
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 3. Base Router Assembly
    let base_router = Router::new()
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::auth_middleware,
            )),
        )
        // Every admin route goes through the admin guard.
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_admin,
            )),
        )
        .fallback(handlers::home::not_found)
        .with_state(state)
        .layer(sessions);

    // 4. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the `http_request` span for `TraceLayer`, tagged with the method, URI
/// and the `x-request-id` set by `SetRequestIdLayer`.
fn trace_span_logger(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
