use mentorship_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    credentials,
    repository::{MemoryRepository, PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, store and session backend, then the
/// HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for this crate and request logs from tower-http.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mentorship_portal=debug,tower_http=info,axum=trace".into());

    // 3. Pretty logs locally, JSON in production
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let bind_addr = config.bind_addr.clone();

    // 4. Store and session backend
    let app = match config.db_url.clone() {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("FATAL: Failed to run database migrations.");

            let session_store = PostgresStore::new(pool.clone());
            session_store
                .migrate()
                .await
                .expect("FATAL: Failed to create the session table.");

            let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;
            let state = bootstrap(repo, config).await;
            create_router(state, session_store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
            let state = bootstrap(repo, config).await;
            create_router(state, MemoryStore::default())
        }
    };

    // 5. Server Startup
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check APP_ADDR.");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on {bind_addr}");
    tracing::info!("OpenAPI document available at: http://{bind_addr}/api-docs/openapi.json");

    axum::serve(listener, app).await.expect("HTTP server failed");
}

/// Creates the configured administrator, if any, and assembles the state.
async fn bootstrap(repo: RepositoryState, config: AppConfig) -> AppState {
    if let Some(admin) = &config.admin_bootstrap {
        match credentials::ensure_admin(repo.as_ref(), admin).await {
            Ok(true) => tracing::info!(username = %admin.username, "Bootstrap administrator created"),
            Ok(false) => tracing::debug!(username = %admin.username, "Bootstrap administrator exists"),
            Err(e) => tracing::error!(error = %e, "Could not create the bootstrap administrator"),
        }
    }

    AppState { repo, config }
}
