use std::env;

/// AppConfig
///
/// Holds the application's configuration. Loaded once at startup and shared with
/// handlers and extractors through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // Runtime environment marker. Controls the `x-user-id` bypass and log format.
    pub env: Env,
    // Secret used to validate bearer tokens issued for API clients.
    pub jwt_secret: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Optional administrator account created at startup if it does not exist.
    pub admin_bootstrap: Option<AdminBootstrap>,
}

/// Env
///
/// The runtime context. `Local` enables development conveniences (header bypass,
/// in-memory store, pretty logs); `Production` requires every secret explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// AdminBootstrap
///
/// Credentials of the administrator seeded on startup. Mentees are otherwise
/// created by an external registration flow, so this is the only way to obtain
/// the first admin on a fresh database.
#[derive(Clone, Debug)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

const LOCAL_JWT_SECRET: &str = "mentorship-local-development-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration for test scaffolding: local environment,
    /// in-memory store, no bootstrap admin.
    fn default() -> Self {
        Self {
            db_url: None,
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            admin_bootstrap: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in `Production` when `DATABASE_URL` or `JWT_SECRET` is missing, so the
    /// service never starts half-configured.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("APP_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let admin_bootstrap = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminBootstrap { username, password })
            }
            _ => None,
        };

        match env {
            Env::Local => Self {
                env: Env::Local,
                // Without a database the local server runs on the in-memory store.
                db_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                jwt_secret: env::var("JWT_SECRET")
                    .unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                bind_addr,
                admin_bootstrap,
            },
            Env::Production => Self {
                env: Env::Production,
                db_url: Some(
                    env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
                ),
                jwt_secret: env::var("JWT_SECRET")
                    .expect("FATAL: JWT_SECRET must be set in production."),
                bind_addr,
                admin_bootstrap,
            },
        }
    }

    /// Session cookies are only marked `Secure` outside local development.
    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}
