use axum::{
    extract::{FromRef, FromRequestParts, OriginalUri, Request},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::Mentee,
    repository::RepositoryState,
};

/// Session key holding the logged-in mentee's id.
pub const PRINCIPAL_KEY: &str = "principal_id";

/// Path of the login page unauthenticated requests are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Claims
///
/// Payload expected inside bearer tokens issued to API clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the mentee id, as a decimal string.
    pub sub: String,
    /// Expiration Time (exp). Always validated.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// Principal
///
/// The authenticated actor of a request. Resolved from the store on every
/// request, so a revoked admin flag or a deleted account takes effect immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<Mentee> for Principal {
    fn from(mentee: Mentee) -> Self {
        Self {
            id: mentee.id,
            username: mentee.username,
            is_admin: mentee.is_admin,
        }
    }
}

/// Rejection of the `Principal` extractor.
#[derive(Debug)]
pub enum AuthRejection {
    /// No identity could be resolved; carries the original target for `next`.
    RedirectToLogin { next: String },
    /// The store or session failed while resolving the identity.
    Failed(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::Failed(e) => e.into_response(),
        }
    }
}

/// `/login?next=<target>`, with the target url-encoded.
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

/// Only local paths are accepted as post-login targets.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

/// Principal Extractor
///
/// Resolution order, first match wins:
/// 1. Local bypass: in `Env::Local`, an `x-user-id` header naming an existing mentee.
/// 2. Bearer token: HS256 JWT signed with the configured secret.
/// 3. Session: the mentee id stored by the login form.
///
/// A principal already placed in the request extensions (by the admin guard) is
/// reused without another lookup.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let Some(mentee_id) = resolve_mentee_id(parts, &config).await? else {
            return Err(redirect_for(parts));
        };

        let mentee = repo
            .get_mentee(mentee_id)
            .await
            .map_err(|e| AuthRejection::Failed(e.into()))?;

        match mentee {
            Some(mentee) => Ok(mentee.into()),
            // Valid credentials for an account that no longer exists.
            None => Err(redirect_for(parts)),
        }
    }
}

fn redirect_for(parts: &Parts) -> AuthRejection {
    // Nested routers see a stripped URI; the original keeps the `/admin` prefix.
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);
    let next = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    AuthRejection::RedirectToLogin { next }
}

async fn resolve_mentee_id(parts: &Parts, config: &AppConfig) -> Result<Option<i64>, AuthRejection> {
    if config.env == Env::Local
        && let Some(id) = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
    {
        return Ok(Some(id));
    }

    if let Some(token) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        return match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => Ok(data.claims.sub.parse::<i64>().ok()),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                Ok(None)
            }
        };
    }

    if let Some(session) = parts.extensions.get::<Session>() {
        return session
            .get::<i64>(PRINCIPAL_KEY)
            .await
            .map_err(|e| AuthRejection::Failed(e.into()));
    }

    Ok(None)
}

/// auth_middleware
///
/// Route layer for routes that only require a logged-in principal. Extraction
/// failure redirects to the login page before the handler runs.
pub async fn auth_middleware(principal: Principal, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(principal);
    next.run(request).await
}

/// require_admin
///
/// The authorization guard, applied as a route layer to every admin route.
/// Non-admin principals get a 403 and the handler never runs.
pub async fn require_admin(
    principal: Principal,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !principal.is_admin {
        tracing::warn!(
            principal_id = principal.id,
            uri = %request.uri(),
            "Not admin detected"
        );
        return Err(AppError::Forbidden(
            "administrator access required".to_string(),
        ));
    }

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Records a successful login in the session, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn log_in(session: &Session, principal: &Principal) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(PRINCIPAL_KEY, principal.id).await?;
    Ok(())
}

/// Removes the principal from the session, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn log_out(session: &Session) -> Result<(), AppError> {
    session.remove::<i64>(PRINCIPAL_KEY).await?;
    session.cycle_id().await?;
    Ok(())
}
