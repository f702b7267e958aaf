//! Request handlers.
//!
//! Admin handlers assume the `require_admin` route layer has already run; they
//! never check the principal themselves.

pub mod departments;
pub mod home;
pub mod mentees;
pub mod mentors;
pub mod session;

use axum::{
    extract::{FromRequestParts, Path},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tower_sessions::Session;

use crate::{
    error::AppError,
    notices::{self, Notice},
    views::Page,
};

/// Listing routes the admin handlers redirect back to.
pub const DEPARTMENTS_PATH: &str = "/admin/departments";
pub const MENTORS_PATH: &str = "/admin/mentors";
pub const MENTEES_PATH: &str = "/admin/mentees";

/// Renders a page with the notices pending in the session.
async fn render<C: Serialize>(
    session: &Session,
    page: Page<C>,
    status: StatusCode,
) -> Result<Response, AppError> {
    let pending = notices::take(session).await?;
    Ok(page.with_notices(pending).with_status(status).into_response())
}

/// Queues a notice and redirects (303) to `location`.
async fn redirect_with(
    session: &Session,
    notice: Notice,
    location: &str,
) -> Result<Response, AppError> {
    notices::flash(session, notice).await?;
    Ok(Redirect::to(location).into_response())
}

/// RecordId
///
/// Numeric `{id}` path segment. A segment that does not parse names no record
/// and gets the 404 page.
pub struct RecordId(pub i64);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, uri = %parts.uri, "Unresolvable record id");
                Err(AppError::NotFound("record".to_string()))
            }
        }
    }
}
