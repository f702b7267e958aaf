//! Unified error handling for request handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    repository::RepositoryError,
    views::{ErrorContext, Page, templates},
};

/// Application-level error type.
///
/// Every variant terminates the request and renders one of the error pages.
/// Validation failures are not errors; handlers re-render their form instead.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed outside of a handled constraint violation.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session store could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Principal lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (template, title) = match status {
            StatusCode::FORBIDDEN => (templates::FORBIDDEN, "Forbidden"),
            StatusCode::NOT_FOUND => (templates::NOT_FOUND, "Page Not Found"),
            _ => {
                tracing::error!(error = %self, "Request failed");
                (templates::SERVER_ERROR, "Internal Server Error")
            }
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Session(_) => {
                "The server encountered an internal error.".to_string()
            }
            _ => self.to_string(),
        };

        let context = ErrorContext {
            code: status.as_u16(),
            heading: format!("{} Error", status.as_u16()),
            message,
        };

        Page::new(template, title, context)
            .with_status(status)
            .into_response()
    }
}
