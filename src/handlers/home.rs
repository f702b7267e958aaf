use axum::{http::StatusCode, response::Response};
use tower_sessions::Session;

use super::render;
use crate::{
    auth::{AuthRejection, Principal},
    error::AppError,
    views::{DashboardContext, HomeContext, Page, templates},
};

/// homepage
///
/// [Public Route] Landing page. Anonymous visitors are not redirected.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Homepage", body = HomeContext)
    )
)]
pub async fn homepage(
    session: Session,
    principal: Result<Principal, AuthRejection>,
) -> Result<Response, AppError> {
    let context = HomeContext {
        authenticated: principal.is_ok(),
    };
    render(&session, Page::new(templates::HOME, "Home", context), StatusCode::OK).await
}

/// dashboard
///
/// [Authenticated Route] Landing page of a logged-in mentee.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Mentee dashboard", body = DashboardContext),
        (status = 303, description = "Not logged in, redirected to /login")
    )
)]
pub async fn dashboard(session: Session, principal: Principal) -> Result<Response, AppError> {
    let page = Page::new(templates::DASHBOARD, "Dashboard", DashboardContext { principal });
    render(&session, page, StatusCode::OK).await
}

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses(
        (status = 200, description = "Admin dashboard", body = DashboardContext),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn admin_dashboard(session: Session, principal: Principal) -> Result<Response, AppError> {
    let page = Page::new(
        templates::ADMIN_DASHBOARD,
        "Admin Dashboard",
        DashboardContext { principal },
    );
    render(&session, page, StatusCode::OK).await
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("page".to_string())
}
