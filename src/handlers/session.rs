use axum::{
    Form,
    extract::{Query, State},
    http::{Method, StatusCode},
    response::Response,
};
use serde::Deserialize;
use tower_sessions::Session;
use utoipa::IntoParams;

use super::{redirect_with, render};
use crate::{
    AppState,
    auth::{self, LOGIN_PATH, Principal},
    credentials::verify_password,
    error::AppError,
    forms::{FormErrors, LoginForm},
    notices::Notice,
    views::{LoginContext, Page, templates},
};

const INVALID_LOGIN: &str = "Invalid username or password.";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    /// Local path to return to after logging in.
    pub next: Option<String>,
}

fn login_page(form: &LoginForm, errors: FormErrors, next: Option<&str>) -> Page<LoginContext> {
    let action = match next {
        Some(next) => auth::login_url(next),
        None => LOGIN_PATH.to_string(),
    };
    Page::new(
        templates::LOGIN,
        "Log In",
        LoginContext {
            form: form.view(errors),
            action,
        },
    )
}

/// login
///
/// [Public Route] GET shows the login form. POST checks the credentials, stores
/// the mentee in the session and redirects to `next` when it is a local path,
/// otherwise to the dashboard matching the mentee's role. Unknown usernames and
/// wrong passwords get the same message.
#[utoipa::path(
    method(get, post),
    path = "/login",
    params(LoginQuery),
    responses(
        (status = 200, description = "Login form", body = LoginContext),
        (status = 303, description = "Logged in"),
        (status = 422, description = "Missing fields or bad credentials", body = LoginContext)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    session: Session,
    method: Method,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = auth::safe_next(query.next.as_deref());

    if method != Method::POST {
        let page = login_page(&LoginForm::default(), FormErrors::default(), next);
        return render(&session, page, StatusCode::OK).await;
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page = login_page(&form, errors, next);
            return render(&session, page, StatusCode::UNPROCESSABLE_ENTITY).await;
        }
    };

    let credentials = state.repo.find_credentials(&input.username).await?;
    let mentee = match credentials {
        Some(credentials) if verify_password(&input.password, &credentials.password_hash) => {
            state.repo.get_mentee(credentials.id).await?
        }
        _ => None,
    };

    let Some(mentee) = mentee else {
        tracing::warn!(username = %input.username, "Failed login attempt");
        let mut errors = FormErrors::default();
        errors.add("password", INVALID_LOGIN);
        let page = login_page(&form, errors, next);
        return render(&session, page, StatusCode::UNPROCESSABLE_ENTITY).await;
    };

    let principal = Principal::from(mentee);
    auth::log_in(&session, &principal).await?;
    tracing::info!(principal_id = principal.id, "Logged in");

    let target = match next {
        Some(next) => next,
        None if principal.is_admin => "/admin/dashboard",
        None => "/dashboard",
    };
    redirect_with(
        &session,
        Notice::success(format!("Welcome back, {}.", principal.username)),
        target,
    )
    .await
}

/// logout
///
/// [Authenticated Route] Clears the login and returns to the login page.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 303, description = "Logged out")
    )
)]
pub async fn logout(session: Session, principal: Principal) -> Result<Response, AppError> {
    auth::log_out(&session).await?;
    tracing::info!(principal_id = principal.id, "Logged out");

    redirect_with(
        &session,
        Notice::success("You have successfully been logged out."),
        LOGIN_PATH,
    )
    .await
}
