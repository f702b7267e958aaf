use axum::{
    Form,
    extract::State,
    http::{Method, StatusCode},
    response::Response,
};
use tower_sessions::Session;

use super::{MENTEES_PATH, RecordId, redirect_with, render};
use crate::{
    AppState,
    error::AppError,
    forms::{AssignForm, FormErrors},
    notices::Notice,
    views::{AssignContext, MenteesContext, Page, templates},
};

/// list_mentees
///
/// [Admin Route] Renders every mentee with the names of their assigned
/// department and mentor.
#[utoipa::path(
    get,
    path = "/admin/mentees",
    responses(
        (status = 200, description = "Mentee list", body = MenteesContext),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_mentees(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let mentees = state.repo.list_mentees().await?;
    let page = Page::new(templates::MENTEES, "Mentees", MenteesContext { mentees });
    render(&session, page, StatusCode::OK).await
}

/// assign_mentee
///
/// [Admin Route] Assigns a department and a mentor to a mentee.
///
/// The target mentee must not be an administrator (403). The department and
/// mentor choices are loaded from the store on every request, so a submission
/// naming a record deleted since the form was shown fails validation.
#[utoipa::path(
    method(get, post),
    path = "/admin/mentees/assign/{id}",
    params(("id" = i64, Path, description = "Mentee ID")),
    responses(
        (status = 200, description = "Assign form", body = AssignContext),
        (status = 303, description = "Assigned"),
        (status = 403, description = "Target is an administrator"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Invalid choice", body = AssignContext)
    )
)]
pub async fn assign_mentee(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    RecordId(id): RecordId,
    Form(form): Form<AssignForm>,
) -> Result<Response, AppError> {
    let mentee = state
        .repo
        .get_mentee(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("mentee {id}")))?;

    // Checked on the mentee being edited, not on the acting principal.
    if mentee.is_admin {
        tracing::warn!(mentee_id = id, "Refused to assign an administrator");
        return Err(AppError::Forbidden(
            "administrators cannot be assigned a department or mentor".to_string(),
        ));
    }

    let departments = state.repo.list_departments().await?;
    let mentors = state.repo.list_mentors().await?;

    if method != Method::POST {
        let form = AssignForm::from_mentee(&mentee);
        let context = AssignContext {
            form: form.view(&departments, &mentors, FormErrors::default()),
            mentee,
        };
        let page = Page::new(templates::ASSIGN_FORM, "Assign Mentee", context);
        return render(&session, page, StatusCode::OK).await;
    }

    let assignment = match form.validate(&departments, &mentors) {
        Ok(assignment) => assignment,
        Err(errors) => {
            let context = AssignContext {
                form: form.view(&departments, &mentors, errors),
                mentee,
            };
            let page = Page::new(templates::ASSIGN_FORM, "Assign Mentee", context);
            return render(&session, page, StatusCode::UNPROCESSABLE_ENTITY).await;
        }
    };

    state
        .repo
        .assign_mentee(id, assignment)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("mentee {id}")))?;
    tracing::info!(
        mentee_id = id,
        department_id = assignment.department_id,
        mentor_id = assignment.mentor_id,
        "Mentee assigned"
    );

    redirect_with(
        &session,
        Notice::success("You have successfully assigned a department and mentor."),
        MENTEES_PATH,
    )
    .await
}
