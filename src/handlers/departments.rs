use axum::{
    Form,
    extract::State,
    http::{Method, StatusCode},
    response::Response,
};
use tower_sessions::Session;

use super::{DEPARTMENTS_PATH, RecordId, redirect_with, render};
use crate::{
    AppState,
    error::AppError,
    forms::{EntryForm, FormErrors},
    models::Department,
    notices::Notice,
    repository::RepositoryError,
    views::{DepartmentFormContext, DepartmentsContext, FormAction, Page, templates},
};

fn form_page(
    action: FormAction,
    form: &EntryForm,
    errors: FormErrors,
    department: Option<Department>,
) -> Page<DepartmentFormContext> {
    let title = match action {
        FormAction::Add => "Add Department",
        FormAction::Edit => "Edit Department",
    };
    Page::new(
        templates::DEPARTMENT_FORM,
        title,
        DepartmentFormContext {
            action,
            add_department: action == FormAction::Add,
            form: form.view(errors),
            department,
        },
    )
}

/// list_departments
///
/// [Admin Route] Renders every department in insertion order. Read-only.
#[utoipa::path(
    method(get, post),
    path = "/admin/departments",
    responses(
        (status = 200, description = "Department list", body = DepartmentsContext),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_departments(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let departments = state.repo.list_departments().await?;
    let page = Page::new(templates::DEPARTMENTS, "Departments", DepartmentsContext { departments });
    render(&session, page, StatusCode::OK).await
}

/// add_department
///
/// [Admin Route] GET shows the empty form. A valid POST inserts the department and
/// redirects to the list; a duplicate name is reported as a notice on the list
/// instead of failing the request. An invalid POST re-renders the form (422)
/// without touching the store.
#[utoipa::path(
    method(get, post),
    path = "/admin/departments/add",
    responses(
        (status = 200, description = "Add form", body = DepartmentFormContext),
        (status = 303, description = "Added (or rejected with a notice)"),
        (status = 422, description = "Missing fields", body = DepartmentFormContext)
    )
)]
pub async fn add_department(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    Form(form): Form<EntryForm>,
) -> Result<Response, AppError> {
    if method != Method::POST {
        let page = form_page(FormAction::Add, &EntryForm::default(), FormErrors::default(), None);
        return render(&session, page, StatusCode::OK).await;
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page = form_page(FormAction::Add, &form, errors, None);
            return render(&session, page, StatusCode::UNPROCESSABLE_ENTITY).await;
        }
    };

    let notice = match state.repo.create_department(input).await {
        Ok(department) => {
            tracing::info!(department_id = department.id, "Department added");
            Notice::success("You have successfully added a new department.")
        }
        Err(RepositoryError::Conflict(reason)) => {
            tracing::warn!(%reason, "Department add rejected");
            Notice::error("Error: department name already exists.")
        }
        Err(e) => {
            tracing::error!(error = %e, "Department add failed");
            Notice::error("Error: could not add the department.")
        }
    };
    redirect_with(&session, notice, DEPARTMENTS_PATH).await
}

/// edit_department
///
/// [Admin Route] GET shows the form pre-populated from the record. A valid POST
/// updates it in place. Store failures, a duplicate name included, are not
/// caught and end in a 500.
#[utoipa::path(
    method(get, post),
    path = "/admin/departments/edit/{id}",
    params(("id" = i64, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Edit form", body = DepartmentFormContext),
        (status = 303, description = "Updated"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Missing fields", body = DepartmentFormContext)
    )
)]
pub async fn edit_department(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    RecordId(id): RecordId,
    Form(form): Form<EntryForm>,
) -> Result<Response, AppError> {
    let department = state
        .repo
        .get_department(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("department {id}")))?;

    if method != Method::POST {
        let form = EntryForm::prefilled(&department.name, &department.description);
        let page = form_page(FormAction::Edit, &form, FormErrors::default(), Some(department));
        return render(&session, page, StatusCode::OK).await;
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page = form_page(FormAction::Edit, &form, errors, Some(department));
            return render(&session, page, StatusCode::UNPROCESSABLE_ENTITY).await;
        }
    };

    state
        .repo
        .update_department(id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("department {id}")))?;
    tracing::info!(department_id = id, "Department edited");

    redirect_with(
        &session,
        Notice::success("You have successfully edited the department."),
        DEPARTMENTS_PATH,
    )
    .await
}

/// delete_department
///
/// [Admin Route] Deletes unconditionally; mentees referencing the department are
/// left unassigned.
#[utoipa::path(
    method(get, post),
    path = "/admin/departments/delete/{id}",
    params(("id" = i64, Path, description = "Department ID")),
    responses(
        (status = 303, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_department(
    State(state): State<AppState>,
    session: Session,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    if !state.repo.delete_department(id).await? {
        return Err(AppError::NotFound(format!("department {id}")));
    }
    tracing::info!(department_id = id, "Department deleted");

    redirect_with(
        &session,
        Notice::success("You have successfully deleted the department."),
        DEPARTMENTS_PATH,
    )
    .await
}
