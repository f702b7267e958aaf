use axum::{
    Form,
    extract::State,
    http::{Method, StatusCode},
    response::Response,
};
use tower_sessions::Session;

use super::{MENTORS_PATH, RecordId, redirect_with, render};
use crate::{
    AppState,
    error::AppError,
    forms::{EntryForm, FormErrors},
    models::Mentor,
    notices::Notice,
    repository::RepositoryError,
    views::{FormAction, MentorFormContext, MentorsContext, Page, templates},
};

fn form_page(
    action: FormAction,
    form: &EntryForm,
    errors: FormErrors,
    mentor: Option<Mentor>,
) -> Page<MentorFormContext> {
    let title = match action {
        FormAction::Add => "Add Mentor",
        FormAction::Edit => "Edit Mentor",
    };
    Page::new(
        templates::MENTOR_FORM,
        title,
        MentorFormContext {
            action,
            add_mentor: action == FormAction::Add,
            form: form.view(errors),
            mentor,
        },
    )
}

/// list_mentors
///
/// [Admin Route] Renders every mentor in insertion order.
#[utoipa::path(
    get,
    path = "/admin/mentors",
    responses(
        (status = 200, description = "Mentor list", body = MentorsContext),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_mentors(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let mentors = state.repo.list_mentors().await?;
    let page = Page::new(templates::MENTORS, "Mentors", MentorsContext { mentors });
    render(&session, page, StatusCode::OK).await
}

/// add_mentor
///
/// [Admin Route] Same flow as `add_department`: duplicate names end in a notice
/// on the mentor list, not a failed request.
#[utoipa::path(
    method(get, post),
    path = "/admin/mentors/add",
    responses(
        (status = 200, description = "Add form", body = MentorFormContext),
        (status = 303, description = "Added (or rejected with a notice)"),
        (status = 422, description = "Missing fields", body = MentorFormContext)
    )
)]
pub async fn add_mentor(
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

    let notice = match state.repo.create_mentor(input).await {
        Ok(mentor) => {
            tracing::info!(mentor_id = mentor.id, "Mentor added");
            Notice::success("You have successfully added a new mentor.")
        }
        Err(RepositoryError::Conflict(reason)) => {
            tracing::warn!(%reason, "Mentor add rejected");
            Notice::error("Error: mentor name already exists.")
        }
        Err(e) => {
            tracing::error!(error = %e, "Mentor add failed");
            Notice::error("Error: could not add the mentor.")
        }
    };
    redirect_with(&session, notice, MENTORS_PATH).await
}

/// edit_mentor
///
/// [Admin Route] Store failures are propagated, as for departments.
#[utoipa::path(
    method(get, post),
    path = "/admin/mentors/edit/{id}",
    params(("id" = i64, Path, description = "Mentor ID")),
    responses(
        (status = 200, description = "Edit form", body = MentorFormContext),
        (status = 303, description = "Updated"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Missing fields", body = MentorFormContext)
    )
)]
pub async fn edit_mentor(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    RecordId(id): RecordId,
    Form(form): Form<EntryForm>,
) -> Result<Response, AppError> {
    let mentor = state
        .repo
        .get_mentor(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("mentor {id}")))?;

    if method != Method::POST {
        let form = EntryForm::prefilled(&mentor.name, &mentor.description);
        let page = form_page(FormAction::Edit, &form, FormErrors::default(), Some(mentor));
        return render(&session, page, StatusCode::OK).await;
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page = form_page(FormAction::Edit, &form, errors, Some(mentor));
            return render(&session, page, StatusCode::UNPROCESSABLE_ENTITY).await;
        }
    };

    state
        .repo
        .update_mentor(id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("mentor {id}")))?;
    tracing::info!(mentor_id = id, "Mentor edited");

    redirect_with(
        &session,
        Notice::success("You have successfully edited the mentor."),
        MENTORS_PATH,
    )
    .await
}

#[utoipa::path(
    method(get, post),
    path = "/admin/mentors/delete/{id}",
    params(("id" = i64, Path, description = "Mentor ID")),
    responses(
        (status = 303, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_mentor(
    State(state): State<AppState>,
    session: Session,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    if !state.repo.delete_mentor(id).await? {
        return Err(AppError::NotFound(format!("mentor {id}")));
    }
    tracing::info!(mentor_id = id, "Mentor deleted");

    redirect_with(
        &session,
        Notice::success("You have successfully deleted the mentor."),
        MENTORS_PATH,
    )
    .await
}
