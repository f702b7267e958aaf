use crate::{
    AppState,
    handlers::{departments, home, mentees, mentors},
};
use axum::{
    Router,
    routing::{MethodFilter, get, on},
};

/// Admin Router Module
///
/// Management of departments, mentors and mentee assignments. The whole router
/// is wrapped in `require_admin`; non-admin principals get a 403 and anonymous
/// requests are sent to the login page.
///
/// Form routes answer both GET (render) and POST (submit) on the same path.
pub fn admin_routes() -> Router<AppState> {
    let get_or_post = MethodFilter::GET.or(MethodFilter::POST);

    Router::new()
        .route("/dashboard", get(home::admin_dashboard))
        // --- Departments ---
        .route("/departments", on(get_or_post, departments::list_departments))
        .route("/departments/add", on(get_or_post, departments::add_department))
        .route("/departments/edit/{id}", on(get_or_post, departments::edit_department))
        .route("/departments/delete/{id}", on(get_or_post, departments::delete_department))
        // --- Mentors ---
        .route("/mentors", get(mentors::list_mentors))
        .route("/mentors/add", on(get_or_post, mentors::add_mentor))
        .route("/mentors/edit/{id}", on(get_or_post, mentors::edit_mentor))
        .route("/mentors/delete/{id}", on(get_or_post, mentors::delete_mentor))
        // --- Mentees ---
        .route("/mentees", get(mentees::list_mentees))
        .route("/mentees/assign/{id}", on(get_or_post, mentees::assign_mentee))
}
