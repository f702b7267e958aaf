//! Presentation layer.
//!
//! A rendered page is a JSON document naming the view (`template`) the frontend
//! draws, the page title, the notices queued for this response and the
//! view-specific context. Context types are exported to TypeScript with `ts-rs`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    auth::Principal,
    forms::{AssignFormView, EntryFormView, LoginFormView},
    models::{Department, Mentee, Mentor},
    notices::Notice,
};

/// View names understood by the frontend.
pub mod templates {
    pub const HOME: &str = "home/index.html";
    pub const DASHBOARD: &str = "home/dashboard.html";
    pub const ADMIN_DASHBOARD: &str = "home/admin_dashboard.html";
    pub const LOGIN: &str = "auth/login.html";

    pub const DEPARTMENTS: &str = "admin/departments/departments.html";
    pub const DEPARTMENT_FORM: &str = "admin/departments/department.html";
    pub const MENTORS: &str = "admin/mentors/mentors.html";
    pub const MENTOR_FORM: &str = "admin/mentors/mentor.html";
    pub const MENTEES: &str = "admin/mentees/mentees.html";
    pub const ASSIGN_FORM: &str = "admin/mentees/mentee.html";

    pub const FORBIDDEN: &str = "errors/403.html";
    pub const NOT_FOUND: &str = "errors/404.html";
    pub const SERVER_ERROR: &str = "errors/500.html";
}

/// Page
///
/// A named view plus its context. Rendering never touches the store.
#[derive(Debug, Serialize)]
pub struct Page<C> {
    pub template: &'static str,
    pub title: String,
    pub notices: Vec<Notice>,
    pub context: C,
    #[serde(skip)]
    status: StatusCode,
}

impl<C: Serialize> Page<C> {
    pub fn new(template: &'static str, title: impl Into<String>, context: C) -> Self {
        Self {
            template,
            title: title.into(),
            notices: Vec::new(),
            context,
            status: StatusCode::OK,
        }
    }

    pub fn with_notices(mut self, notices: Vec<Notice>) -> Self {
        self.notices = notices;
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl<C: Serialize> IntoResponse for Page<C> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

// --- Page Contexts ---

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct HomeContext {
    pub authenticated: bool,
}

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardContext {
    pub principal: Principal,
}

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginContext {
    pub form: LoginFormView,
    /// Where the login form posts back to, including any `next` target.
    pub action: String,
}

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct DepartmentsContext {
    pub departments: Vec<Department>,
}

/// DepartmentFormContext
///
/// Shared by the add and edit views. `department` is set when editing.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct DepartmentFormContext {
    pub action: FormAction,
    pub add_department: bool,
    pub form: EntryFormView,
    pub department: Option<Department>,
}

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct MentorsContext {
    pub mentors: Vec<Mentor>,
}

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct MentorFormContext {
    pub action: FormAction,
    pub add_mentor: bool,
    pub form: EntryFormView,
    pub mentor: Option<Mentor>,
}

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct MenteesContext {
    pub mentees: Vec<Mentee>,
}

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct AssignContext {
    pub mentee: Mentee,
    pub form: AssignFormView,
}

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorContext {
    pub code: u16,
    /// "403 Error", "404 Error" or "500 Error".
    pub heading: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS, ToSchema)]
#[ts(export)]
pub enum FormAction {
    Add,
    Edit,
}
