//! Form payloads and their validation.
//!
//! Payloads deserialize every field as optional so an incomplete submission
//! reaches validation instead of being rejected by the extractor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::{Assignment, Department, EntryInput, Mentee, Mentor};

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Not a valid choice";

/// Field name -> messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Present and not blank after trimming.
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// --- Department / Mentor ---

/// EntryForm
///
/// Add/edit form shared by departments and mentors.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EntryForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl EntryForm {
    /// A form pre-populated from an existing record.
    pub fn prefilled(name: &str, description: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
        }
    }

    pub fn validate(&self) -> Result<EntryInput, FormErrors> {
        let mut errors = FormErrors::default();
        let name = required(&self.name);
        let description = required(&self.description);
        if name.is_none() {
            errors.add("name", REQUIRED);
        }
        if description.is_none() {
            errors.add("description", REQUIRED);
        }

        match (name, description) {
            (Some(name), Some(description)) => Ok(EntryInput {
                name: name.to_string(),
                description: description.to_string(),
            }),
            _ => Err(errors),
        }
    }

    pub fn view(&self, errors: FormErrors) -> EntryFormView {
        EntryFormView {
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            errors: errors.into_map(),
        }
    }
}

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct EntryFormView {
    pub name: String,
    pub description: String,
    pub errors: BTreeMap<String, Vec<String>>,
}

// --- Mentee assignment ---

/// AssignForm
///
/// Selected department and mentor ids, as submitted by the select fields.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AssignForm {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub mentor: Option<String>,
}

/// Parses a submitted id and accepts it only if it is one of the offered choices.
fn choose(raw: &Option<String>, choices: impl IntoIterator<Item = i64>) -> Option<i64> {
    let id = raw.as_deref()?.trim().parse::<i64>().ok()?;
    choices.into_iter().any(|choice| choice == id).then_some(id)
}

impl AssignForm {
    /// The form as shown for a mentee's current assignment.
    pub fn from_mentee(mentee: &Mentee) -> Self {
        Self {
            department: mentee.department_id.map(|id| id.to_string()),
            mentor: mentee.mentor_id.map(|id| id.to_string()),
        }
    }

    /// Validates against the choice sets loaded for this request.
    pub fn validate(
        &self,
        departments: &[Department],
        mentors: &[Mentor],
    ) -> Result<Assignment, FormErrors> {
        let mut errors = FormErrors::default();
        let department = choose(&self.department, departments.iter().map(|d| d.id));
        let mentor = choose(&self.mentor, mentors.iter().map(|m| m.id));
        if department.is_none() {
            errors.add("department", INVALID_CHOICE);
        }
        if mentor.is_none() {
            errors.add("mentor", INVALID_CHOICE);
        }

        match (department, mentor) {
            (Some(department_id), Some(mentor_id)) => Ok(Assignment {
                department_id,
                mentor_id,
            }),
            _ => Err(errors),
        }
    }

    pub fn view(
        &self,
        departments: &[Department],
        mentors: &[Mentor],
        errors: FormErrors,
    ) -> AssignFormView {
        AssignFormView {
            department: self.department.as_deref().and_then(|v| v.parse().ok()),
            mentor: self.mentor.as_deref().and_then(|v| v.parse().ok()),
            department_choices: departments
                .iter()
                .map(|d| Choice { id: d.id, label: d.name.clone() })
                .collect(),
            mentor_choices: mentors
                .iter()
                .map(|m| Choice { id: m.id, label: m.name.clone() })
                .collect(),
            errors: errors.into_map(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct Choice {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct AssignFormView {
    pub department: Option<i64>,
    pub mentor: Option<i64>,
    pub department_choices: Vec<Choice>,
    pub mentor_choices: Vec<Choice>,
    pub errors: BTreeMap<String, Vec<String>>,
}

// --- Login ---

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Validated login credentials.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginInput, FormErrors> {
        let mut errors = FormErrors::default();
        let username = required(&self.username);
        let password = required(&self.password);
        if username.is_none() {
            errors.add("username", REQUIRED);
        }
        if password.is_none() {
            errors.add("password", REQUIRED);
        }

        match (username, password) {
            (Some(username), Some(password)) => Ok(LoginInput {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Err(errors),
        }
    }

    /// The password is never echoed back.
    pub fn view(&self, errors: FormErrors) -> LoginFormView {
        LoginFormView {
            username: self.username.clone().unwrap_or_default(),
            errors: errors.into_map(),
        }
    }
}

#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginFormView {
    pub username: String,
    pub errors: BTreeMap<String, Vec<String>>,
}
