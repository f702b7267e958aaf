use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Department
///
/// A record of the `departments` table. `name` is unique across departments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Mentor
///
/// A record of the `mentors` table. Same shape and uniqueness rule as `Department`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Mentor {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Mentee
///
/// A record of the `mentees` table, joined with the names of the assigned
/// department and mentor. The password hash lives in `MenteeCredentials` and is
/// never part of this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Mentee {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub department_id: Option<i64>,
    pub mentor_id: Option<i64>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,

    // Loaded through LEFT JOINs in the repository queries.
    #[sqlx(default)]
    pub department_name: Option<String>,
    #[sqlx(default)]
    pub mentor_name: Option<String>,
}

/// MenteeCredentials
///
/// Internal row used only by the login flow.
#[derive(Debug, Clone, FromRow)]
pub struct MenteeCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

// --- Store Inputs ---

/// EntryInput
///
/// Validated field set for creating or updating a department or mentor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInput {
    pub name: String,
    pub description: String,
}

/// NewMentee
///
/// Input for seeding a mentee account. Only the startup bootstrap and tests
/// create mentees; regular registration happens outside this service.
#[derive(Debug, Clone)]
pub struct NewMentee {
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Assignment
///
/// The department and mentor selected on the assignment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub department_id: i64,
    pub mentor_id: i64,
}
