use crate::models::{
    Assignment, Department, EntryInput, Mentee, MenteeCredentials, Mentor, NewMentee,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgPool, postgres::PgRow};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// RepositoryError
///
/// Failures surfaced by the persistence layer. `Conflict` is the only variant the
/// controllers treat as recoverable; everything else maps to a 500.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (duplicate name or username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A foreign key points at a row that no longer exists.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// The store cannot serve requests (poisoned in-memory lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Repository Trait
///
/// The contract of the Entity Store. Every mutating method is a single logical
/// change committed atomically; nothing is held open across calls.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across
/// Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Departments ---
    async fn list_departments(&self) -> Result<Vec<Department>, RepositoryError>;
    async fn get_department(&self, id: i64) -> Result<Option<Department>, RepositoryError>;
    async fn create_department(&self, input: EntryInput) -> Result<Department, RepositoryError>;
    // Returns `None` when no row has the given id.
    async fn update_department(
        &self,
        id: i64,
        input: EntryInput,
    ) -> Result<Option<Department>, RepositoryError>;
    // Returns true if a row was removed. Mentee references are nullified.
    async fn delete_department(&self, id: i64) -> Result<bool, RepositoryError>;

    // --- Mentors ---
    async fn list_mentors(&self) -> Result<Vec<Mentor>, RepositoryError>;
    async fn get_mentor(&self, id: i64) -> Result<Option<Mentor>, RepositoryError>;
    async fn create_mentor(&self, input: EntryInput) -> Result<Mentor, RepositoryError>;
    async fn update_mentor(
        &self,
        id: i64,
        input: EntryInput,
    ) -> Result<Option<Mentor>, RepositoryError>;
    async fn delete_mentor(&self, id: i64) -> Result<bool, RepositoryError>;

    // --- Mentees ---
    async fn list_mentees(&self) -> Result<Vec<Mentee>, RepositoryError>;
    async fn get_mentee(&self, id: i64) -> Result<Option<Mentee>, RepositoryError>;
    async fn assign_mentee(
        &self,
        id: i64,
        assignment: Assignment,
    ) -> Result<Option<Mentee>, RepositoryError>;
    async fn create_mentee(&self, mentee: NewMentee) -> Result<Mentee, RepositoryError>;
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<MenteeCredentials>, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- PostgreSQL Implementation ---

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. Each mutation opens its own transaction and
/// commits before returning; an early return drops the transaction, which rolls
/// it back.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const MENTEE_SELECT: &str = r#"
    SELECT
        m.id, m.username, m.is_admin, m.department_id, m.mentor_id, m.created_at,
        d.name AS department_name, t.name AS mentor_name
    FROM mentees m
    LEFT JOIN departments d ON d.id = m.department_id
    LEFT JOIN mentors t ON t.id = m.mentor_id
"#;

/// Translates unique and foreign-key violations into typed repository errors.
fn map_write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::InvalidReference(format!("{what} references a missing row"));
    }
    RepositoryError::Database(e)
}

// Departments and mentors share one table shape, so the SQL is written once and
// parameterized by a static table name.

async fn list_entries<T>(pool: &PgPool, table: &'static str) -> Result<Vec<T>, RepositoryError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!("SELECT id, name, description, created_at FROM {table} ORDER BY id");
    Ok(sqlx::query_as::<_, T>(&sql).fetch_all(pool).await?)
}

async fn get_entry<T>(pool: &PgPool, table: &'static str, id: i64) -> Result<Option<T>, RepositoryError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!("SELECT id, name, description, created_at FROM {table} WHERE id = $1");
    Ok(sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(pool).await?)
}

async fn insert_entry<T>(
    pool: &PgPool,
    table: &'static str,
    input: EntryInput,
) -> Result<T, RepositoryError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!(
        "INSERT INTO {table} (name, description) VALUES ($1, $2) \
         RETURNING id, name, description, created_at"
    );
    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, T>(&sql)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, &input.name))?;
    tx.commit().await?;
    Ok(row)
}

async fn update_entry<T>(
    pool: &PgPool,
    table: &'static str,
    id: i64,
    input: EntryInput,
) -> Result<Option<T>, RepositoryError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!(
        "UPDATE {table} SET name = $2, description = $3 WHERE id = $1 \
         RETURNING id, name, description, created_at"
    );
    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, &input.name))?;
    tx.commit().await?;
    Ok(row)
}

async fn delete_entry(pool: &PgPool, table: &'static str, id: i64) -> Result<bool, RepositoryError> {
    // The mentees foreign keys are declared ON DELETE SET NULL.
    let sql = format!("DELETE FROM {table} WHERE id = $1");
    let mut tx = pool.begin().await?;
    let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_departments(&self) -> Result<Vec<Department>, RepositoryError> {
        list_entries(&self.pool, "departments").await
    }

    async fn get_department(&self, id: i64) -> Result<Option<Department>, RepositoryError> {
        get_entry(&self.pool, "departments", id).await
    }

    async fn create_department(&self, input: EntryInput) -> Result<Department, RepositoryError> {
        insert_entry(&self.pool, "departments", input).await
    }

    async fn update_department(
        &self,
        id: i64,
        input: EntryInput,
    ) -> Result<Option<Department>, RepositoryError> {
        update_entry(&self.pool, "departments", id, input).await
    }

    async fn delete_department(&self, id: i64) -> Result<bool, RepositoryError> {
        delete_entry(&self.pool, "departments", id).await
    }

    async fn list_mentors(&self) -> Result<Vec<Mentor>, RepositoryError> {
        list_entries(&self.pool, "mentors").await
    }

    async fn get_mentor(&self, id: i64) -> Result<Option<Mentor>, RepositoryError> {
        get_entry(&self.pool, "mentors", id).await
    }

    async fn create_mentor(&self, input: EntryInput) -> Result<Mentor, RepositoryError> {
        insert_entry(&self.pool, "mentors", input).await
    }

    async fn update_mentor(
        &self,
        id: i64,
        input: EntryInput,
    ) -> Result<Option<Mentor>, RepositoryError> {
        update_entry(&self.pool, "mentors", id, input).await
    }

    async fn delete_mentor(&self, id: i64) -> Result<bool, RepositoryError> {
        delete_entry(&self.pool, "mentors", id).await
    }

    async fn list_mentees(&self) -> Result<Vec<Mentee>, RepositoryError> {
        let sql = format!("{MENTEE_SELECT} ORDER BY m.id");
        Ok(sqlx::query_as::<_, Mentee>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_mentee(&self, id: i64) -> Result<Option<Mentee>, RepositoryError> {
        let sql = format!("{MENTEE_SELECT} WHERE m.id = $1");
        Ok(sqlx::query_as::<_, Mentee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// assign_mentee
    ///
    /// Sets both references and re-reads the joined row inside the same
    /// transaction, so the returned names match what was committed.
    async fn assign_mentee(
        &self,
        id: i64,
        assignment: Assignment,
    ) -> Result<Option<Mentee>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query("UPDATE mentees SET department_id = $2, mentor_id = $3 WHERE id = $1")
            .bind(id)
            .bind(assignment.department_id)
            .bind(assignment.mentor_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &format!("mentee {id}")))?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let sql = format!("{MENTEE_SELECT} WHERE m.id = $1");
        let mentee = sqlx::query_as::<_, Mentee>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(mentee))
    }

    async fn create_mentee(&self, mentee: NewMentee) -> Result<Mentee, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO mentees (username, password_hash, is_admin) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&mentee.username)
        .bind(&mentee.password_hash)
        .bind(mentee.is_admin)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, &mentee.username))?;

        let sql = format!("{MENTEE_SELECT} WHERE m.id = $1");
        let created = sqlx::query_as::<_, Mentee>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<MenteeCredentials>, RepositoryError> {
        Ok(sqlx::query_as::<_, MenteeCredentials>(
            "SELECT id, username, password_hash FROM mentees WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }
}

// --- In-Memory Implementation ---

/// MemoryRepository
///
/// `Repository` kept in process memory. Used when no `DATABASE_URL` is configured
/// in local development and as the store behind the integration tests. It applies
/// the same rules as the schema: unique names and usernames, ids assigned in
/// insertion order, and nullified mentee references on delete.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<MemoryTables>,
}

#[derive(Default)]
struct MemoryTables {
    departments: Vec<Department>,
    mentors: Vec<Mentor>,
    mentees: Vec<StoredMentee>,
    last_department_id: i64,
    last_mentor_id: i64,
    last_mentee_id: i64,
}

struct StoredMentee {
    mentee: Mentee,
    password_hash: String,
}

/// Row behaviour shared by departments and mentors in the in-memory tables.
trait CatalogRow: Clone {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn build(id: i64, input: EntryInput) -> Self;
    fn apply(&mut self, input: EntryInput);
}

impl CatalogRow for Department {
    fn id(&self) -> i64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn build(id: i64, input: EntryInput) -> Self {
        Department { id, name: input.name, description: input.description, created_at: Utc::now() }
    }
    fn apply(&mut self, input: EntryInput) {
        self.name = input.name;
        self.description = input.description;
    }
}

impl CatalogRow for Mentor {
    fn id(&self) -> i64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn build(id: i64, input: EntryInput) -> Self {
        Mentor { id, name: input.name, description: input.description, created_at: Utc::now() }
    }
    fn apply(&mut self, input: EntryInput) {
        self.name = input.name;
        self.description = input.description;
    }
}

fn insert_row<T: CatalogRow>(
    rows: &mut Vec<T>,
    last_id: &mut i64,
    input: EntryInput,
) -> Result<T, RepositoryError> {
    if rows.iter().any(|row| row.name() == input.name) {
        return Err(RepositoryError::Conflict(format!("{} already exists", input.name)));
    }
    *last_id += 1;
    let row = T::build(*last_id, input);
    rows.push(row.clone());
    Ok(row)
}

fn update_row<T: CatalogRow>(
    rows: &mut [T],
    id: i64,
    input: EntryInput,
) -> Result<Option<T>, RepositoryError> {
    if rows.iter().any(|row| row.id() != id && row.name() == input.name) {
        return Err(RepositoryError::Conflict(format!("{} already exists", input.name)));
    }
    Ok(rows.iter_mut().find(|row| row.id() == id).map(|row| {
        row.apply(input);
        row.clone()
    }))
}

fn remove_row<T: CatalogRow>(rows: &mut Vec<T>, id: i64) -> bool {
    let before = rows.len();
    rows.retain(|row| row.id() != id);
    rows.len() != before
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, MemoryTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))
    }
}

impl MemoryTables {
    /// Resolves the joined department and mentor names, as the SQL LEFT JOINs do.
    fn joined(&self, stored: &StoredMentee) -> Mentee {
        let mut mentee = stored.mentee.clone();
        mentee.department_name = mentee
            .department_id
            .and_then(|id| self.departments.iter().find(|d| d.id == id))
            .map(|d| d.name.clone());
        mentee.mentor_name = mentee
            .mentor_id
            .and_then(|id| self.mentors.iter().find(|m| m.id == id))
            .map(|m| m.name.clone());
        mentee
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_departments(&self) -> Result<Vec<Department>, RepositoryError> {
        Ok(self.tables()?.departments.clone())
    }

    async fn get_department(&self, id: i64) -> Result<Option<Department>, RepositoryError> {
        Ok(self.tables()?.departments.iter().find(|d| d.id == id).cloned())
    }

    async fn create_department(&self, input: EntryInput) -> Result<Department, RepositoryError> {
        let mut tables = self.tables()?;
        let tables = &mut *tables;
        insert_row(&mut tables.departments, &mut tables.last_department_id, input)
    }

    async fn update_department(
        &self,
        id: i64,
        input: EntryInput,
    ) -> Result<Option<Department>, RepositoryError> {
        update_row(&mut self.tables()?.departments, id, input)
    }

    async fn delete_department(&self, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let removed = remove_row(&mut tables.departments, id);
        for stored in tables.mentees.iter_mut() {
            if stored.mentee.department_id == Some(id) {
                stored.mentee.department_id = None;
            }
        }
        Ok(removed)
    }

    async fn list_mentors(&self) -> Result<Vec<Mentor>, RepositoryError> {
        Ok(self.tables()?.mentors.clone())
    }

    async fn get_mentor(&self, id: i64) -> Result<Option<Mentor>, RepositoryError> {
        Ok(self.tables()?.mentors.iter().find(|m| m.id == id).cloned())
    }

    async fn create_mentor(&self, input: EntryInput) -> Result<Mentor, RepositoryError> {
        let mut tables = self.tables()?;
        let tables = &mut *tables;
        insert_row(&mut tables.mentors, &mut tables.last_mentor_id, input)
    }

    async fn update_mentor(
        &self,
        id: i64,
        input: EntryInput,
    ) -> Result<Option<Mentor>, RepositoryError> {
        update_row(&mut self.tables()?.mentors, id, input)
    }

    async fn delete_mentor(&self, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let removed = remove_row(&mut tables.mentors, id);
        for stored in tables.mentees.iter_mut() {
            if stored.mentee.mentor_id == Some(id) {
                stored.mentee.mentor_id = None;
            }
        }
        Ok(removed)
    }

    async fn list_mentees(&self) -> Result<Vec<Mentee>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.mentees.iter().map(|stored| tables.joined(stored)).collect())
    }

    async fn get_mentee(&self, id: i64) -> Result<Option<Mentee>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .mentees
            .iter()
            .find(|stored| stored.mentee.id == id)
            .map(|stored| tables.joined(stored)))
    }

    async fn assign_mentee(
        &self,
        id: i64,
        assignment: Assignment,
    ) -> Result<Option<Mentee>, RepositoryError> {
        let mut tables = self.tables()?;
        // Mirrors the foreign keys: both targets must exist.
        let department_exists = tables.departments.iter().any(|d| d.id == assignment.department_id);
        let mentor_exists = tables.mentors.iter().any(|m| m.id == assignment.mentor_id);
        if !department_exists || !mentor_exists {
            return Err(RepositoryError::InvalidReference(format!(
                "mentee {id} references a missing row"
            )));
        }

        let Some(index) = tables.mentees.iter().position(|stored| stored.mentee.id == id) else {
            return Ok(None);
        };
        let stored = &mut tables.mentees[index];
        stored.mentee.department_id = Some(assignment.department_id);
        stored.mentee.mentor_id = Some(assignment.mentor_id);
        Ok(Some(tables.joined(&tables.mentees[index])))
    }

    async fn create_mentee(&self, mentee: NewMentee) -> Result<Mentee, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.mentees.iter().any(|stored| stored.mentee.username == mentee.username) {
            return Err(RepositoryError::Conflict(format!(
                "{} already exists",
                mentee.username
            )));
        }
        tables.last_mentee_id += 1;
        let created = Mentee {
            id: tables.last_mentee_id,
            username: mentee.username,
            is_admin: mentee.is_admin,
            department_id: None,
            mentor_id: None,
            created_at: Utc::now(),
            department_name: None,
            mentor_name: None,
        };
        tables.mentees.push(StoredMentee {
            mentee: created.clone(),
            password_hash: mentee.password_hash,
        });
        Ok(created)
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<MenteeCredentials>, RepositoryError> {
        Ok(self
            .tables()?
            .mentees
            .iter()
            .find(|stored| stored.mentee.username == username)
            .map(|stored| MenteeCredentials {
                id: stored.mentee.id,
                username: stored.mentee.username.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }
}
