//! SQLite-backed storage for todo rows.
//!
//! # Design
//! `SqliteStore` owns a single `rusqlite::Connection` and exposes one method
//! per remote procedure. Each operation is a single SQL statement (`update`
//! runs one transaction), so the storage engine provides all the atomicity
//! the service needs. `toggle` in particular flips the flag with
//! `SET completed = NOT completed ... RETURNING` rather than a read-then-write
//! in application code, so concurrent toggles cannot race into a lost update.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Deserializer, Serialize};

/// A persisted todo row.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for `createTodo`. The title must be non-empty after trimming.
#[derive(Debug, Deserialize)]
pub struct CreateTodoInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input for `updateTodo`. Absent fields are left unchanged; for
/// `description` the double `Option` keeps "field absent" (outer `None`)
/// distinguishable from "field present but null" (`Some(None)`), which
/// clears the stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateTodoInput {
    pub id: i64,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

/// Deserialize a present-but-possibly-null field as `Some(inner)`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug)]
pub enum StoreError {
    /// Required input failed validation; no statement was executed.
    InvalidInput(&'static str),

    /// No row matches the requested id.
    NotFound(i64),

    /// Underlying persistence failure.
    Sql(rusqlite::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NotFound(id) => write!(f, "Todo with id {id} not found"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

const TODO_COLUMNS: &str = "id, title, description, completed, created_at, updated_at";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS todos (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              title TEXT NOT NULL,
              description TEXT,
              completed INTEGER NOT NULL DEFAULT 0,
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Insert a new row with `completed = false` and both timestamps set to
    /// the same instant. Returns the persisted row.
    pub fn create(&self, input: CreateTodoInput) -> Result<Todo, StoreError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(StoreError::InvalidInput("title must not be empty"));
        }
        let now = Utc::now();
        let todo = self.conn.query_row(
            &format!(
                "INSERT INTO todos (title, description, completed, created_at, updated_at)
                 VALUES (?1, ?2, 0, ?3, ?3)
                 RETURNING {TODO_COLUMNS}"
            ),
            params![title, input.description, now],
            row_to_todo,
        )?;
        Ok(todo)
    }

    /// All rows, newest first. The id tiebreak keeps same-instant inserts in
    /// a stable newest-first order.
    pub fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], row_to_todo)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Apply the provided fields, recompute `updated_at`, and leave
    /// `created_at` untouched. Runs in one transaction.
    pub fn update(&mut self, input: UpdateTodoInput) -> Result<Todo, StoreError> {
        if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(StoreError::InvalidInput("title must not be empty"));
        }

        let tx = self.conn.transaction()?;
        let existing = tx
            .query_row(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
                params![input.id],
                row_to_todo,
            )
            .optional()?;
        let Some(existing) = existing else {
            return Err(StoreError::NotFound(input.id));
        };

        let title = match input.title {
            Some(title) => title.trim().to_string(),
            None => existing.title,
        };
        let description = match input.description {
            Some(description) => description,
            None => existing.description,
        };
        let completed = input.completed.unwrap_or(existing.completed);
        let updated_at = Utc::now();

        tx.execute(
            "UPDATE todos SET title = ?1, description = ?2, completed = ?3, updated_at = ?4
             WHERE id = ?5",
            params![title, description, completed, updated_at, input.id],
        )?;
        tx.commit()?;

        Ok(Todo {
            id: existing.id,
            title,
            description,
            completed,
            created_at: existing.created_at,
            updated_at,
        })
    }

    /// Flip `completed` in a single atomic statement and return the updated
    /// row.
    pub fn toggle(&self, id: i64) -> Result<Todo, StoreError> {
        let todo = self
            .conn
            .query_row(
                &format!(
                    "UPDATE todos SET completed = NOT completed, updated_at = ?1
                     WHERE id = ?2
                     RETURNING {TODO_COLUMNS}"
                ),
                params![Utc::now(), id],
                row_to_todo,
            )
            .optional()?;
        todo.ok_or(StoreError::NotFound(id))
    }

    /// Remove the row if present. Deleting a missing id is not an error; it
    /// is reported as `false`.
    pub fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}

fn row_to_todo(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn create(store: &SqliteStore, title: &str, description: Option<&str>) -> Todo {
        store
            .create(CreateTodoInput {
                title: title.to_string(),
                description: description.map(String::from),
            })
            .unwrap()
    }

    /// Utc::now() has sub-millisecond resolution; a short sleep guarantees
    /// the next timestamp is strictly larger.
    fn tick() {
        std::thread::sleep(Duration::from_millis(10));
    }

    #[test]
    fn create_defaults_to_not_completed_with_equal_timestamps() {
        let store = store();
        let todo = create(&store, "Buy milk", Some("Two liters"));
        assert!(todo.id > 0);
        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.description.as_deref(), Some("Two liters"));
        assert!(!todo.completed);
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[test]
    fn create_without_description_stores_null() {
        let store = store();
        let todo = create(&store, "Buy milk", None);
        assert!(todo.description.is_none());
    }

    #[test]
    fn create_trims_title() {
        let store = store();
        let todo = create(&store, "  Buy milk  ", None);
        assert_eq!(todo.title, "Buy milk");
    }

    #[test]
    fn create_rejects_empty_title() {
        let store = store();
        let err = store
            .create(CreateTodoInput {
                title: "   ".to_string(),
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_empty() {
        let store = store();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_orders_newest_first() {
        let store = store();
        let a = create(&store, "A", None);
        tick();
        let b = create(&store, "B", None);
        tick();
        let c = create(&store, "C", None);

        let ids: Vec<i64> = store.list().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[test]
    fn update_title_leaves_other_fields_unchanged() {
        let mut store = store();
        let original = create(&store, "Original", Some("Keep me"));
        tick();

        let updated = store
            .update(UpdateTodoInput {
                id: original.id,
                title: Some("Updated".to_string()),
                description: None,
                completed: None,
            })
            .unwrap();

        assert_eq!(updated.title, "Updated");
        assert_eq!(updated.description.as_deref(), Some("Keep me"));
        assert!(!updated.completed);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at > original.updated_at);
    }

    #[test]
    fn update_completed_only_preserves_text_fields() {
        let mut store = store();
        let original = create(&store, "Title", Some("Description"));

        let updated = store
            .update(UpdateTodoInput {
                id: original.id,
                title: None,
                description: None,
                completed: Some(true),
            })
            .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.title, "Title");
        assert_eq!(updated.description.as_deref(), Some("Description"));
    }

    #[test]
    fn update_with_explicit_null_clears_description() {
        let mut store = store();
        let original = create(&store, "Title", Some("To be cleared"));

        let updated = store
            .update(UpdateTodoInput {
                id: original.id,
                title: None,
                description: Some(None),
                completed: None,
            })
            .unwrap();

        assert!(updated.description.is_none());

        // The cleared value persists.
        let listed = &store.list().unwrap()[0];
        assert!(listed.description.is_none());
    }

    #[test]
    fn update_multiple_fields_at_once() {
        let mut store = store();
        let original = create(&store, "Original", Some("Original description"));

        let updated = store
            .update(UpdateTodoInput {
                id: original.id,
                title: Some("New title".to_string()),
                description: Some(Some("New description".to_string())),
                completed: Some(true),
            })
            .unwrap();

        assert_eq!(updated.title, "New title");
        assert_eq!(updated.description.as_deref(), Some("New description"));
        assert!(updated.completed);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let mut store = store();
        let err = store
            .update(UpdateTodoInput {
                id: 99999,
                title: Some("Nope".to_string()),
                description: None,
                completed: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(99999)));
        assert_eq!(err.to_string(), "Todo with id 99999 not found");
    }

    #[test]
    fn update_rejects_empty_title() {
        let mut store = store();
        let original = create(&store, "Title", None);
        let err = store
            .update(UpdateTodoInput {
                id: original.id,
                title: Some("  ".to_string()),
                description: None,
                completed: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn toggle_flips_flag_and_bumps_updated_at() {
        let store = store();
        let original = create(&store, "Toggle me", None);
        tick();

        let toggled = store.toggle(original.id).unwrap();
        assert!(toggled.completed);
        assert_eq!(toggled.created_at, original.created_at);
        assert!(toggled.updated_at > original.updated_at);
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let store = store();
        let original = create(&store, "Toggle me", None);
        tick();

        let once = store.toggle(original.id).unwrap();
        tick();
        let twice = store.toggle(original.id).unwrap();

        assert!(!twice.completed);
        assert!(twice.updated_at > once.updated_at);
    }

    #[test]
    fn toggle_missing_id_is_not_found() {
        let store = store();
        let err = store.toggle(99999).unwrap_err();
        assert_eq!(err.to_string(), "Todo with id 99999 not found");
    }

    #[test]
    fn delete_existing_row_removes_only_that_row() {
        let store = store();
        let keep = create(&store, "Keep", None);
        let doomed = create(&store, "Drop", None);

        assert!(store.delete(doomed.id).unwrap());

        let remaining = store.list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
    }

    #[test]
    fn delete_missing_id_reports_false_and_changes_nothing() {
        let store = store();
        create(&store, "Survivor", None);

        assert!(!store.delete(999999).unwrap());
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
