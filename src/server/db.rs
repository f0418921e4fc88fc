//! SQLite storage for the task API.
//!
//! Two tables: `users` (unique e-mail, bcrypt password hash) and `tasks`
//! (owned rows with RFC 3339 timestamps). Row ids are UUID v4 strings.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// A task row, serialized with camelCase timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub user_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// SQLite database for users and tasks.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database at the given path, creating the schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Opens an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id            TEXT PRIMARY KEY,
                name          TEXT NOT NULL,
                email         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                user_id    TEXT NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_user_id ON tasks(user_id);",
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// Inserts a new user and returns it.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including a duplicate e-mail).
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, rusqlite::Error> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO users (id, name, email, password_hash) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, email, password_hash],
        )?;
        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    /// Looks up a user by e-mail.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, name, email, password_hash FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        password_hash: row.get(3)?,
                    })
                },
            )
            .optional()
    }

    /// Looks up a user by id.
    pub fn find_user_by_id(&self, id: &str) -> Result<Option<User>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, name, email, password_hash FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        password_hash: row.get(3)?,
                    })
                },
            )
            .optional()
    }

    // ------------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------------

    /// Inserts a new task for a user and returns it.
    pub fn create_task(&self, user_id: &str, name: &str) -> Result<Task, rusqlite::Error> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO tasks (id, name, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                task.id,
                task.name,
                task.user_id,
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(task)
    }

    /// Lists a user's tasks, newest first.
    pub fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, user_id, created_at, updated_at
             FROM tasks WHERE user_id = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], Self::row_to_task)?;
        rows.collect()
    }

    /// Looks up a single task by id, regardless of owner.
    pub fn find_task(&self, id: &str) -> Result<Option<Task>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, name, user_id, created_at, updated_at FROM tasks WHERE id = ?1",
                params![id],
                Self::row_to_task,
            )
            .optional()
    }

    /// Renames a task and bumps its `updated_at`.
    pub fn update_task(&self, id: &str, name: &str) -> Result<Option<Task>, rusqlite::Error> {
        let now = Utc::now();
        self.conn.execute(
            "UPDATE tasks SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![name, now.to_rfc3339(), id],
        )?;
        self.find_task(id)
    }

    /// Deletes a task.
    pub fn delete_task(&self, id: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn row_to_task(row: &rusqlite::Row<'_>) -> Result<Task, rusqlite::Error> {
        let created_at: String = row.get(3)?;
        let updated_at: String = row.get(4)?;
        Ok(Task {
            id: row.get(0)?,
            name: row.get(1)?,
            user_id: row.get(2)?,
            created_at: parse_timestamp(&created_at, 3)?,
            updated_at: parse_timestamp(&updated_at, 4)?,
        })
    }
}

fn parse_timestamp(raw: &str, column: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
