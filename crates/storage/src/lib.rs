use liftvox_workout::{CompletedSession, SessionRepository, Workout, WorkoutRepository};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_by TEXT NOT NULL,
                name TEXT NOT NULL,
                definition_json TEXT NOT NULL,
                UNIQUE (created_by, name)
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                workout_name TEXT NOT NULL,
                user TEXT NOT NULL,
                started_at INTEGER NOT NULL,
                duration_ms INTEGER NOT NULL,
                session_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_user_started ON sessions(user, started_at DESC);
            CREATE INDEX IF NOT EXISTS idx_sessions_workout ON sessions(user, workout_name, started_at DESC);
            "#,
        )?;
        Ok(())
    }

    /// Workout `name` owned by `user`.
    pub fn workout(&self, user: &str, name: &str) -> Result<Workout> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let json: String = conn
            .query_row(
                "SELECT definition_json FROM workouts WHERE created_by = ?1 AND name = ?2",
                [user, name],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StorageError::NotFound(format!("workout '{name}' for {user}"))
                }
                other => StorageError::DatabaseError(other),
            })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn session(&self, id: &Uuid) -> Result<CompletedSession> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let json: String = conn
            .query_row(
                "SELECT session_json FROM sessions WHERE id = ?1",
                [id.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StorageError::NotFound(format!("session {id}"))
                }
                other => StorageError::DatabaseError(other),
            })?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Decodes JSON rows, skipping any that no longer parse.
fn decode_rows<T: serde::de::DeserializeOwned>(
    rows: impl Iterator<Item = rusqlite::Result<String>>,
    kind: &str,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    for row in rows {
        let json = row?;
        match serde_json::from_str(&json) {
            Ok(item) => items.push(item),
            Err(e) => tracing::warn!(kind, error = %e, "Skipping unreadable row"),
        }
    }
    Ok(items)
}

impl SessionRepository for Database {
    type Error = StorageError;

    fn save_completed_session(&self, session: &CompletedSession) -> Result<()> {
        let json = serde_json::to_string(session)?;
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO sessions (id, workout_name, user, started_at, duration_ms, session_json) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                session.id.to_string(),
                &session.workout_name,
                &session.user,
                session.started_at.timestamp_millis(),
                session.duration_ms as i64,
                json,
            ),
        )?;
        tracing::debug!(session_id = %session.id, workout = %session.workout_name, "Session saved");
        Ok(())
    }

    fn last_session_for(&self, workout_name: &str, user: &str) -> Result<Option<CompletedSession>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let json: Option<String> = conn
            .query_row(
                "SELECT session_json FROM sessions WHERE user = ?1 AND workout_name = ?2 ORDER BY started_at DESC LIMIT 1",
                [user, workout_name],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn sessions_for(&self, user: &str) -> Result<Vec<CompletedSession>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT session_json FROM sessions WHERE user = ?1 ORDER BY started_at DESC",
        )?;
        let rows = stmt.query_map([user], |row| row.get::<_, String>(0))?;
        decode_rows(rows, "session")
    }
}

impl WorkoutRepository for Database {
    type Error = StorageError;

    fn save_workout(&self, workout: &Workout) -> Result<()> {
        let json = serde_json::to_string(workout)?;
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT INTO workouts (created_by, name, definition_json) VALUES (?1, ?2, ?3)
             ON CONFLICT (created_by, name) DO UPDATE SET definition_json = excluded.definition_json",
            (&workout.created_by, &workout.name, json),
        )?;
        Ok(())
    }

    fn workouts_for(&self, user: &str) -> Result<Vec<Workout>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt =
            conn.prepare("SELECT definition_json FROM workouts WHERE created_by = ?1 ORDER BY id")?;
        let rows = stmt.query_map([user], |row| row.get::<_, String>(0))?;
        decode_rows(rows, "workout")
    }
}
