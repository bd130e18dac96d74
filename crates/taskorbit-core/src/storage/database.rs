//! SQLite-based storage for tasks, the user profile and finished intervals.
//!
//! Provides persistent storage for:
//! - Tasks created from phrases
//! - The single gamification profile (streak, badges, mood)
//! - Completed focus/break intervals and their statistics
//! - Key-value store for application state (the persisted session engine)

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::events::{CompletionKind, Event};
use crate::gamification::Profile;
use crate::mood::Mood;
use crate::task::{Category, Priority, Task};

/// Aggregated interval statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_focus_sessions: u64,
    pub total_focus_secs: u64,
    pub total_break_sessions: u64,
    pub total_break_secs: u64,
    pub today_focus_sessions: u64,
    pub today_focus_secs: u64,
}

/// SQLite database at `<data dir>/taskorbit.db`.
pub struct Database {
    conn: Connection,
}

fn format_kind(kind: CompletionKind) -> &'static str {
    match kind {
        CompletionKind::Focus => "focus",
        CompletionKind::Break => "break",
    }
}

fn parse_utc(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let due: Option<String> = row.get(2)?;
    let category: String = row.get(3)?;
    let priority: u8 = row.get(4)?;
    let created: String = row.get(6)?;
    let updated: String = row.get(7)?;
    let completed_at: Option<String> = row.get(8)?;

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        due_date: due
            .map(|s| DateTime::<FixedOffset>::parse_from_rfc3339(&s))
            .transpose()
            .map_err(|e| conversion_error(2, e.to_string()))?,
        // Unknown category names from older rows fall back to General.
        category: category.parse().unwrap_or(Category::General),
        priority: Priority::new(priority).map_err(|e| conversion_error(4, e.to_string()))?,
        completed: row.get(5)?,
        created_at: parse_utc(&created).ok_or_else(|| conversion_error(6, created.clone()))?,
        updated_at: parse_utc(&updated).ok_or_else(|| conversion_error(7, updated.clone()))?,
        completed_at: completed_at.as_deref().and_then(parse_utc),
    })
}

const TASK_COLUMNS: &str =
    "id, title, due_date, category, priority, completed, created_at, updated_at, completed_at";

impl Database {
    /// Open the database in the data directory, creating file and schema if needed.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the
    /// database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("taskorbit.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id           TEXT PRIMARY KEY,
                title        TEXT NOT NULL,
                due_date     TEXT,
                category     TEXT NOT NULL DEFAULT 'General',
                priority     INTEGER NOT NULL DEFAULT 3,
                completed    INTEGER NOT NULL DEFAULT 0,
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL,
                completed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS profile (
                id             INTEGER PRIMARY KEY CHECK (id = 1),
                streak_count   INTEGER NOT NULL DEFAULT 0,
                last_active_on TEXT,
                badges         TEXT NOT NULL DEFAULT '[]',
                mood           TEXT NOT NULL DEFAULT 'neutral'
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                kind          TEXT NOT NULL,
                duration_secs INTEGER NOT NULL,
                completed_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
            CREATE INDEX IF NOT EXISTS idx_sessions_completed_at_kind ON sessions(completed_at, kind);",
        )
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn insert_task(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            &format!("INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                task.id,
                task.title,
                task.due_date.map(|d| d.to_rfc3339()),
                task.category.as_str(),
                task.priority.value(),
                task.completed,
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
                task.completed_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    /// All tasks, newest first.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, rowid DESC"
        ))?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    /// # Errors
    /// Returns [`DatabaseError::NotFound`] if no task has `task.id`.
    pub fn update_task(&self, task: &Task) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET title = ?2, due_date = ?3, category = ?4, priority = ?5,
                              completed = ?6, updated_at = ?7, completed_at = ?8
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.due_date.map(|d| d.to_rfc3339()),
                task.category.as_str(),
                task.priority.value(),
                task.completed,
                task.updated_at.to_rfc3339(),
                task.completed_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                entity: "task",
                id: task.id.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Returns whether a row was removed.
    pub fn delete_task(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn count_completed_tasks(&self) -> Result<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE completed = 1",
            [],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    // ── Profile ──────────────────────────────────────────────────────

    /// The stored profile, or a fresh one if none was saved yet.
    pub fn load_profile(&self) -> Result<Profile> {
        let row = self
            .conn
            .query_row(
                "SELECT streak_count, last_active_on, badges, mood FROM profile WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((streak_count, last_active, badges, mood)) = row else {
            return Ok(Profile::default());
        };
        Ok(Profile {
            streak_count,
            last_active_on: last_active
                .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            badges: serde_json::from_str(&badges)?,
            mood: mood.parse().unwrap_or(Mood::Neutral),
        })
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO profile (id, streak_count, last_active_on, badges, mood)
             VALUES (1, ?1, ?2, ?3, ?4)",
            params![
                profile.streak_count,
                profile
                    .last_active_on
                    .map(|d| d.format("%Y-%m-%d").to_string()),
                serde_json::to_string(&profile.badges)?,
                profile.mood.as_str(),
            ],
        )?;
        Ok(())
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Record a finished focus or break interval.
    pub fn record_session(
        &self,
        kind: CompletionKind,
        duration_secs: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO sessions (kind, duration_secs, completed_at) VALUES (?1, ?2, ?3)",
            params![format_kind(kind), duration_secs, completed_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Record the interval closed by a completion event, using the length
    /// the event carries. Other events are ignored and return `None`.
    pub fn record_completion(
        &self,
        event: &Event,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        event
            .completed_interval()
            .map(|(kind, secs)| self.record_session(kind, secs, completed_at))
            .transpose()
    }

    /// All-time totals plus focus figures since `day_start`.
    pub fn session_stats(&self, day_start: DateTime<Utc>) -> Result<SessionStats> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, COUNT(*), COALESCE(SUM(duration_secs), 0),
                    COALESCE(SUM(CASE WHEN completed_at >= ?1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN completed_at >= ?1 THEN duration_secs ELSE 0 END), 0)
             FROM sessions
             GROUP BY kind",
        )?;
        let rows = stmt.query_map(params![day_start.to_rfc3339()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, u64>(4)?,
            ))
        })?;

        let mut stats = SessionStats::default();
        for row in rows {
            let (kind, count, secs, today_count, today_secs) = row?;
            match kind.as_str() {
                "focus" => {
                    stats.total_focus_sessions = count;
                    stats.total_focus_secs = secs;
                    stats.today_focus_sessions = today_count;
                    stats.today_focus_secs = today_secs;
                }
                "break" => {
                    stats.total_break_sessions = count;
                    stats.total_break_secs = secs;
                }
                _ => {}
            }
        }
        Ok(stats)
    }

    // ── Key-value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
