//! SQLite-based session storage and key-value state.
//!
//! Provides persistent storage for:
//! - Sealed focus sessions
//! - Serialized usage statistics
//! - Key-value store for coordinator state (engine snapshots)

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::error::StorageError;
use crate::stats::UsageStats;
use crate::timer::{FocusSession, SessionMode};

use super::data_dir;

/// kv key under which the coordinator persists the engine snapshot.
pub const KV_ENGINE_SNAPSHOT: &str = "engine_snapshot";
/// kv key under which usage statistics are persisted.
pub const KV_USAGE_STATS: &str = "usage_stats";
/// kv key for the emergency-unlock cooldown clock.
pub const KV_UNLOCK_STATE: &str = "unlock_state";
/// kv key for daily feature-usage counters.
pub const KV_FEATURE_USAGE: &str = "feature_usage";

/// SQLite database for session history and coordinator state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/focusgate/focusgate.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?
            .join("focusgate.db");
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path,
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: std::path::PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path,
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database, for tests and ephemeral sessions.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sessions (
                    id              TEXT PRIMARY KEY,
                    mode            TEXT NOT NULL,
                    started_at      TEXT NOT NULL,
                    ended_at        TEXT NOT NULL,
                    actual_minutes  INTEGER NOT NULL,
                    completed       INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    /// Append a sealed session to history.
    pub fn record_session(&self, session: &FocusSession) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sessions
                (id, mode, started_at, ended_at, actual_minutes, completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id.to_string(),
                session.mode.as_str(),
                session.started_at.to_rfc3339(),
                session.ended_at.to_rfc3339(),
                session.actual_minutes,
                session.completed,
            ],
        )?;
        Ok(())
    }

    /// Most recent sessions, newest first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<FocusSession>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, mode, started_at, ended_at, actual_minutes, completed
             FROM sessions ORDER BY ended_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let id: String = row.get(0)?;
            let mode: String = row.get(1)?;
            let started_at: String = row.get(2)?;
            let ended_at: String = row.get(3)?;
            Ok(FocusSession {
                id: Uuid::parse_str(&id).unwrap_or_default(),
                mode: SessionMode::from_str(&mode),
                started_at: parse_rfc3339(&started_at),
                ended_at: parse_rfc3339(&ended_at),
                actual_minutes: row.get(4)?,
                completed: row.get(5)?,
            })
        })?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Load persisted usage statistics, or empty stats when absent or
    /// unreadable (corrupt state must not take the coordinator down).
    pub fn load_stats(&self) -> UsageStats {
        match self.kv_get(KV_USAGE_STATS) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored usage stats are corrupt, starting fresh");
                UsageStats::new()
            }),
            _ => UsageStats::new(),
        }
    }

    pub fn save_stats(&self, stats: &UsageStats) -> Result<(), StorageError> {
        let json = serde_json::to_string(stats)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.kv_set(KV_USAGE_STATS, &json)
    }
}

fn parse_rfc3339(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
