//! SQLite-backed key-value store for player progress.
//!
//! Progress lives in a single `kv` table under three keys, written as
//! decimal text so a missing or mangled value only resets that one
//! counter to its default.

use std::path::Path;

use indoc::indoc;
use rusqlite::{params, Connection};

use super::data_dir;
use super::progress::{Progress, ProgressStore, DEFAULT_LEVEL};
use crate::error::{DatabaseError, Result};

pub const KEY_LEVEL: &str = "level";
pub const KEY_CURRENT_EXPERIENCE: &str = "currentExperience";
pub const KEY_CHALLENGES_COMPLETED: &str = "challengesCompleted";

/// SQLite database holding the kv table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/moveit.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("moveit.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(indoc! {"
                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
            "})
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key. Missing keys are not an error.
    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Forget all stored progress.
    pub fn clear_progress(&self) -> Result<(), DatabaseError> {
        for key in [KEY_LEVEL, KEY_CURRENT_EXPERIENCE, KEY_CHALLENGES_COMPLETED] {
            self.kv_delete(key)?;
        }
        Ok(())
    }

    fn kv_parse<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, DatabaseError> {
        let parsed = self.kv_get(key)?.and_then(|raw| {
            let value = raw.trim().parse::<T>().ok();
            if value.is_none() {
                tracing::warn!(key, raw = %raw, "Ignoring unparsable stored value");
            }
            value
        });
        Ok(parsed.unwrap_or(default))
    }
}

impl ProgressStore for Database {
    fn load(&self) -> Result<Progress> {
        let level = self.kv_parse(KEY_LEVEL, DEFAULT_LEVEL)?.max(DEFAULT_LEVEL);
        Ok(Progress {
            level,
            current_experience: self.kv_parse(KEY_CURRENT_EXPERIENCE, 0)?,
            challenges_completed: self.kv_parse(KEY_CHALLENGES_COMPLETED, 0)?,
        })
    }

    fn save(&mut self, progress: &Progress) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)")?;
            stmt.execute(params![KEY_LEVEL, progress.level.to_string()])?;
            stmt.execute(params![
                KEY_CURRENT_EXPERIENCE,
                progress.current_experience.to_string()
            ])?;
            stmt.execute(params![
                KEY_CHALLENGES_COMPLETED,
                progress.challenges_completed.to_string()
            ])?;
        }
        tx.commit()?;
        Ok(())
    }
}
