//! SQLite storage for finished workouts and the user profile.
//!
//! - `workouts`: one row per [`WorkoutRecord`], repetition details as JSON
//! - `kv`: small keyed blobs (the user profile lives under `user_profile`)

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::exercise::{ExerciseType, RepetitionEvent};
use crate::session::{WorkoutHistory, WorkoutRecord};

const PROFILE_KEY: &str = "user_profile";

/// Body measurements used for calorie estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            weight_kg: 70.0,
            height_cm: 175.0,
        }
    }
}

/// SQLite database for workout history.
pub struct Database {
    conn: Connection,
}

/// Raw columns of a `workouts` row, decoded outside the rusqlite closure.
struct WorkoutRow {
    id: String,
    exercise: String,
    ended_at: String,
    total_reps: u32,
    total_secs: u64,
    total_calories: f64,
    rep_details: String,
}

impl WorkoutRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            exercise: row.get(1)?,
            ended_at: row.get(2)?,
            total_reps: row.get(3)?,
            total_secs: row.get(4)?,
            total_calories: row.get(5)?,
            rep_details: row.get(6)?,
        })
    }

    fn decode(self) -> Result<WorkoutRecord> {
        let corrupt = |message: String| DatabaseError::CorruptRecord {
            id: self.id.clone(),
            message,
        };
        let exercise: ExerciseType = self.exercise.parse().map_err(corrupt)?;
        let ended_at = DateTime::parse_from_rfc3339(&self.ended_at)
            .map_err(|e| corrupt(e.to_string()))?
            .with_timezone(&Utc);
        let rep_details: Vec<RepetitionEvent> =
            serde_json::from_str(&self.rep_details).map_err(|e| corrupt(e.to_string()))?;
        Ok(WorkoutRecord {
            id: self.id,
            exercise,
            ended_at,
            total_reps: self.total_reps,
            total_secs: self.total_secs,
            total_calories: self.total_calories,
            rep_details,
        })
    }
}

const SELECT_WORKOUT: &str = "SELECT id, exercise, ended_at, total_reps, total_secs, total_calories, rep_details
     FROM workouts";

impl Database {
    /// Open the database at `~/.config/formcoach/formcoach.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("formcoach.db"))
    }

    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS workouts (
                id             TEXT PRIMARY KEY,
                exercise       TEXT NOT NULL,
                ended_at       TEXT NOT NULL,
                total_reps     INTEGER NOT NULL,
                total_secs     INTEGER NOT NULL,
                total_calories REAL NOT NULL,
                rep_details    TEXT NOT NULL DEFAULT '[]'
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_workouts_exercise ON workouts(exercise);",
        )?;
        Ok(())
    }

    /// Store a finished workout.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including a duplicate id).
    pub fn add_record(&self, record: &WorkoutRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO workouts (id, exercise, ended_at, total_reps, total_secs, total_calories, rep_details)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.exercise.as_str(),
                record.ended_at.to_rfc3339(),
                record.total_reps,
                record.total_secs,
                record.total_calories,
                serde_json::to_string(&record.rep_details)?,
            ],
        )?;
        Ok(())
    }

    /// Newest first.
    pub fn list_records(&self, limit: usize) -> Result<Vec<WorkoutRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_WORKOUT} ORDER BY rowid DESC LIMIT ?1"))?;
        let rows = stmt
            .query_map(params![limit as i64], WorkoutRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(WorkoutRow::decode).collect()
    }

    pub fn get_record(&self, id: &str) -> Result<Option<WorkoutRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("{SELECT_WORKOUT} WHERE id = ?1"),
                params![id],
                WorkoutRow::from_row,
            )
            .optional()?;
        row.map(WorkoutRow::decode).transpose()
    }

    /// Delete every stored workout; returns how many were removed.
    pub fn clear_history(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM workouts", [])?)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Stored profile, or the defaults when missing or unreadable.
    pub fn profile(&self) -> Result<UserProfile> {
        let Some(raw) = self.kv_get(PROFILE_KEY)? else {
            return Ok(UserProfile::default());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable user profile: {e}");
            UserProfile::default()
        }))
    }

    pub fn set_profile(&self, profile: &UserProfile) -> Result<()> {
        self.kv_set(PROFILE_KEY, &serde_json::to_string(profile)?)
    }
}

impl WorkoutHistory for Database {
    fn add_record(&mut self, record: &WorkoutRecord) -> Result<()> {
        Database::add_record(self, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, reps: u32) -> WorkoutRecord {
        WorkoutRecord {
            id: id.to_string(),
            exercise: ExerciseType::Lunge,
            ended_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            total_reps: reps,
            total_secs: 65,
            total_calories: 5.7,
            rep_details: (0..reps)
                .map(|i| RepetitionEvent {
                    timestamp_ms: 1_000 * u64::from(i),
                    range_of_motion: 95.5,
                    tempo: if i == 0 { 0.0 } else { 1.0 },
                })
                .collect(),
        }
    }

    #[test]
    fn records_list_newest_first() {
        let db = Database::open_memory().unwrap();
        db.add_record(&record("a", 1)).unwrap();
        db.add_record(&record("b", 2)).unwrap();
        db.add_record(&record("c", 3)).unwrap();

        let ids: Vec<_> = db.list_records(2).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["c", "b"]);
    }

    #[test]
    fn record_round_trips_with_details() {
        let db = Database::open_memory().unwrap();
        let original = record("x", 3);
        db.add_record(&original).unwrap();
        assert_eq!(db.get_record("x").unwrap(), Some(original));
        assert_eq!(db.get_record("missing").unwrap(), None);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let db = Database::open_memory().unwrap();
        db.add_record(&record("x", 1)).unwrap();
        assert!(db.add_record(&record("x", 1)).is_err());
    }

    #[test]
    fn clear_history_reports_count() {
        let db = Database::open_memory().unwrap();
        db.add_record(&record("a", 1)).unwrap();
        db.add_record(&record("b", 1)).unwrap();
        assert_eq!(db.clear_history().unwrap(), 2);
        assert!(db.list_records(10).unwrap().is_empty());
    }

    #[test]
    fn corrupt_row_is_reported() {
        let db = Database::open_memory().unwrap();
        db.add_record(&record("a", 1)).unwrap();
        db.conn
            .execute("UPDATE workouts SET exercise = 'burpee' WHERE id = 'a'", [])
            .unwrap();
        let err = db.get_record("a").unwrap_err();
        assert!(err.to_string().contains("Corrupt record 'a'"));
    }

    #[test]
    fn profile_defaults_and_persists() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.profile().unwrap(), UserProfile::default());

        let profile = UserProfile {
            weight_kg: 82.5,
            height_cm: 181.0,
        };
        db.set_profile(&profile).unwrap();
        assert_eq!(db.profile().unwrap(), profile);

        db.kv_set(PROFILE_KEY, "not json").unwrap();
        assert_eq!(db.profile().unwrap(), UserProfile::default());
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formcoach.db");
        {
            let mut db = Database::open_at(&path).unwrap();
            WorkoutHistory::add_record(&mut db, &record("kept", 2)).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.list_records(10).unwrap().len(), 1);
    }
}
