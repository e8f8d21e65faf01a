use crate::dlog;
use crate::error::PersistenceError;
use crate::types::{Workout, WorkoutRecord};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;

/// The single slot holding the whole serialized workout list.
pub const WORKOUT_LIST_KEY: &str = "workoutList";

/// A local text store addressed by string keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// Key-value table in a SQLite file.
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    pub fn open(path: &Path) -> Result<Self> {
        let display = path.display();
        let conn = Connection::open(path).with_context(|| format!("Opening SQLite DB: {display}"))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Opening in-memory SQLite DB")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        if !table_exists(&conn, "kv")? {
            tracing::info!("creating key-value table");
        }
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv (
              key    TEXT PRIMARY KEY NOT NULL,
              value  TEXT NOT NULL
            );
            ",
        )
        .context("Ensuring key-value schema")?;

        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.conn.execute(
            r"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            ",
            [key, value],
        )?;
        Ok(())
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

/// Process-local store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryKv {
    values: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Writes and reads the workout list under [`WORKOUT_LIST_KEY`].
///
/// A stored value that does not decode is an error, never an empty list:
/// saving over it would destroy whatever the user still has in there.
pub struct PersistenceAdapter<K> {
    kv: K,
}

impl<K: KeyValueStore> PersistenceAdapter<K> {
    pub const fn new(kv: K) -> Self {
        Self { kv }
    }

    pub const fn store(&self) -> &K {
        &self.kv
    }

    /// Overwrites the stored list with `workouts`.
    ///
    /// JSON has no NaN or infinity, so a workout holding one is refused and
    /// the stored list is left as it was.
    pub fn save(&mut self, workouts: &[Workout]) -> Result<(), PersistenceError> {
        if let Some((index, field)) = workouts
            .iter()
            .enumerate()
            .find_map(|(i, w)| w.non_finite_field().map(|f| (i, f)))
        {
            return Err(PersistenceError::NonFinite { index, field });
        }

        let records: Vec<WorkoutRecord> = workouts.iter().map(Workout::to_record).collect();
        let text = serde_json::to_string(&records).map_err(PersistenceError::Encode)?;
        self.kv.set(WORKOUT_LIST_KEY, &text)?;
        dlog!("saved workouts={} bytes={}", records.len(), text.len());
        Ok(())
    }

    /// Stored records in their saved order. An absent key is an empty list.
    pub fn load(&self) -> Result<Vec<WorkoutRecord>, PersistenceError> {
        let Some(text) = self.kv.get(WORKOUT_LIST_KEY)? else {
            dlog!("no stored workout list");
            return Ok(Vec::new());
        };

        serde_json::from_str(&text).map_err(|source| PersistenceError::Decode {
            key: WORKOUT_LIST_KEY,
            source,
        })
    }

    /// [`load`](Self::load) plus reconstruction into [`Workout`]s.
    pub fn load_workouts(&self) -> Result<Vec<Workout>, PersistenceError> {
        self.load()?
            .iter()
            .enumerate()
            .map(|(index, record)| {
                Workout::from_record(record).map_err(|source| PersistenceError::BadDate {
                    index,
                    raw: record.date.clone(),
                    source,
                })
            })
            .collect()
    }
}
