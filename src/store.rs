use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::error::StoreError;

/// Keys persisted by the statistics engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum StatKey {
    #[strum(to_string = "totalCorrectAnswers")]
    TotalCorrectAnswers,
    #[strum(to_string = "bestGameCorrectAnswers")]
    BestGameCorrectAnswers,
    #[strum(to_string = "bestGameTotalQuestions")]
    BestGameTotalQuestions,
    #[strum(to_string = "bestGameDate")]
    BestGameDate,
    #[strum(to_string = "gamesCount")]
    GamesCount,
}

/// One value in a batched update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatWrite {
    Int(StatKey, i64),
    Date(StatKey, DateTime<Local>),
}

/// Durable key-value storage for aggregate counters.
///
/// Reads never fail: a missing or unreadable value comes back as `0` / `None`.
pub trait StatisticsStore {
    fn get_int(&self, key: StatKey) -> i64;
    fn set_int(&mut self, key: StatKey, value: i64) -> Result<(), StoreError>;
    fn get_date(&self, key: StatKey) -> Option<DateTime<Local>>;
    fn set_date(&mut self, key: StatKey, value: DateTime<Local>) -> Result<(), StoreError>;

    /// Apply every write or none of them
    fn write_all(&mut self, writes: &[StatWrite]) -> Result<(), StoreError>;
}

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS statistics (
        key TEXT PRIMARY KEY,
        int_value INTEGER,
        date_value TEXT,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
"#;

const UPSERT_INT: &str = r#"
    INSERT INTO statistics (key, int_value) VALUES (?1, ?2)
    ON CONFLICT(key) DO UPDATE SET int_value = excluded.int_value,
        updated_at = CURRENT_TIMESTAMP
"#;

const UPSERT_DATE: &str = r#"
    INSERT INTO statistics (key, date_value) VALUES (?1, ?2)
    ON CONFLICT(key) DO UPDATE SET date_value = excluded.date_value,
        updated_at = CURRENT_TIMESTAMP
"#;

fn apply_write(conn: &Connection, write: &StatWrite) -> rusqlite::Result<usize> {
    match write {
        StatWrite::Int(key, value) => conn.execute(UPSERT_INT, params![key.to_string(), value]),
        StatWrite::Date(key, value) => {
            conn.execute(UPSERT_DATE, params![key.to_string(), value.to_rfc3339()])
        }
    }
}

/// SQLite-backed store. Single writes run in autocommit mode, batches in one
/// transaction.
#[derive(Debug)]
pub struct SqliteStatisticsStore {
    conn: Connection,
}

impl SqliteStatisticsStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self { conn })
    }

    fn read<T: rusqlite::types::FromSql>(&self, key: StatKey, column: &str) -> Option<T> {
        let sql = format!("SELECT {column} FROM statistics WHERE key = ?1");
        match self
            .conn
            .query_row(&sql, [key.to_string()], |row| row.get::<_, Option<T>>(0))
            .optional()
        {
            Ok(value) => value.flatten(),
            Err(e) => {
                warn!(%key, error = %e, "unreadable statistics value, using default");
                None
            }
        }
    }

    /// Make every later write to `key` fail, as a full disk would
    #[cfg(test)]
    pub(crate) fn fail_writes_to(&self, key: StatKey) {
        let sql = format!(
            "CREATE TRIGGER IF NOT EXISTS fail_{key} BEFORE INSERT ON statistics \
             WHEN NEW.key = '{key}' BEGIN SELECT RAISE(ABORT, 'disk full'); END"
        );
        self.conn.execute_batch(&sql).expect("install failing trigger");
    }

    /// Remove every stored counter
    pub fn clear(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM statistics", [])?;
        Ok(())
    }
}

impl StatisticsStore for SqliteStatisticsStore {
    fn get_int(&self, key: StatKey) -> i64 {
        self.read::<i64>(key, "int_value").unwrap_or(0)
    }

    fn set_int(&mut self, key: StatKey, value: i64) -> Result<(), StoreError> {
        apply_write(&self.conn, &StatWrite::Int(key, value))?;
        Ok(())
    }

    fn get_date(&self, key: StatKey) -> Option<DateTime<Local>> {
        let raw = self.read::<String>(key, "date_value")?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(date) => Some(date.with_timezone(&Local)),
            Err(e) => {
                warn!(%key, error = %e, "corrupt date in statistics store");
                None
            }
        }
    }

    fn set_date(&mut self, key: StatKey, value: DateTime<Local>) -> Result<(), StoreError> {
        apply_write(&self.conn, &StatWrite::Date(key, value))?;
        Ok(())
    }

    fn write_all(&mut self, writes: &[StatWrite]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        for write in writes {
            apply_write(&tx, write)?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Volatile store for tests and for running without a database
#[derive(Debug, Default, Clone)]
pub struct MemoryStatisticsStore {
    ints: HashMap<StatKey, i64>,
    dates: HashMap<StatKey, DateTime<Local>>,
}

impl MemoryStatisticsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatisticsStore for MemoryStatisticsStore {
    fn get_int(&self, key: StatKey) -> i64 {
        self.ints.get(&key).copied().unwrap_or(0)
    }

    fn set_int(&mut self, key: StatKey, value: i64) -> Result<(), StoreError> {
        self.ints.insert(key, value);
        Ok(())
    }

    fn get_date(&self, key: StatKey) -> Option<DateTime<Local>> {
        self.dates.get(&key).copied()
    }

    fn set_date(&mut self, key: StatKey, value: DateTime<Local>) -> Result<(), StoreError> {
        self.dates.insert(key, value);
        Ok(())
    }

    fn write_all(&mut self, writes: &[StatWrite]) -> Result<(), StoreError> {
        for write in writes {
            match *write {
                StatWrite::Int(key, value) => {
                    self.ints.insert(key, value);
                }
                StatWrite::Date(key, value) => {
                    self.dates.insert(key, value);
                }
            }
        }
        Ok(())
    }
}

impl<S: StatisticsStore + ?Sized> StatisticsStore for Box<S> {
    fn get_int(&self, key: StatKey) -> i64 {
        (**self).get_int(key)
    }

    fn set_int(&mut self, key: StatKey, value: i64) -> Result<(), StoreError> {
        (**self).set_int(key, value)
    }

    fn get_date(&self, key: StatKey) -> Option<DateTime<Local>> {
        (**self).get_date(key)
    }

    fn set_date(&mut self, key: StatKey, value: DateTime<Local>) -> Result<(), StoreError> {
        (**self).set_date(key, value)
    }

    fn write_all(&mut self, writes: &[StatWrite]) -> Result<(), StoreError> {
        (**self).write_all(writes)
    }
}
