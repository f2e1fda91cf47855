//! SQLite database handle
//!
//! `Database` owns the connection. The per-family data access methods live
//! next to their row mapping in sibling modules (`food`, `drink`, `symptom`,
//! `movement`, `items`, `settings`) as further `impl Database` blocks.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Params, Row};
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::range::DateRange;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::schema::{init_schema, needs_init};

/// Columns shared by every log table, in `LogRow` order
pub(crate) const LOG_COLUMNS: &str = "id, logged_at, note, created_at, updated_at";

/// SQLite-backed journal storage
pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    /// Open or create the SQLite database
    pub fn open(config: &Config) -> StorageResult<Self> {
        let path = config.sqlite_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }

        debug!("Opening database at {:?}", path);
        let conn = Connection::open(&path)?;
        Self::prepare(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        if needs_init(&conn) {
            init_schema(&conn)?;
        }

        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ==================== Row helpers ====================

/// Columns common to every log table
pub(crate) struct LogRow {
    pub id: String,
    pub logged_at: i64,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LogRow {
    /// Read the first five columns, as selected by `LOG_COLUMNS`
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            logged_at: row.get(1)?,
            note: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    pub fn parse(self, table: &'static str) -> StorageResult<LogFields> {
        Ok(LogFields {
            id: parse_id(table, &self.id)?,
            logged_at: from_millis(table, self.logged_at)?,
            note: self.note,
            created_at: from_millis(table, self.created_at)?,
            updated_at: from_millis(table, self.updated_at)?,
        })
    }
}

/// Parsed form of a `LogRow`
pub(crate) struct LogFields {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn to_millis(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn from_millis(table: &'static str, millis: i64) -> StorageResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| StorageError::InvalidRow {
        table,
        details: format!("timestamp out of range: {}", millis),
    })
}

pub(crate) fn parse_id(table: &'static str, id: &str) -> StorageResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| StorageError::InvalidRow {
        table,
        details: format!("invalid UUID '{}': {}", id, e),
    })
}

/// SQL bounds for a half-open `[from, to)` range on `logged_at`
pub(crate) fn range_bounds(range: &DateRange) -> (i64, i64) {
    (
        range.from.as_ref().map(to_millis).unwrap_or(i64::MIN),
        range.to.as_ref().map(to_millis).unwrap_or(i64::MAX),
    )
}

/// Run a query selecting `LOG_COLUMNS` and collect the rows
pub(crate) fn query_log_rows<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> StorageResult<Vec<LogRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, LogRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Count rows of a table
pub(crate) fn count_rows(conn: &Connection, table: &str) -> StorageResult<i64> {
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

/// Delete a log row by id, returning whether it existed
pub(crate) fn delete_log_row(conn: &Connection, table: &str, id: Uuid) -> StorageResult<bool> {
    let deleted = conn.execute(
        &format!("DELETE FROM {} WHERE id = ?", table),
        params![id.to_string()],
    )?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_file_and_schema() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().join("nested").join("data"),
            ..Config::default()
        };

        let db = Database::open(&config).unwrap();
        assert!(config.sqlite_path().exists());
        assert!(!needs_init(db.connection()));
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = Database::open_in_memory().unwrap();
        let enabled: i64 = db
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_millis_round_trip_and_bad_values() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(from_millis("t", to_millis(&ts)).unwrap(), ts);
        assert!(matches!(
            from_millis("t", i64::MAX),
            Err(StorageError::InvalidRow { .. })
        ));
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        assert!(parse_id("food_logs", "not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_id("food_logs", &id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_range_bounds_open_ends() {
        let (from, to) = range_bounds(&DateRange::all());
        assert_eq!(from, i64::MIN);
        assert_eq!(to, i64::MAX);
    }
}
