//! Bowel movement log storage

use rusqlite::{params, Row};
use tracing::debug;
use uuid::Uuid;

use crate::models::{MovementLog, StoolType};
use crate::range::DateRange;
use crate::storage::database::{
    count_rows, delete_log_row, from_millis, parse_id, range_bounds, to_millis, Database,
};
use crate::storage::error::{StorageError, StorageResult};

const TABLE: &str = "movement_logs";

const COLUMNS: &str = "id, logged_at, stool_type, note, created_at, updated_at";

/// Raw `movement_logs` row, before validation
struct MovementRow {
    id: String,
    logged_at: i64,
    stool_type: i64,
    note: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl MovementRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            logged_at: row.get(1)?,
            stool_type: row.get(2)?,
            note: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn into_log(self) -> StorageResult<MovementLog> {
        let stool_type = u8::try_from(self.stool_type)
            .ok()
            .and_then(|value| StoolType::new(value).ok())
            .ok_or_else(|| StorageError::InvalidRow {
                table: TABLE,
                details: format!("stool type out of range: {}", self.stool_type),
            })?;

        Ok(MovementLog {
            id: parse_id(TABLE, &self.id)?,
            logged_at: from_millis(TABLE, self.logged_at)?,
            stool_type,
            note: self.note,
            created_at: from_millis(TABLE, self.created_at)?,
            updated_at: from_millis(TABLE, self.updated_at)?,
        })
    }
}

impl Database {
    pub fn insert_movement_log(&mut self, log: &MovementLog) -> StorageResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO movement_logs (id, logged_at, stool_type, note, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                log.id.to_string(),
                to_millis(&log.logged_at),
                log.stool_type.value(),
                log.note,
                to_millis(&log.created_at),
                to_millis(&log.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn update_movement_log(&mut self, log: &MovementLog) -> StorageResult<()> {
        let updated = self.conn.execute(
            r#"
            UPDATE movement_logs
            SET logged_at = ?, stool_type = ?, note = ?, updated_at = ?
            WHERE id = ?
            "#,
            params![
                to_millis(&log.logged_at),
                log.stool_type.value(),
                log.note,
                to_millis(&log.updated_at),
                log.id.to_string(),
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::LogNotFound {
                kind: "movement",
                id: log.id,
            });
        }
        Ok(())
    }

    pub fn delete_movement_log(&mut self, id: Uuid) -> StorageResult<()> {
        if !delete_log_row(&self.conn, TABLE, id)? {
            return Err(StorageError::LogNotFound {
                kind: "movement",
                id,
            });
        }
        Ok(())
    }

    pub fn get_movement_log(&self, id: Uuid) -> StorageResult<Option<MovementLog>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM movement_logs WHERE id = ?", COLUMNS))?;
        let mut rows = stmt.query_map(params![id.to_string()], MovementRow::from_row)?;

        match rows.next() {
            Some(row) => Ok(Some(row?.into_log()?)),
            None => Ok(None),
        }
    }

    /// Movement logs in a range, newest first
    pub fn get_movement_logs(&self, range: &DateRange) -> StorageResult<Vec<MovementLog>> {
        let (from, to) = range_bounds(range);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM movement_logs WHERE logged_at >= ? AND logged_at < ? \
             ORDER BY logged_at DESC, created_at DESC",
            COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![from, to], MovementRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Loaded {} movement log(s)", rows.len());

        rows.into_iter().map(MovementRow::into_log).collect()
    }

    pub fn movement_log_count(&self) -> StorageResult<i64> {
        count_rows(&self.conn, TABLE)
    }
}
