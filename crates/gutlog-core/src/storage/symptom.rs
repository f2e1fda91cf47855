//! Symptom log storage
//!
//! Unlike food and drink links, each symptom link carries a severity.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::models::{ItemKind, Severity, SymptomEntry, SymptomLog};
use crate::range::DateRange;
use crate::storage::database::{
    count_rows, delete_log_row, query_log_rows, range_bounds, to_millis, Database, LogRow,
    LOG_COLUMNS,
};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::items::{get_or_create_item, unlink_items};

const TABLE: &str = "symptom_logs";

impl Database {
    /// Insert a symptom log along with its symptoms and severities
    pub fn insert_symptom_log(&mut self, log: &SymptomLog) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        let id = log.id.to_string();

        tx.execute(
            r#"
            INSERT INTO symptom_logs (id, logged_at, note, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                id,
                to_millis(&log.logged_at),
                log.note,
                to_millis(&log.created_at),
                to_millis(&log.updated_at),
            ],
        )?;
        link_symptoms(&tx, &id, &log.symptoms)?;

        tx.commit()?;
        Ok(())
    }

    /// Update a symptom log and replace its symptoms
    pub fn update_symptom_log(&mut self, log: &SymptomLog) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        let id = log.id.to_string();

        let updated = tx.execute(
            "UPDATE symptom_logs SET logged_at = ?, note = ?, updated_at = ? WHERE id = ?",
            params![
                to_millis(&log.logged_at),
                log.note,
                to_millis(&log.updated_at),
                id,
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::LogNotFound {
                kind: "symptom",
                id: log.id,
            });
        }

        unlink_items(&tx, ItemKind::Symptom, &id)?;
        link_symptoms(&tx, &id, &log.symptoms)?;

        tx.commit()?;
        Ok(())
    }

    pub fn delete_symptom_log(&mut self, id: Uuid) -> StorageResult<()> {
        if !delete_log_row(&self.conn, TABLE, id)? {
            return Err(StorageError::LogNotFound {
                kind: "symptom",
                id,
            });
        }
        Ok(())
    }

    pub fn get_symptom_log(&self, id: Uuid) -> StorageResult<Option<SymptomLog>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM symptom_logs WHERE id = ?", LOG_COLUMNS),
                params![id.to_string()],
                LogRow::from_row,
            )
            .optional()?;

        row.map(|row| hydrate(&self.conn, row)).transpose()
    }

    /// Symptom logs in a range, newest first
    pub fn get_symptom_logs(&self, range: &DateRange) -> StorageResult<Vec<SymptomLog>> {
        let (from, to) = range_bounds(range);
        let rows = query_log_rows(
            &self.conn,
            &format!(
                "SELECT {} FROM symptom_logs WHERE logged_at >= ? AND logged_at < ? \
                 ORDER BY logged_at DESC, created_at DESC",
                LOG_COLUMNS
            ),
            params![from, to],
        )?;
        debug!("Loaded {} symptom log(s)", rows.len());

        rows.into_iter().map(|row| hydrate(&self.conn, row)).collect()
    }

    /// Symptom logs in a range that include a given symptom, newest first
    pub fn get_symptom_logs_with(
        &self,
        symptom: &str,
        range: &DateRange,
    ) -> StorageResult<Vec<SymptomLog>> {
        let (from, to) = range_bounds(range);
        let rows = query_log_rows(
            &self.conn,
            r#"
            SELECT l.id, l.logged_at, l.note, l.created_at, l.updated_at
            FROM symptom_logs l
            JOIN symptom_log_entries e ON e.symptom_log_id = l.id
            JOIN symptoms s ON s.id = e.symptom_id
            WHERE s.name = ? AND l.logged_at >= ? AND l.logged_at < ?
            ORDER BY l.logged_at DESC, l.created_at DESC
            "#,
            params![symptom.trim(), from, to],
        )?;

        rows.into_iter().map(|row| hydrate(&self.conn, row)).collect()
    }

    pub fn symptom_log_count(&self) -> StorageResult<i64> {
        count_rows(&self.conn, TABLE)
    }
}

/// Attach symptoms to a log; entries resolving to the same symptom keep the higher severity
fn link_symptoms(conn: &Connection, log_id: &str, entries: &[SymptomEntry]) -> StorageResult<()> {
    for (position, entry) in entries.iter().enumerate() {
        let symptom_id = get_or_create_item(conn, ItemKind::Symptom, &entry.name)?;
        conn.execute(
            r#"
            INSERT INTO symptom_log_entries (symptom_log_id, symptom_id, severity, position)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (symptom_log_id, symptom_id)
            DO UPDATE SET severity = MAX(severity, excluded.severity)
            "#,
            params![log_id, symptom_id, entry.severity.ordinal(), position as i64],
        )?;
    }
    Ok(())
}

fn symptom_entries(conn: &Connection, log_id: &str) -> StorageResult<Vec<SymptomEntry>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT s.name, e.severity FROM symptoms s
        JOIN symptom_log_entries e ON e.symptom_id = s.id
        WHERE e.symptom_log_id = ?
        ORDER BY e.position
        "#,
    )?;

    let rows = stmt
        .query_map(params![log_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(name, severity)| {
            let severity =
                Severity::from_ordinal(severity).ok_or_else(|| StorageError::InvalidRow {
                    table: "symptom_log_entries",
                    details: format!("severity out of range: {}", severity),
                })?;
            Ok(SymptomEntry::new(name, severity))
        })
        .collect()
}

fn hydrate(conn: &Connection, row: LogRow) -> StorageResult<SymptomLog> {
    let symptoms = symptom_entries(conn, &row.id)?;
    let fields = row.parse(TABLE)?;

    Ok(SymptomLog {
        id: fields.id,
        logged_at: fields.logged_at,
        symptoms,
        note: fields.note,
        created_at: fields.created_at,
        updated_at: fields.updated_at,
    })
}
