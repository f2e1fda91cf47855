//! Key-value settings stored alongside the journal

use rusqlite::{params, OptionalExtension};

use crate::storage::database::Database;
use crate::storage::error::StorageResult;

impl Database {
    pub fn get_setting(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or overwrite a setting
    pub fn set_setting(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a setting, returning whether it existed
    pub fn delete_setting(&mut self, key: &str) -> StorageResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?", params![key])?;
        Ok(deleted > 0)
    }
}
