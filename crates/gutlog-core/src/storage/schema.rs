//! SQLite schema for the journal database
//!
//! Reusable items (foods, drinks, symptoms) live in their own tables and are
//! attached to logs through join tables. Deleting a log cascades to its join
//! rows; items are only removed explicitly (delete, merge, prune).

use rusqlite::{Connection, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Key-value settings (recipe service credentials)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Food
        CREATE TABLE IF NOT EXISTS food_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE
        );

        CREATE TABLE IF NOT EXISTS food_logs (
            id TEXT PRIMARY KEY,
            logged_at INTEGER NOT NULL,
            note TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS food_log_items (
            food_log_id TEXT NOT NULL,
            food_item_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (food_log_id, food_item_id),
            FOREIGN KEY (food_log_id) REFERENCES food_logs(id) ON DELETE CASCADE,
            FOREIGN KEY (food_item_id) REFERENCES food_items(id) ON DELETE CASCADE
        );

        -- Drinks
        CREATE TABLE IF NOT EXISTS drink_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE
        );

        CREATE TABLE IF NOT EXISTS drink_logs (
            id TEXT PRIMARY KEY,
            logged_at INTEGER NOT NULL,
            note TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS drink_log_items (
            drink_log_id TEXT NOT NULL,
            drink_item_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (drink_log_id, drink_item_id),
            FOREIGN KEY (drink_log_id) REFERENCES drink_logs(id) ON DELETE CASCADE,
            FOREIGN KEY (drink_item_id) REFERENCES drink_items(id) ON DELETE CASCADE
        );

        -- Symptoms
        CREATE TABLE IF NOT EXISTS symptoms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE
        );

        CREATE TABLE IF NOT EXISTS symptom_logs (
            id TEXT PRIMARY KEY,
            logged_at INTEGER NOT NULL,
            note TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS symptom_log_entries (
            symptom_log_id TEXT NOT NULL,
            symptom_id INTEGER NOT NULL,
            severity INTEGER NOT NULL CHECK (severity BETWEEN 1 AND 3),
            position INTEGER NOT NULL,
            PRIMARY KEY (symptom_log_id, symptom_id),
            FOREIGN KEY (symptom_log_id) REFERENCES symptom_logs(id) ON DELETE CASCADE,
            FOREIGN KEY (symptom_id) REFERENCES symptoms(id) ON DELETE CASCADE
        );

        -- Bowel movements (single classification, no items)
        CREATE TABLE IF NOT EXISTS movement_logs (
            id TEXT PRIMARY KEY,
            logged_at INTEGER NOT NULL,
            stool_type INTEGER NOT NULL CHECK (stool_type BETWEEN 1 AND 7),
            note TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Timeline queries
        CREATE INDEX IF NOT EXISTS idx_food_logs_logged_at ON food_logs(logged_at);
        CREATE INDEX IF NOT EXISTS idx_drink_logs_logged_at ON drink_logs(logged_at);
        CREATE INDEX IF NOT EXISTS idx_symptom_logs_logged_at ON symptom_logs(logged_at);
        CREATE INDEX IF NOT EXISTS idx_movement_logs_logged_at ON movement_logs(logged_at);

        -- Reverse lookups (item -> logs), used by merge and usage counts
        CREATE INDEX IF NOT EXISTS idx_food_log_items_item ON food_log_items(food_item_id);
        CREATE INDEX IF NOT EXISTS idx_drink_log_items_item ON drink_log_items(drink_item_id);
        CREATE INDEX IF NOT EXISTS idx_symptom_log_entries_item ON symptom_log_entries(symptom_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_info WHERE key = 'version'")?;
    let result: Result<String> = stmt.query_row([], |row| row.get(0));

    match result {
        Ok(version_str) => Ok(version_str.parse().ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check if schema needs initialization or migration
pub fn needs_init(conn: &Connection) -> bool {
    let table_exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_info'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false);

    if !table_exists {
        return true;
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(conn: &Connection, sql: &str) -> Vec<String> {
        conn.prepare(sql)
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_init_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables = names(
            &conn,
            "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name",
        );

        for table in [
            "settings",
            "food_items",
            "food_logs",
            "food_log_items",
            "drink_items",
            "drink_logs",
            "drink_log_items",
            "symptoms",
            "symptom_logs",
            "symptom_log_entries",
            "movement_logs",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn test_schema_version() {
        let conn = Connection::open_in_memory().unwrap();

        assert!(needs_init(&conn));

        init_schema(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
        assert!(!needs_init(&conn));
    }

    #[test]
    fn test_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_item_names_unique_ignoring_case() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute("INSERT INTO food_items (name) VALUES ('Oats')", [])
            .unwrap();
        let dup = conn.execute("INSERT INTO food_items (name) VALUES ('oats')", []);
        assert!(dup.is_err());
    }

    #[test]
    fn test_stool_type_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let bad = conn.execute(
            "INSERT INTO movement_logs (id, logged_at, stool_type, created_at, updated_at)
             VALUES ('x', 0, 9, 0, 0)",
            [],
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_indexes_exist() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let indexes = names(
            &conn,
            "SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'",
        );

        assert!(indexes.contains(&"idx_food_logs_logged_at".to_string()));
        assert!(indexes.contains(&"idx_movement_logs_logged_at".to_string()));
        assert!(indexes.contains(&"idx_symptom_log_entries_item".to_string()));
    }
}
