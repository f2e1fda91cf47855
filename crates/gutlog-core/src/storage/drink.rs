//! Drink log storage

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::models::{DrinkLog, ItemKind};
use crate::range::DateRange;
use crate::storage::database::{
    count_rows, delete_log_row, query_log_rows, range_bounds, to_millis, Database, LogRow,
    LOG_COLUMNS,
};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::items::{link_items, linked_item_names, unlink_items};

const TABLE: &str = "drink_logs";

impl Database {
    /// Insert a drink log along with its drinks
    pub fn insert_drink_log(&mut self, log: &DrinkLog) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        let id = log.id.to_string();

        tx.execute(
            r#"
            INSERT INTO drink_logs (id, logged_at, note, created_at, updated_at)
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
        link_items(&tx, ItemKind::Drink, &id, &log.drinks)?;

        tx.commit()?;
        Ok(())
    }

    /// Update a drink log and replace its drinks
    pub fn update_drink_log(&mut self, log: &DrinkLog) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        let id = log.id.to_string();

        let updated = tx.execute(
            "UPDATE drink_logs SET logged_at = ?, note = ?, updated_at = ? WHERE id = ?",
            params![
                to_millis(&log.logged_at),
                log.note,
                to_millis(&log.updated_at),
                id,
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::LogNotFound {
                kind: "drink",
                id: log.id,
            });
        }

        unlink_items(&tx, ItemKind::Drink, &id)?;
        link_items(&tx, ItemKind::Drink, &id, &log.drinks)?;

        tx.commit()?;
        Ok(())
    }

    /// Delete a drink log; its item links cascade
    pub fn delete_drink_log(&mut self, id: Uuid) -> StorageResult<()> {
        if !delete_log_row(&self.conn, TABLE, id)? {
            return Err(StorageError::LogNotFound { kind: "drink", id });
        }
        Ok(())
    }

    pub fn get_drink_log(&self, id: Uuid) -> StorageResult<Option<DrinkLog>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM drink_logs WHERE id = ?", LOG_COLUMNS),
                params![id.to_string()],
                LogRow::from_row,
            )
            .optional()?;

        row.map(|row| hydrate(&self.conn, row)).transpose()
    }

    /// Drink logs in a range, newest first
    pub fn get_drink_logs(&self, range: &DateRange) -> StorageResult<Vec<DrinkLog>> {
        let (from, to) = range_bounds(range);
        let rows = query_log_rows(
            &self.conn,
            &format!(
                "SELECT {} FROM drink_logs WHERE logged_at >= ? AND logged_at < ? \
                 ORDER BY logged_at DESC, created_at DESC",
                LOG_COLUMNS
            ),
            params![from, to],
        )?;
        debug!("Loaded {} drink log(s)", rows.len());

        rows.into_iter().map(|row| hydrate(&self.conn, row)).collect()
    }

    /// Drink logs in a range that include a given drink, newest first
    pub fn get_drink_logs_with(&self, drink: &str, range: &DateRange) -> StorageResult<Vec<DrinkLog>> {
        let (from, to) = range_bounds(range);
        let rows = query_log_rows(
            &self.conn,
            r#"
            SELECT l.id, l.logged_at, l.note, l.created_at, l.updated_at
            FROM drink_logs l
            JOIN drink_log_items j ON j.drink_log_id = l.id
            JOIN drink_items i ON i.id = j.drink_item_id
            WHERE i.name = ? AND l.logged_at >= ? AND l.logged_at < ?
            ORDER BY l.logged_at DESC, l.created_at DESC
            "#,
            params![drink.trim(), from, to],
        )?;

        rows.into_iter().map(|row| hydrate(&self.conn, row)).collect()
    }

    pub fn drink_log_count(&self) -> StorageResult<i64> {
        count_rows(&self.conn, TABLE)
    }
}

fn hydrate(conn: &Connection, row: LogRow) -> StorageResult<DrinkLog> {
    let drinks = linked_item_names(conn, ItemKind::Drink, &row.id)?;
    let fields = row.parse(TABLE)?;

    Ok(DrinkLog {
        id: fields.id,
        logged_at: fields.logged_at,
        drinks,
        note: fields.note,
        created_at: fields.created_at,
        updated_at: fields.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn log_at(hours_ago: i64, drinks: &[&str]) -> DrinkLog {
        let mut log = DrinkLog::new(Utc::now() - Duration::hours(hours_ago));
        for drink in drinks {
            log.add_drink(drink);
        }
        log
    }

    #[test]
    fn test_insert_update_delete() {
        let mut db = Database::open_in_memory().unwrap();
        let mut log = log_at(2, &["espresso", "water"]);
        db.insert_drink_log(&log).unwrap();
        assert_eq!(db.drink_log_count().unwrap(), 1);

        log.set_drinks(vec!["decaf".to_string()]);
        db.update_drink_log(&log).unwrap();
        let stored = db.get_drink_log(log.id).unwrap().unwrap();
        assert_eq!(stored.drinks, vec!["decaf"]);

        db.delete_drink_log(log.id).unwrap();
        assert_eq!(db.drink_log_count().unwrap(), 0);
    }

    #[test]
    fn test_drinks_do_not_touch_food_items() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_drink_log(&log_at(1, &["orange juice"])).unwrap();

        assert_eq!(db.item_count(ItemKind::Drink).unwrap(), 1);
        assert_eq!(db.item_count(ItemKind::Food).unwrap(), 0);
    }

    #[test]
    fn test_get_logs_with_drink_respects_range() {
        let mut db = Database::open_in_memory().unwrap();
        let old = log_at(30, &["beer"]);
        let new = log_at(1, &["Beer", "crisps"]);
        db.insert_drink_log(&old).unwrap();
        db.insert_drink_log(&new).unwrap();

        let all = db.get_drink_logs_with("beer", &DateRange::all()).unwrap();
        assert_eq!(all.len(), 2);

        let today = db
            .get_drink_logs_with(
                "beer",
                &DateRange::between(Utc::now() - Duration::hours(12), Utc::now()),
            )
            .unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, new.id);
        assert_eq!(today[0].drinks, vec!["beer", "crisps"]);
    }
}
