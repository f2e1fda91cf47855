//! Food log storage

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::models::{FoodLog, Item, ItemKind};
use crate::range::DateRange;
use crate::storage::database::{
    count_rows, delete_log_row, query_log_rows, range_bounds, to_millis, Database, LogRow,
    LOG_COLUMNS,
};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::items::{
    find_item_by_id, get_or_create_item, link_items, linked_item_names, unlink_items,
};

const TABLE: &str = "food_logs";

impl Database {
    /// Insert a food log along with its foods
    pub fn insert_food_log(&mut self, log: &FoodLog) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        insert_log(&tx, log)?;
        tx.commit()?;
        Ok(())
    }

    /// Create every named food and optionally a log of them, all or nothing
    pub fn import_foods(
        &mut self,
        names: &[String],
        log: Option<&FoodLog>,
    ) -> StorageResult<Vec<Item>> {
        let tx = self.conn.transaction()?;

        let mut foods = Vec::with_capacity(names.len());
        for name in names {
            let id = get_or_create_item(&tx, ItemKind::Food, name)?;
            foods.push(find_item_by_id(&tx, ItemKind::Food, id)?);
        }
        if let Some(log) = log {
            insert_log(&tx, log)?;
        }

        tx.commit()?;
        debug!("Imported {} food(s)", foods.len());
        Ok(foods)
    }

    /// Update a food log and replace its foods
    pub fn update_food_log(&mut self, log: &FoodLog) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        let id = log.id.to_string();

        let updated = tx.execute(
            "UPDATE food_logs SET logged_at = ?, note = ?, updated_at = ? WHERE id = ?",
            params![
                to_millis(&log.logged_at),
                log.note,
                to_millis(&log.updated_at),
                id,
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::LogNotFound {
                kind: "food",
                id: log.id,
            });
        }

        unlink_items(&tx, ItemKind::Food, &id)?;
        link_items(&tx, ItemKind::Food, &id, &log.foods)?;

        tx.commit()?;
        Ok(())
    }

    /// Delete a food log; its item links cascade
    pub fn delete_food_log(&mut self, id: Uuid) -> StorageResult<()> {
        if !delete_log_row(&self.conn, TABLE, id)? {
            return Err(StorageError::LogNotFound { kind: "food", id });
        }
        Ok(())
    }

    pub fn get_food_log(&self, id: Uuid) -> StorageResult<Option<FoodLog>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM food_logs WHERE id = ?", LOG_COLUMNS),
                params![id.to_string()],
                LogRow::from_row,
            )
            .optional()?;

        row.map(|row| hydrate(&self.conn, row)).transpose()
    }

    /// Food logs in a range, newest first
    pub fn get_food_logs(&self, range: &DateRange) -> StorageResult<Vec<FoodLog>> {
        let (from, to) = range_bounds(range);
        let rows = query_log_rows(
            &self.conn,
            &format!(
                "SELECT {} FROM food_logs WHERE logged_at >= ? AND logged_at < ? \
                 ORDER BY logged_at DESC, created_at DESC",
                LOG_COLUMNS
            ),
            params![from, to],
        )?;
        debug!("Loaded {} food log(s)", rows.len());

        rows.into_iter().map(|row| hydrate(&self.conn, row)).collect()
    }

    /// Food logs in a range that include a given food, newest first
    pub fn get_food_logs_with(&self, food: &str, range: &DateRange) -> StorageResult<Vec<FoodLog>> {
        let (from, to) = range_bounds(range);
        let rows = query_log_rows(
            &self.conn,
            r#"
            SELECT l.id, l.logged_at, l.note, l.created_at, l.updated_at
            FROM food_logs l
            JOIN food_log_items j ON j.food_log_id = l.id
            JOIN food_items i ON i.id = j.food_item_id
            WHERE i.name = ? AND l.logged_at >= ? AND l.logged_at < ?
            ORDER BY l.logged_at DESC, l.created_at DESC
            "#,
            params![food.trim(), from, to],
        )?;

        rows.into_iter().map(|row| hydrate(&self.conn, row)).collect()
    }

    pub fn food_log_count(&self) -> StorageResult<i64> {
        count_rows(&self.conn, TABLE)
    }
}

fn insert_log(conn: &Connection, log: &FoodLog) -> StorageResult<()> {
    let id = log.id.to_string();
    conn.execute(
        r#"
        INSERT INTO food_logs (id, logged_at, note, created_at, updated_at)
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
    link_items(conn, ItemKind::Food, &id, &log.foods)
}

fn hydrate(conn: &Connection, row: LogRow) -> StorageResult<FoodLog> {
    let foods = linked_item_names(conn, ItemKind::Food, &row.id)?;
    let fields = row.parse(TABLE)?;

    Ok(FoodLog {
        id: fields.id,
        logged_at: fields.logged_at,
        foods,
        note: fields.note,
        created_at: fields.created_at,
        updated_at: fields.updated_at,
    })
}
