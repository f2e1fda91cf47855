//! Reusable item storage (foods, drinks, symptoms)
//!
//! All three item families share one table layout, so the queries here are
//! parameterized by `ItemKind`. Table and column names come from `ItemKind`
//! and are never user input.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::models::{normalize_name, Item, ItemKind, ItemUsage, MAX_NAME_LEN};
use crate::storage::database::{count_rows, Database};
use crate::storage::error::{StorageError, StorageResult};

/// Result of renaming an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The item now carries the new name
    Renamed(Item),
    /// The new name belonged to another item, so the two were merged
    Merged { into: Item, logs_repointed: usize },
}

impl Database {
    // ==================== Queries ====================

    /// All items of a kind, alphabetically
    pub fn list_items(&self, kind: ItemKind) -> StorageResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name FROM {} ORDER BY name COLLATE NOCASE",
            kind.item_table()
        ))?;

        let items = stmt
            .query_map([], |row| {
                Ok(Item {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// All items of a kind with the number of logs using each, most used first
    pub fn list_items_with_counts(&self, kind: ItemKind) -> StorageResult<Vec<ItemUsage>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT i.id, i.name, COUNT(j.{log_col}) AS uses
            FROM {items} i
            LEFT JOIN {join} j ON j.{item_col} = i.id
            GROUP BY i.id
            ORDER BY uses DESC, i.name COLLATE NOCASE
            "#,
            items = kind.item_table(),
            join = kind.join_table(),
            log_col = kind.join_log_column(),
            item_col = kind.join_item_column(),
        ))?;

        let items = stmt
            .query_map([], |row| {
                Ok(ItemUsage {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    log_count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Look up an item by name, ignoring case
    pub fn get_item_by_name(&self, kind: ItemKind, name: &str) -> StorageResult<Option<Item>> {
        find_item(&self.conn, kind, name)
    }

    /// Number of items of a kind
    pub fn item_count(&self, kind: ItemKind) -> StorageResult<i64> {
        count_rows(&self.conn, kind.item_table())
    }

    // ==================== Mutations ====================

    /// Insert an item if no item of that name exists; returns the item either way
    pub fn get_or_create_item(&mut self, kind: ItemKind, name: &str) -> StorageResult<Item> {
        let tx = self.conn.transaction()?;
        let id = get_or_create_item(&tx, kind, name)?;
        let item = find_item_by_id(&tx, kind, id)?;
        tx.commit()?;
        Ok(item)
    }

    /// Rename an item
    ///
    /// If another item of the same kind already has the new name, the renamed
    /// item is merged into it instead.
    pub fn rename_item(
        &mut self,
        kind: ItemKind,
        old_name: &str,
        new_name: &str,
    ) -> StorageResult<RenameOutcome> {
        let new_name = validate_name(kind, new_name)?;
        let current = require_item(&self.conn, kind, old_name)?;

        if let Some(existing) = find_item(&self.conn, kind, &new_name)? {
            if existing.id != current.id {
                let logs_repointed = self.merge_items(kind, &current.name, &existing.name)?;
                return Ok(RenameOutcome::Merged {
                    into: existing,
                    logs_repointed,
                });
            }
        }

        self.conn.execute(
            &format!("UPDATE {} SET name = ? WHERE id = ?", kind.item_table()),
            params![new_name, current.id],
        )?;
        info!("Renamed {} '{}' to '{}'", kind, current.name, new_name);

        Ok(RenameOutcome::Renamed(Item {
            id: current.id,
            name: new_name,
        }))
    }

    /// Merge `duplicate` into `canonical`
    ///
    /// Every log referencing the duplicate is repointed to the canonical item,
    /// then the duplicate is deleted. Logs that already reference both keep a
    /// single reference (for symptoms, with the higher severity). Returns the
    /// number of logs that referenced the duplicate.
    pub fn merge_items(
        &mut self,
        kind: ItemKind,
        duplicate: &str,
        canonical: &str,
    ) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;

        let dup = require_item(&tx, kind, duplicate)?;
        let canon = require_item(&tx, kind, canonical)?;
        if dup.id == canon.id {
            return Err(StorageError::MergeIntoSelf {
                kind,
                name: dup.name,
            });
        }

        let join = kind.join_table();
        let log_col = kind.join_log_column();
        let item_col = kind.join_item_column();

        if kind == ItemKind::Symptom {
            tx.execute(
                r#"
                UPDATE symptom_log_entries
                SET severity = MAX(severity, (
                    SELECT d.severity FROM symptom_log_entries d
                    WHERE d.symptom_log_id = symptom_log_entries.symptom_log_id
                      AND d.symptom_id = ?1
                ))
                WHERE symptom_id = ?2
                  AND symptom_log_id IN (
                    SELECT symptom_log_id FROM symptom_log_entries WHERE symptom_id = ?1
                  )
                "#,
                params![dup.id, canon.id],
            )?;
        }

        // Logs referencing both: drop the duplicate's row
        let overlapping = tx.execute(
            &format!(
                "DELETE FROM {join} WHERE {item_col} = ?1 AND {log_col} IN \
                 (SELECT {log_col} FROM {join} WHERE {item_col} = ?2)"
            ),
            params![dup.id, canon.id],
        )?;

        let repointed = tx.execute(
            &format!("UPDATE {join} SET {item_col} = ?2 WHERE {item_col} = ?1"),
            params![dup.id, canon.id],
        )?;

        tx.execute(
            &format!("DELETE FROM {} WHERE id = ?", kind.item_table()),
            params![dup.id],
        )?;

        tx.commit()?;

        let touched = overlapping + repointed;
        info!(
            "Merged {} '{}' into '{}' ({} log(s))",
            kind, dup.name, canon.name, touched
        );
        Ok(touched)
    }

    /// Delete an item that no log references
    pub fn delete_item(&mut self, kind: ItemKind, name: &str) -> StorageResult<Item> {
        let item = require_item(&self.conn, kind, name)?;
        let count = usage_count(&self.conn, kind, item.id)?;
        if count > 0 {
            return Err(StorageError::ItemInUse {
                kind,
                name: item.name,
                count,
            });
        }

        self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?", kind.item_table()),
            params![item.id],
        )?;
        info!("Deleted {} '{}'", kind, item.name);
        Ok(item)
    }

    /// Delete all items no log references; returns how many were deleted
    pub fn prune_unused_items(&mut self, kind: ItemKind) -> StorageResult<usize> {
        let deleted = self.conn.execute(
            &format!(
                "DELETE FROM {items} WHERE id NOT IN (SELECT {item_col} FROM {join})",
                items = kind.item_table(),
                join = kind.join_table(),
                item_col = kind.join_item_column(),
            ),
            [],
        )?;
        if deleted > 0 {
            info!("Pruned {} unused {} item(s)", deleted, kind);
        }
        Ok(deleted)
    }
}

// ==================== Transaction helpers ====================

/// Trim and check an item name
pub(crate) fn validate_name(kind: ItemKind, name: &str) -> StorageResult<String> {
    match normalize_name(name) {
        Some(normalized) if normalized.chars().count() <= MAX_NAME_LEN => Ok(normalized),
        _ => Err(StorageError::InvalidName {
            kind,
            name: name.to_string(),
        }),
    }
}

/// Get or create an item by name, returning its ID
pub(crate) fn get_or_create_item(conn: &Connection, kind: ItemKind, name: &str) -> StorageResult<i64> {
    let name = validate_name(kind, name)?;

    if let Some(item) = find_item(conn, kind, &name)? {
        return Ok(item.id);
    }

    conn.execute(
        &format!("INSERT INTO {} (name) VALUES (?)", kind.item_table()),
        params![name],
    )?;
    debug!("Created {} '{}'", kind, name);
    Ok(conn.last_insert_rowid())
}

/// Attach named items to a log, in order; names that resolve to the same item are kept once
pub(crate) fn link_items(
    conn: &Connection,
    kind: ItemKind,
    log_id: &str,
    names: &[String],
) -> StorageResult<()> {
    let sql = format!(
        "INSERT OR IGNORE INTO {} ({}, {}, position) VALUES (?, ?, ?)",
        kind.join_table(),
        kind.join_log_column(),
        kind.join_item_column()
    );
    for (position, name) in names.iter().enumerate() {
        let item_id = get_or_create_item(conn, kind, name)?;
        conn.execute(&sql, params![log_id, item_id, position as i64])?;
    }
    Ok(())
}

/// Remove all item links of a log
pub(crate) fn unlink_items(conn: &Connection, kind: ItemKind, log_id: &str) -> StorageResult<()> {
    conn.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?",
            kind.join_table(),
            kind.join_log_column()
        ),
        params![log_id],
    )?;
    Ok(())
}

/// Names of the items attached to a log, in insertion order
pub(crate) fn linked_item_names(
    conn: &Connection,
    kind: ItemKind,
    log_id: &str,
) -> StorageResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT i.name FROM {items} i
        JOIN {join} j ON j.{item_col} = i.id
        WHERE j.{log_col} = ?
        ORDER BY j.position
        "#,
        items = kind.item_table(),
        join = kind.join_table(),
        item_col = kind.join_item_column(),
        log_col = kind.join_log_column(),
    ))?;

    let names = stmt
        .query_map(params![log_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

fn find_item(conn: &Connection, kind: ItemKind, name: &str) -> StorageResult<Option<Item>> {
    let Some(name) = normalize_name(name) else {
        return Ok(None);
    };

    let item = conn
        .query_row(
            &format!("SELECT id, name FROM {} WHERE name = ?", kind.item_table()),
            params![name],
            |row| {
                Ok(Item {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(item)
}

pub(crate) fn find_item_by_id(conn: &Connection, kind: ItemKind, id: i64) -> StorageResult<Item> {
    let item = conn.query_row(
        &format!("SELECT id, name FROM {} WHERE id = ?", kind.item_table()),
        params![id],
        |row| {
            Ok(Item {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )?;
    Ok(item)
}

fn require_item(conn: &Connection, kind: ItemKind, name: &str) -> StorageResult<Item> {
    find_item(conn, kind, name)?.ok_or_else(|| StorageError::ItemNotFound {
        kind,
        name: name.trim().to_string(),
    })
}

fn usage_count(conn: &Connection, kind: ItemKind, item_id: i64) -> StorageResult<i64> {
    let count = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            kind.join_table(),
            kind.join_item_column()
        ),
        params![item_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
