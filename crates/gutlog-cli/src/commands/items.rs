//! Item command handlers (foods, drinks, symptoms)

use anyhow::{Context, Result};

use gutlog_core::{ItemKind, Journal, RenameOutcome};

use super::confirm_action;
use crate::output::Output;

/// List items of a kind
///
/// With a search query, matches are listed prefix-first; otherwise items are
/// listed with their usage counts.
pub fn list(
    journal: &Journal,
    kind: ItemKind,
    search: Option<String>,
    output: &Output,
) -> Result<()> {
    match search {
        Some(query) => {
            let items = journal.search_items(kind, &query)?;
            output.print_items(kind, &items);
        }
        None => {
            let items = journal.items_with_counts(kind)?;
            output.print_item_usage(kind, &items);
        }
    }
    Ok(())
}

pub fn rename(
    journal: &mut Journal,
    kind: ItemKind,
    old_name: String,
    new_name: String,
    output: &Output,
) -> Result<()> {
    match journal.rename_item(kind, &old_name, &new_name)? {
        RenameOutcome::Renamed(item) => {
            output.success(&format!("Renamed {} '{}' to '{}'", kind, old_name, item.name));
        }
        RenameOutcome::Merged {
            into,
            logs_repointed,
        } => {
            output.success(&format!(
                "'{}' already existed: merged {} '{}' into it ({} log(s) updated)",
                into.name, kind, old_name, logs_repointed
            ));
        }
    }
    Ok(())
}

/// Merge a duplicate item into a canonical one
pub fn merge(
    journal: &mut Journal,
    kind: ItemKind,
    duplicate: String,
    canonical: String,
    output: &Output,
) -> Result<()> {
    let description = format!(
        "Merge {} '{}' into '{}'. '{}' will be deleted.",
        kind, duplicate, canonical, duplicate
    );
    if !confirm_action(output, &description)? {
        return Ok(());
    }

    let logs = journal.merge_items(kind, &duplicate, &canonical)?;
    output.success(&format!(
        "Merged {} '{}' into '{}' ({} log(s) updated)",
        kind, duplicate, canonical, logs
    ));
    Ok(())
}

/// Delete an unused item
pub fn delete(journal: &mut Journal, kind: ItemKind, name: String, output: &Output) -> Result<()> {
    if !confirm_action(output, &format!("Delete {} '{}'", kind, name))? {
        return Ok(());
    }

    let item = journal.delete_item(kind, &name)?;
    output.success(&format!("Deleted {} '{}'", kind, item.name));
    Ok(())
}

/// Delete every item of a kind that no log uses
pub fn prune(journal: &mut Journal, kind: ItemKind, output: &Output) -> Result<()> {
    let removed = journal
        .prune_items(kind)
        .context("Failed to prune items")?;

    if output.is_quiet() {
        println!("{}", removed);
    } else {
        output.success(&format!("Removed {} unused {} item(s)", removed, kind));
    }
    Ok(())
}
