//! Bowel movement command handlers

use anyhow::{anyhow, Context, Result};
use uuid::Uuid;

use gutlog_core::{DateRange, Entry, FormIntent, Journal, MovementLogForm, StoolType};

use super::{confirm_action, future_tolerance, invalid_entry, resolve_log_id, when_intents};
use crate::output::Output;

/// Log a bowel movement
pub fn add(
    journal: &mut Journal,
    stool_type: StoolType,
    at: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut form = MovementLogForm::new();
    form.set_future_tolerance(future_tolerance(journal.config()));

    for intent in when_intents(at.as_deref())? {
        form.apply(intent);
    }
    form.apply(FormIntent::SetStoolType(stool_type));
    if let Some(note) = note {
        form.apply(FormIntent::SetNote(note));
    }

    let log = form.validate().map_err(invalid_entry)?;
    journal
        .add_movement_log(&log)
        .context("Failed to log movement")?;

    output.success(&format!("Logged movement: {}", log.id));
    output.print_entry(&Entry::Movement(log));
    Ok(())
}

/// List movement logs, newest first
pub fn list(journal: &Journal, range: &DateRange, output: &Output) -> Result<()> {
    let entries: Vec<Entry> = journal
        .list_movement_logs(range)?
        .into_iter()
        .map(Entry::Movement)
        .collect();
    output.print_entries(&entries);
    Ok(())
}

pub fn show(journal: &Journal, id: String, output: &Output) -> Result<()> {
    let uuid = parse_movement_id(&id, journal)?;
    let log = journal
        .get_movement_log(uuid)?
        .ok_or_else(|| anyhow!("Movement log not found: {}", id))?;

    output.print_entry(&Entry::Movement(log));
    Ok(())
}

pub fn edit(
    journal: &mut Journal,
    id: String,
    stool_type: Option<StoolType>,
    at: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let uuid = parse_movement_id(&id, journal)?;
    let log = journal
        .get_movement_log(uuid)?
        .ok_or_else(|| anyhow!("Movement log not found: {}", id))?;

    let mut form = MovementLogForm::from_movement_log(&log);
    form.set_future_tolerance(future_tolerance(journal.config()));

    for intent in when_intents(at.as_deref())? {
        form.apply(intent);
    }
    if let Some(stool_type) = stool_type {
        form.apply(FormIntent::SetStoolType(stool_type));
    }
    if let Some(note) = note {
        form.apply(FormIntent::SetNote(note));
    }

    let log = form.validate().map_err(invalid_entry)?;
    journal
        .update_movement_log(&log)
        .context("Failed to update movement log")?;

    output.success("Movement log updated");
    output.print_entry(&Entry::Movement(log));
    Ok(())
}

pub fn delete(journal: &mut Journal, id: String, output: &Output) -> Result<()> {
    let uuid = parse_movement_id(&id, journal)?;
    let log = journal
        .get_movement_log(uuid)?
        .ok_or_else(|| anyhow!("Movement log not found: {}", id))?;

    let description = format!(
        "Delete movement log: {} - {}",
        &log.id.to_string()[..8],
        log.stool_type
    );
    if !confirm_action(output, &description)? {
        return Ok(());
    }

    journal
        .delete_movement_log(uuid)
        .context("Failed to delete movement log")?;
    output.success(&format!("Deleted movement log: {}", uuid));
    Ok(())
}

fn parse_movement_id(id: &str, journal: &Journal) -> Result<Uuid> {
    let candidates: Vec<Entry> = journal
        .list_movement_logs(&DateRange::all())?
        .into_iter()
        .map(Entry::Movement)
        .collect();
    resolve_log_id(id, "movement", &candidates)
}
