//! Drink log command handlers

use anyhow::{anyhow, Context, Result};
use uuid::Uuid;

use gutlog_core::{DateRange, DrinkLogForm, Entry, FormIntent, Journal};

use super::{
    confirm_action, future_tolerance, invalid_entry, resolve_log_id, when_intents, ListArgs,
};
use crate::output::Output;

/// Log drinks
pub fn add(
    journal: &mut Journal,
    drinks: Vec<String>,
    at: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut form = DrinkLogForm::new();
    form.set_future_tolerance(future_tolerance(journal.config()));

    for intent in when_intents(at.as_deref())? {
        form.apply(intent);
    }
    for drink in drinks {
        form.apply(FormIntent::Select(drink));
    }
    if let Some(note) = note {
        form.apply(FormIntent::SetNote(note));
    }

    let log = form.validate().map_err(invalid_entry)?;
    journal.add_drink_log(&log).context("Failed to log drinks")?;

    output.success(&format!("Logged drinks: {}", log.id));
    output.print_entry(&Entry::Drink(log));
    Ok(())
}

/// List drink logs, newest first
pub fn list(
    journal: &Journal,
    args: &ListArgs,
    with: Option<String>,
    output: &Output,
) -> Result<()> {
    let range = args.range()?;
    let logs = match with {
        Some(ref drink) => journal.drink_logs_with(drink, &range)?,
        None => journal.list_drink_logs(&range)?,
    };

    let entries: Vec<Entry> = logs.into_iter().map(Entry::Drink).collect();
    output.print_entries(&entries);
    Ok(())
}

pub fn show(journal: &Journal, id: String, output: &Output) -> Result<()> {
    let uuid = parse_drink_id(&id, journal)?;
    let log = journal
        .get_drink_log(uuid)?
        .ok_or_else(|| anyhow!("Drink log not found: {}", id))?;

    output.print_entry(&Entry::Drink(log));
    Ok(())
}

/// Edit a drink log: add or remove drinks, move it, or change the note
pub fn edit(
    journal: &mut Journal,
    id: String,
    add: Vec<String>,
    remove: Vec<String>,
    at: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let uuid = parse_drink_id(&id, journal)?;
    let log = journal
        .get_drink_log(uuid)?
        .ok_or_else(|| anyhow!("Drink log not found: {}", id))?;

    let mut form = DrinkLogForm::from_drink_log(&log);
    form.set_future_tolerance(future_tolerance(journal.config()));

    for intent in when_intents(at.as_deref())? {
        form.apply(intent);
    }
    for drink in remove {
        form.apply(FormIntent::Deselect(drink));
    }
    for drink in add {
        form.apply(FormIntent::Select(drink));
    }
    if let Some(note) = note {
        form.apply(FormIntent::SetNote(note));
    }

    let log = form.validate().map_err(invalid_entry)?;
    journal
        .update_drink_log(&log)
        .context("Failed to update drink log")?;

    output.success("Drink log updated");
    output.print_entry(&Entry::Drink(log));
    Ok(())
}

pub fn delete(journal: &mut Journal, id: String, output: &Output) -> Result<()> {
    let uuid = parse_drink_id(&id, journal)?;
    let log = journal
        .get_drink_log(uuid)?
        .ok_or_else(|| anyhow!("Drink log not found: {}", id))?;

    let description = format!(
        "Delete drink log: {} - {}",
        &log.id.to_string()[..8],
        log.drinks.join(", ")
    );
    if !confirm_action(output, &description)? {
        return Ok(());
    }

    journal
        .delete_drink_log(uuid)
        .context("Failed to delete drink log")?;
    output.success(&format!("Deleted drink log: {}", uuid));
    Ok(())
}

fn parse_drink_id(id: &str, journal: &Journal) -> Result<Uuid> {
    let candidates: Vec<Entry> = journal
        .list_drink_logs(&DateRange::all())?
        .into_iter()
        .map(Entry::Drink)
        .collect();
    resolve_log_id(id, "drink", &candidates)
}
