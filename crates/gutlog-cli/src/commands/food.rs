//! Food log command handlers

use anyhow::{anyhow, Context, Result};
use uuid::Uuid;

use gutlog_core::{DateRange, Entry, FoodLogForm, FormIntent, Journal};

use super::{
    confirm_action, future_tolerance, invalid_entry, resolve_log_id, when_intents, ListArgs,
};
use crate::output::Output;

/// Log foods
pub fn add(
    journal: &mut Journal,
    foods: Vec<String>,
    at: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut form = FoodLogForm::new();
    form.set_future_tolerance(future_tolerance(journal.config()));

    for intent in when_intents(at.as_deref())? {
        form.apply(intent);
    }
    for food in foods {
        form.apply(FormIntent::Select(food));
    }
    if let Some(note) = note {
        form.apply(FormIntent::SetNote(note));
    }

    let log = form.validate().map_err(invalid_entry)?;
    journal.add_food_log(&log).context("Failed to log food")?;

    output.success(&format!("Logged food: {}", log.id));
    output.print_entry(&Entry::Food(log));
    Ok(())
}

/// List food logs, newest first
pub fn list(
    journal: &Journal,
    args: &ListArgs,
    with: Option<String>,
    output: &Output,
) -> Result<()> {
    let range = args.range()?;
    let logs = match with {
        Some(ref food) => journal.food_logs_with(food, &range)?,
        None => journal.list_food_logs(&range)?,
    };

    let entries: Vec<Entry> = logs.into_iter().map(Entry::Food).collect();
    output.print_entries(&entries);
    Ok(())
}

pub fn show(journal: &Journal, id: String, output: &Output) -> Result<()> {
    let uuid = parse_food_id(&id, journal)?;
    let log = journal
        .get_food_log(uuid)?
        .ok_or_else(|| anyhow!("Food log not found: {}", id))?;

    output.print_entry(&Entry::Food(log));
    Ok(())
}

/// Edit a food log: add or remove foods, move it, or change the note
pub fn edit(
    journal: &mut Journal,
    id: String,
    add: Vec<String>,
    remove: Vec<String>,
    at: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let uuid = parse_food_id(&id, journal)?;
    let log = journal
        .get_food_log(uuid)?
        .ok_or_else(|| anyhow!("Food log not found: {}", id))?;

    let mut form = FoodLogForm::from_food_log(&log);
    form.set_future_tolerance(future_tolerance(journal.config()));

    for intent in when_intents(at.as_deref())? {
        form.apply(intent);
    }
    for food in remove {
        form.apply(FormIntent::Deselect(food));
    }
    for food in add {
        form.apply(FormIntent::Select(food));
    }
    if let Some(note) = note {
        form.apply(FormIntent::SetNote(note));
    }

    let log = form.validate().map_err(invalid_entry)?;
    journal
        .update_food_log(&log)
        .context("Failed to update food log")?;

    output.success("Food log updated");
    output.print_entry(&Entry::Food(log));
    Ok(())
}

pub fn delete(journal: &mut Journal, id: String, output: &Output) -> Result<()> {
    let uuid = parse_food_id(&id, journal)?;
    let log = journal
        .get_food_log(uuid)?
        .ok_or_else(|| anyhow!("Food log not found: {}", id))?;

    let description = format!(
        "Delete food log: {} - {}",
        &log.id.to_string()[..8],
        log.foods.join(", ")
    );
    if !confirm_action(output, &description)? {
        return Ok(());
    }

    journal
        .delete_food_log(uuid)
        .context("Failed to delete food log")?;
    output.success(&format!("Deleted food log: {}", uuid));
    Ok(())
}

fn parse_food_id(id: &str, journal: &Journal) -> Result<Uuid> {
    let candidates: Vec<Entry> = journal
        .list_food_logs(&DateRange::all())?
        .into_iter()
        .map(Entry::Food)
        .collect();
    resolve_log_id(id, "food", &candidates)
}
