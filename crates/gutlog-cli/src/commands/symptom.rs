//! Symptom log command handlers
//!
//! Symptoms are given as `NAME` or `NAME:SEVERITY`, where the severity is
//! mild, moderate, severe or 1-3. Without a severity, mild is assumed.

use anyhow::{anyhow, bail, Context, Result};
use uuid::Uuid;

use gutlog_core::{DateRange, Entry, FormIntent, Journal, Severity, SymptomLogForm};

use super::{
    confirm_action, future_tolerance, invalid_entry, resolve_log_id, when_intents, ListArgs,
};
use crate::output::Output;

/// Split `NAME[:SEVERITY]`
///
/// The text after the last `:` is a severity only if it parses as one, so
/// names like `reflux: night` stay whole.
fn parse_symptom(arg: &str) -> Result<(String, Severity)> {
    let (name, severity) = match arg.rsplit_once(':') {
        Some((name, severity)) => match severity.parse::<Severity>() {
            Ok(severity) => (name, severity),
            Err(_) => (arg, Severity::default()),
        },
        None => (arg, Severity::default()),
    };

    let name = name.trim();
    if name.is_empty() {
        bail!("Missing symptom name in '{}'", arg);
    }
    Ok((name.to_string(), severity))
}

/// Log symptoms
pub fn add(
    journal: &mut Journal,
    symptoms: Vec<String>,
    at: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut form = SymptomLogForm::new();
    form.set_future_tolerance(future_tolerance(journal.config()));

    for intent in when_intents(at.as_deref())? {
        form.apply(intent);
    }
    for arg in symptoms {
        let (name, severity) = parse_symptom(&arg)?;
        form.apply(FormIntent::SetSeverity(name, severity));
    }
    if let Some(note) = note {
        form.apply(FormIntent::SetNote(note));
    }

    let log = form.validate().map_err(invalid_entry)?;
    journal
        .add_symptom_log(&log)
        .context("Failed to log symptoms")?;

    output.success(&format!("Logged symptoms: {}", log.id));
    output.print_entry(&Entry::Symptom(log));
    Ok(())
}

/// List symptom logs, newest first
pub fn list(
    journal: &Journal,
    args: &ListArgs,
    with: Option<String>,
    output: &Output,
) -> Result<()> {
    let range = args.range()?;
    let logs = match with {
        Some(ref symptom) => journal.symptom_logs_with(symptom, &range)?,
        None => journal.list_symptom_logs(&range)?,
    };

    let entries: Vec<Entry> = logs.into_iter().map(Entry::Symptom).collect();
    output.print_entries(&entries);
    Ok(())
}

pub fn show(journal: &Journal, id: String, output: &Output) -> Result<()> {
    let uuid = parse_symptom_id(&id, journal)?;
    let log = journal
        .get_symptom_log(uuid)?
        .ok_or_else(|| anyhow!("Symptom log not found: {}", id))?;

    output.print_entry(&Entry::Symptom(log));
    Ok(())
}

/// Edit a symptom log
///
/// `--add` also changes the severity of a symptom already in the log.
pub fn edit(
    journal: &mut Journal,
    id: String,
    add: Vec<String>,
    remove: Vec<String>,
    at: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let uuid = parse_symptom_id(&id, journal)?;
    let log = journal
        .get_symptom_log(uuid)?
        .ok_or_else(|| anyhow!("Symptom log not found: {}", id))?;

    let mut form = SymptomLogForm::from_symptom_log(&log);
    form.set_future_tolerance(future_tolerance(journal.config()));

    for intent in when_intents(at.as_deref())? {
        form.apply(intent);
    }
    for name in remove {
        form.apply(FormIntent::Deselect(name));
    }
    for arg in add {
        let (name, severity) = parse_symptom(&arg)?;
        form.apply(FormIntent::SetSeverity(name, severity));
    }
    if let Some(note) = note {
        form.apply(FormIntent::SetNote(note));
    }

    let log = form.validate().map_err(invalid_entry)?;
    journal
        .update_symptom_log(&log)
        .context("Failed to update symptom log")?;

    output.success("Symptom log updated");
    output.print_entry(&Entry::Symptom(log));
    Ok(())
}

pub fn delete(journal: &mut Journal, id: String, output: &Output) -> Result<()> {
    let uuid = parse_symptom_id(&id, journal)?;
    let log = journal
        .get_symptom_log(uuid)?
        .ok_or_else(|| anyhow!("Symptom log not found: {}", id))?;

    let names: Vec<&str> = log.symptoms.iter().map(|s| s.name.as_str()).collect();
    let description = format!(
        "Delete symptom log: {} - {}",
        &log.id.to_string()[..8],
        names.join(", ")
    );
    if !confirm_action(output, &description)? {
        return Ok(());
    }

    journal
        .delete_symptom_log(uuid)
        .context("Failed to delete symptom log")?;
    output.success(&format!("Deleted symptom log: {}", uuid));
    Ok(())
}

fn parse_symptom_id(id: &str, journal: &Journal) -> Result<Uuid> {
    let candidates: Vec<Entry> = journal
        .list_symptom_logs(&DateRange::all())?
        .into_iter()
        .map(Entry::Symptom)
        .collect();
    resolve_log_id(id, "symptom", &candidates)
}
