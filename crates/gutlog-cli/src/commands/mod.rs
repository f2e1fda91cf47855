//! Command handlers

pub mod config;
pub mod day;
pub mod drink;
pub mod food;
pub mod items;
pub mod movement;
pub mod recipe;
pub mod status;
pub mod symptom;

use anyhow::{anyhow, bail, Result};
use clap::Args;
use uuid::Uuid;

use gutlog_core::{Config, DateRange, Entry, FormErrors, FormIntent};

use crate::output::{entry_summary, Output};
use crate::prompt::{confirm, is_interactive};
use crate::time::{parse_date, parse_when};

/// Filters shared by the `list` subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// First day to include (YYYY-MM-DD, today, yesterday)
    #[arg(long)]
    pub from: Option<String>,
    /// Last day to include
    #[arg(long)]
    pub to: Option<String>,
    /// Only one day (shorthand for --from D --to D)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub date: Option<String>,
}

impl ListArgs {
    pub fn range(&self) -> Result<DateRange> {
        if let Some(date) = &self.date {
            return Ok(DateRange::day(parse_date(date)?));
        }
        let from = self.from.as_deref().map(parse_date).transpose()?;
        let to = self.to.as_deref().map(parse_date).transpose()?;
        Ok(DateRange::from_local_days(from, to))
    }
}

/// Resolve a log ID given as a full UUID or a unique prefix
pub(crate) fn resolve_log_id(id: &str, kind: &str, candidates: &[Entry]) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let prefix = id.trim().to_lowercase();
    if prefix.is_empty() {
        bail!("No {} log ID given", kind);
    }
    let matches: Vec<_> = candidates
        .iter()
        .filter(|e| e.id().to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => bail!("No {} log found matching: {}", kind, id),
        1 => Ok(matches[0].id()),
        _ => {
            eprintln!("Multiple {} logs match '{}':", kind, id);
            for entry in &matches {
                eprintln!("  {} - {}", entry.id(), entry_summary(entry));
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// SetDate/SetTime intents for an `--at` argument
pub(crate) fn when_intents(at: Option<&str>) -> Result<Vec<FormIntent>> {
    match at {
        Some(at) => {
            let (date, time) = parse_when(at)?;
            Ok(vec![FormIntent::SetDate(date), FormIntent::SetTime(time)])
        }
        None => Ok(Vec::new()),
    }
}

pub(crate) fn future_tolerance(config: &Config) -> chrono::Duration {
    chrono::Duration::minutes(config.future_tolerance_minutes)
}

pub(crate) fn invalid_entry(errors: FormErrors) -> anyhow::Error {
    anyhow!("Invalid entry: {}", errors)
}

/// Ask before a destructive action; only prompts on a terminal in human mode
pub(crate) fn confirm_action(output: &Output, description: &str) -> Result<bool> {
    if !output.should_prompt() || !is_interactive() {
        return Ok(true);
    }
    println!("{}", description);
    let confirmed = confirm("Are you sure?")?;
    if !confirmed {
        println!("Cancelled.");
    }
    Ok(confirmed)
}
