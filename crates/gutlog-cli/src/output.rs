//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use gutlog_core::{Entry, Item, ItemKind, ItemUsage, JournalStats, RecipeSummary, SymptomEntry};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: could not serialize output: {}", e),
        }
    }

    /// Print a single entry with all details
    pub fn print_entry(&self, entry: &Entry) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", entry.id());
                println!("Type:     {}", entry.label());
                println!("When:     {}", local_time(&entry.logged_at()));
                match entry {
                    Entry::Food(log) => println!("Foods:    {}", log.foods.join(", ")),
                    Entry::Drink(log) => println!("Drinks:   {}", log.drinks.join(", ")),
                    Entry::Symptom(log) => {
                        println!("Symptoms: {}", symptom_summary(&log.symptoms))
                    }
                    Entry::Movement(log) => println!("Stool:    {}", log.stool_type),
                }
                if let Some(note) = entry_note(entry) {
                    println!("Note:     {}", note);
                }
                let (created, updated) = entry_times(entry);
                println!("Created:  {}", local_time(&created));
                println!("Updated:  {}", local_time(&updated));
            }
            OutputFormat::Json => self.print_json(entry),
            OutputFormat::Quiet => println!("{}", entry.id()),
        }
    }

    /// Print a list of entries, one line each
    pub fn print_entries(&self, entries: &[Entry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No entries found.");
                    return;
                }
                for entry in entries {
                    let note = entry_note(entry)
                        .map(|n| format!("  ({})", truncate_line(n, 30)))
                        .unwrap_or_default();
                    println!(
                        "{} | {} | {:<8} | {}{}",
                        short_id(entry),
                        local_time(&entry.logged_at()),
                        entry.label(),
                        truncate(&entry_summary(entry), 50),
                        note
                    );
                }
                println!("\n{} entr{}", entries.len(), plural_y(entries.len()));
            }
            OutputFormat::Json => self.print_json(entries),
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.id());
                }
            }
        }
    }

    /// Print items alphabetically
    pub fn print_items(&self, kind: ItemKind, items: &[Item]) {
        match self.format {
            OutputFormat::Human => {
                if items.is_empty() {
                    println!("No {} items found.", kind);
                    return;
                }
                for item in items {
                    println!("{}", item.name);
                }
                println!("\n{} {} item(s)", items.len(), kind);
            }
            OutputFormat::Json => self.print_json(items),
            OutputFormat::Quiet => {
                for item in items {
                    println!("{}", item.name);
                }
            }
        }
    }

    /// Print items with usage counts
    pub fn print_item_usage(&self, kind: ItemKind, items: &[ItemUsage]) {
        match self.format {
            OutputFormat::Human => {
                if items.is_empty() {
                    println!("No {} items found.", kind);
                    return;
                }
                for item in items {
                    println!("{} ({})", item.name, item.log_count);
                }
                println!("\n{} {} item(s)", items.len(), kind);
            }
            OutputFormat::Json => self.print_json(items),
            OutputFormat::Quiet => {
                for item in items {
                    println!("{}", item.name);
                }
            }
        }
    }

    pub fn print_recipes(&self, recipes: &[RecipeSummary]) {
        match self.format {
            OutputFormat::Human => {
                if recipes.is_empty() {
                    println!("No recipes found.");
                    return;
                }
                for recipe in recipes {
                    println!("{}", recipe_line(recipe));
                }
                println!("\n{} recipe(s)", recipes.len());
            }
            OutputFormat::Json => self.print_json(recipes),
            OutputFormat::Quiet => {
                for recipe in recipes {
                    println!("{}", recipe.uid);
                }
            }
        }
    }

    pub fn print_stats(&self, stats: &JournalStats) {
        match self.format {
            OutputFormat::Human => {
                println!("gutlog Status");
                println!("=============");
                println!();
                println!("Storage:");
                println!("  Database: {}", stats.database_path.display());
                println!("  Size:     {}", human_size(stats.database_bytes));
                println!();
                println!("Logs:");
                println!("  Food:      {}", stats.food_logs);
                println!("  Drinks:    {}", stats.drink_logs);
                println!("  Symptoms:  {}", stats.symptom_logs);
                println!("  Movements: {}", stats.movement_logs);
                println!();
                println!("Items:");
                println!("  Foods:    {}", stats.foods);
                println!("  Drinks:   {}", stats.drinks);
                println!("  Symptoms: {}", stats.symptoms);
            }
            OutputFormat::Json => self.print_json(stats),
            OutputFormat::Quiet => println!("{}", stats.database_path.display()),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// One-line description of what an entry records
pub fn entry_summary(entry: &Entry) -> String {
    match entry {
        Entry::Food(log) => log.foods.join(", "),
        Entry::Drink(log) => log.drinks.join(", "),
        Entry::Symptom(log) => symptom_summary(&log.symptoms),
        Entry::Movement(log) => log.stool_type.to_string(),
    }
}

fn symptom_summary(symptoms: &[SymptomEntry]) -> String {
    symptoms
        .iter()
        .map(|s| format!("{} ({})", s.name, s.severity))
        .collect::<Vec<_>>()
        .join(", ")
}

fn entry_note(entry: &Entry) -> Option<&str> {
    match entry {
        Entry::Food(log) => log.note.as_deref(),
        Entry::Drink(log) => log.note.as_deref(),
        Entry::Symptom(log) => log.note.as_deref(),
        Entry::Movement(log) => log.note.as_deref(),
    }
}

fn entry_times(entry: &Entry) -> (DateTime<Utc>, DateTime<Utc>) {
    match entry {
        Entry::Food(log) => (log.created_at, log.updated_at),
        Entry::Drink(log) => (log.created_at, log.updated_at),
        Entry::Symptom(log) => (log.created_at, log.updated_at),
        Entry::Movement(log) => (log.created_at, log.updated_at),
    }
}

fn short_id(entry: &Entry) -> String {
    entry.id().to_string()[..8].to_string()
}

fn local_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn plural_y(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

/// Format a byte count for display
fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Truncate a string to max length in characters, adding "..." if truncated
/// One `recipe list` row: uid and content hash
fn recipe_line(recipe: &RecipeSummary) -> String {
    format!("{}  {}", recipe.uid, recipe.hash)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gutlog_core::{FoodLog, MovementLog, Severity, StoolType, SymptomLog};

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_recipe_line_shows_hash() {
        let recipe = RecipeSummary {
            uid: "A1B2".to_string(),
            hash: "9f86d08".to_string(),
        };
        assert_eq!(recipe_line(&recipe), "A1B2  9f86d08");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multi-byte characters are not split
        assert_eq!(truncate("crème brûlée tart", 8), "crème...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
    }

    #[test]
    fn test_entry_summary() {
        let mut food = FoodLog::new(Utc::now());
        food.add_food("rice");
        food.add_food("beans");
        assert_eq!(entry_summary(&Entry::Food(food)), "rice, beans");

        let mut symptom = SymptomLog::new(Utc::now());
        symptom.add_symptom("gas", Severity::Moderate);
        assert_eq!(entry_summary(&Entry::Symptom(symptom)), "gas (moderate)");

        let movement = MovementLog::new(Utc::now(), StoolType::new(4).unwrap());
        assert!(entry_summary(&Entry::Movement(movement)).starts_with("Type 4"));
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }
}
