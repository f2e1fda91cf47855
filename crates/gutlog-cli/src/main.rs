//! gutlog CLI
//!
//! Command-line interface for gutlog - a local food, drink, symptom and
//! bowel movement journal.

use std::fs::File;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gutlog_core::{Config, ItemKind, Journal, StoolType, StorageError};

mod commands;
mod output;
mod prompt;
mod time;

use commands::ListArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "gutlog")]
#[command(about = "gutlog - Track food, drinks, symptoms and bowel movements")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Food logs
    Food {
        #[command(subcommand)]
        command: ItemLogCommands,
    },
    /// Drink logs
    Drink {
        #[command(subcommand)]
        command: ItemLogCommands,
    },
    /// Symptom logs (symptoms as NAME or NAME:SEVERITY)
    Symptom {
        #[command(subcommand)]
        command: ItemLogCommands,
    },
    /// Bowel movement logs
    Movement {
        #[command(subcommand)]
        command: MovementCommands,
    },
    /// Manage foods, drinks and symptoms
    Items {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Show everything logged on a day
    Day {
        /// Date (YYYY-MM-DD, today, yesterday); defaults to today
        date: Option<String>,
    },
    /// Import ingredients from the recipe service
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Show counts and storage information
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

/// Subcommands shared by food, drink and symptom logs
#[derive(Subcommand)]
enum ItemLogCommands {
    /// Log one or more items
    #[command(alias = "create")]
    Add {
        /// Items to log
        #[arg(required = true)]
        items: Vec<String>,
        /// When ('YYYY-MM-DD HH:MM' or 'HH:MM'); defaults to now
        #[arg(short, long)]
        at: Option<String>,
        /// Free-text note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// List logs, newest first
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        range: ListArgs,
        /// Only logs containing this item
        #[arg(short, long)]
        with: Option<String>,
    },
    /// Show a log
    Show {
        /// Log ID (full UUID or prefix)
        id: String,
    },
    /// Edit a log
    Edit {
        /// Log ID (full UUID or prefix)
        id: String,
        /// Item to add
        #[arg(long)]
        add: Vec<String>,
        /// Item to remove
        #[arg(long)]
        remove: Vec<String>,
        /// New time
        #[arg(short, long)]
        at: Option<String>,
        /// New note (empty to clear)
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Delete a log
    #[command(alias = "rm")]
    Delete {
        /// Log ID (full UUID or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum MovementCommands {
    /// Log a bowel movement
    #[command(alias = "create")]
    Add {
        /// Bristol stool type (1-7)
        stool_type: StoolType,
        #[arg(short, long)]
        at: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// List movement logs, newest first
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        range: ListArgs,
    },
    /// Show a movement log
    Show {
        id: String,
    },
    /// Edit a movement log
    Edit {
        id: String,
        /// New stool type (1-7)
        #[arg(short = 't', long = "type")]
        stool_type: Option<StoolType>,
        #[arg(short, long)]
        at: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Delete a movement log
    #[command(alias = "rm")]
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// List items with usage counts
    #[command(alias = "ls")]
    List {
        kind: ItemKind,
        /// Only items containing this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Rename an item (merges if the new name exists)
    Rename {
        kind: ItemKind,
        old_name: String,
        new_name: String,
    },
    /// Merge a duplicate into a canonical item
    Merge {
        kind: ItemKind,
        /// Item to remove
        duplicate: String,
        /// Item to keep
        canonical: String,
    },
    /// Delete an item no log uses
    #[command(alias = "rm")]
    Delete { kind: ItemKind, name: String },
    /// Delete every item no log uses
    Prune { kind: ItemKind },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Save recipe service credentials
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Password (or set GUTLOG_RECIPE_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget recipe service credentials
    Logout,
    /// List recipes in the account
    #[command(alias = "ls")]
    List,
    /// Show a recipe's ingredients as foods
    Show { uid: String },
    /// Import a recipe's ingredients as foods
    Import {
        uid: String,
        /// Also log the foods now
        #[arg(long)]
        log: bool,
        /// Log the foods at this time
        #[arg(short, long)]
        at: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file, recipe_base_url, future_tolerance_minutes)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {:#}", e);

        let hint = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<StorageError>())
            .and_then(StorageError::recovery_suggestion);
        if let Some(hint) = hint {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work without opening the journal
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config = Config::load_with_cli_override(config_path)?;
    init_logging(&config);

    let mut journal = Journal::open_with_config(config)?;

    match cli.command {
        Commands::Food { command } => handle_food_command(command, &mut journal, &output),
        Commands::Drink { command } => handle_drink_command(command, &mut journal, &output),
        Commands::Symptom { command } => handle_symptom_command(command, &mut journal, &output),
        Commands::Movement { command } => {
            handle_movement_command(command, &mut journal, &output)
        }
        Commands::Items { command } => handle_item_command(command, &mut journal, &output),
        Commands::Day { date } => commands::day::show(&journal, date, &output),
        Commands::Recipe { command } => {
            handle_recipe_command(command, &mut journal, &output).await
        }
        Commands::Status => commands::status::show(&journal, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_food_command(
    command: ItemLogCommands,
    journal: &mut Journal,
    output: &Output,
) -> Result<()> {
    use commands::food;

    match command {
        ItemLogCommands::Add { items, at, note } => food::add(journal, items, at, note, output),
        ItemLogCommands::List { range, with } => food::list(journal, &range, with, output),
        ItemLogCommands::Show { id } => food::show(journal, id, output),
        ItemLogCommands::Edit {
            id,
            add,
            remove,
            at,
            note,
        } => food::edit(journal, id, add, remove, at, note, output),
        ItemLogCommands::Delete { id } => food::delete(journal, id, output),
    }
}

fn handle_drink_command(
    command: ItemLogCommands,
    journal: &mut Journal,
    output: &Output,
) -> Result<()> {
    use commands::drink;

    match command {
        ItemLogCommands::Add { items, at, note } => drink::add(journal, items, at, note, output),
        ItemLogCommands::List { range, with } => drink::list(journal, &range, with, output),
        ItemLogCommands::Show { id } => drink::show(journal, id, output),
        ItemLogCommands::Edit {
            id,
            add,
            remove,
            at,
            note,
        } => drink::edit(journal, id, add, remove, at, note, output),
        ItemLogCommands::Delete { id } => drink::delete(journal, id, output),
    }
}

fn handle_symptom_command(
    command: ItemLogCommands,
    journal: &mut Journal,
    output: &Output,
) -> Result<()> {
    use commands::symptom;

    match command {
        ItemLogCommands::Add { items, at, note } => {
            symptom::add(journal, items, at, note, output)
        }
        ItemLogCommands::List { range, with } => symptom::list(journal, &range, with, output),
        ItemLogCommands::Show { id } => symptom::show(journal, id, output),
        ItemLogCommands::Edit {
            id,
            add,
            remove,
            at,
            note,
        } => symptom::edit(journal, id, add, remove, at, note, output),
        ItemLogCommands::Delete { id } => symptom::delete(journal, id, output),
    }
}

fn handle_movement_command(
    command: MovementCommands,
    journal: &mut Journal,
    output: &Output,
) -> Result<()> {
    use commands::movement;

    match command {
        MovementCommands::Add {
            stool_type,
            at,
            note,
        } => movement::add(journal, stool_type, at, note, output),
        MovementCommands::List { range } => movement::list(journal, &range.range()?, output),
        MovementCommands::Show { id } => movement::show(journal, id, output),
        MovementCommands::Edit {
            id,
            stool_type,
            at,
            note,
        } => movement::edit(journal, id, stool_type, at, note, output),
        MovementCommands::Delete { id } => movement::delete(journal, id, output),
    }
}

fn handle_item_command(command: ItemCommands, journal: &mut Journal, output: &Output) -> Result<()> {
    use commands::items;

    match command {
        ItemCommands::List { kind, search } => items::list(journal, kind, search, output),
        ItemCommands::Rename {
            kind,
            old_name,
            new_name,
        } => items::rename(journal, kind, old_name, new_name, output),
        ItemCommands::Merge {
            kind,
            duplicate,
            canonical,
        } => items::merge(journal, kind, duplicate, canonical, output),
        ItemCommands::Delete { kind, name } => items::delete(journal, kind, name, output),
        ItemCommands::Prune { kind } => items::prune(journal, kind, output),
    }
}

async fn handle_recipe_command(
    command: RecipeCommands,
    journal: &mut Journal,
    output: &Output,
) -> Result<()> {
    use commands::recipe;

    match command {
        RecipeCommands::Login { username, password } => {
            recipe::login(journal, username, password, output)
        }
        RecipeCommands::Logout => recipe::logout(journal, output),
        RecipeCommands::List => recipe::list(journal, output).await,
        RecipeCommands::Show { uid } => recipe::show(journal, uid, output).await,
        RecipeCommands::Import { uid, log, at } => {
            recipe::import(journal, uid, log, at, output).await
        }
    }
}

/// Initialize file logging when GUTLOG_LOG is set (e.g. GUTLOG_LOG=debug)
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("GUTLOG_LOG") else {
        return;
    };

    let log_path = config.log_path();
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("gutlog_core={},gutlog={}", log_level, log_level));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
