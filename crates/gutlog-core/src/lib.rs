//! gutlog core library
//!
//! This crate provides the core functionality for gutlog, a local health
//! journal for food, drinks, symptoms and bowel movements.
//!
//! # Architecture
//!
//! - **SQLite**: single local database; foods, drinks and symptoms are
//!   reusable items shared between logs through join tables
//! - **Journal**: repository over the database, used by every front end
//! - **Forms**: UI-independent entry state with validation
//!
//! # Quick Start
//!
//! ```text
//! let mut journal = Journal::open()?;
//!
//! // Log a meal
//! let mut log = FoodLog::new(Utc::now());
//! log.add_food("porridge");
//! journal.add_food_log(&log)?;
//!
//! // Clean up a duplicate food
//! journal.merge_items(ItemKind::Food, "porrige", "porridge")?;
//! ```
//!
//! # Modules
//!
//! - `journal`: main entry point
//! - `models`: logs, items, severities, stool types
//! - `forms`: entry forms
//! - `storage`: SQLite persistence
//! - `recipes`: recipe service client
//! - `range`: date ranges for queries
//! - `config`: application configuration

pub mod config;
pub mod forms;
pub mod journal;
pub mod models;
pub mod range;
pub mod recipes;
pub mod storage;

pub use config::Config;
pub use forms::{
    DrinkLogForm, FoodLogForm, FormErrors, FormIntent, ItemLogForm, MovementLogForm,
    SymptomLogForm,
};
pub use journal::{Journal, JournalStats, RecipeImport};
pub use models::{
    DrinkLog, Entry, FoodLog, Item, ItemKind, ItemUsage, MovementLog, Severity, StoolType,
    SymptomEntry, SymptomLog,
};
pub use range::DateRange;
pub use recipes::{Credentials, Recipe, RecipeClient, RecipeError, RecipeSummary};
pub use storage::{RenameOutcome, StorageError};
