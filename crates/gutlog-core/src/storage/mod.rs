//! Storage layer
//!
//! A single SQLite database holds every log family, the shared item tables
//! and a small settings table.
//!
//! ## Layout
//!
//! - `database`: connection handling and row helpers
//! - `items`: reusable foods, drinks and symptoms (rename, merge, prune)
//! - `food`, `drink`, `symptom`, `movement`: per-family log access
//! - `settings`: key-value settings

mod database;
mod drink;
mod error;
mod food;
mod items;
mod movement;
pub mod schema;
mod settings;
mod symptom;

pub use database::Database;
pub use error::{StorageError, StorageResult};
pub use items::RenameOutcome;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
