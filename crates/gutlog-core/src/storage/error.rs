//! Errors raised by the journal database and its DAOs

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ItemKind, MAX_NAME_LEN};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not create journal directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied for '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No space left while writing journal data to '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Item name is empty or too long
    #[error("Invalid {kind} name '{name}': names must be 1-{} characters", MAX_NAME_LEN)]
    InvalidName { kind: ItemKind, name: String },

    /// No item with that name
    #[error("No {kind} named '{name}'")]
    ItemNotFound { kind: ItemKind, name: String },

    /// Item is still referenced by logs
    #[error("Cannot delete {kind} '{name}': it is used by {count} log(s). Merge it into another {kind} instead.")]
    ItemInUse {
        kind: ItemKind,
        name: String,
        count: i64,
    },

    /// Merge source and target are the same item
    #[error("Cannot merge {kind} '{name}' into itself")]
    MergeIntoSelf { kind: ItemKind, name: String },

    /// No log with that ID
    #[error("No {kind} log with ID {id}")]
    LogNotFound { kind: &'static str, id: Uuid },

    /// A stored row could not be converted to a model
    #[error("Invalid row in '{table}': {details}")]
    InvalidRow { table: &'static str, details: String },

    #[error("Path does not exist: '{path}'")]
    NotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Classify an I/O error raised while preparing `path`
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            _ if is_disk_full_error(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::CreateDirectory {
                path,
                source: error,
            },
        }
    }

    /// Whether the user can fix this and retry the same command
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::DiskFull { .. }
                | StorageError::PermissionDenied { .. }
                | StorageError::ItemInUse { .. }
                | StorageError::InvalidName { .. }
        )
    }

    /// A hint printed under the error message
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free some disk space, then run the command again."),
            StorageError::PermissionDenied { .. } | StorageError::CreateDirectory { .. } => {
                Some("Check that you can write to the data directory, or point `data_dir` somewhere else with `gutlog config set data_dir <path>`.")
            }
            StorageError::ItemInUse { .. } => {
                Some("Use `gutlog items merge` to move its logs onto another item first.")
            }
            StorageError::InvalidRow { .. } => {
                Some("The database may have been edited by hand. Fix or delete the offending row.")
            }
            _ => None,
        }
    }
}

fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    ["no space left", "disk full", "quota exceeded", "not enough space"]
        .iter()
        .any(|needle| msg.contains(needle))
}

pub type StorageResult<T> = Result<T, StorageError>;
