//! Core error types for habitloop-core.
//!
//! Errors fall into three groups: caller mistakes (`NotFound`, `Validation`,
//! `CategoryInUse`) which are reported before any write happens, transient
//! persistence failures (`StoreUnavailable`), and ambient failures from config
//! files and serialization.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitloop-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A habit or category referenced by id/name does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected before touching the store
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Category deletion blocked because habits still point at it
    #[error("Category '{name}' is still used by {habits} habit(s)")]
    CategoryInUse { name: String, habits: usize },

    /// Transient persistence failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CoreError {
    pub fn habit_not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: "habit",
            id: id.into(),
        }
    }

    pub fn category_not_found(name: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: "category",
            id: name.into(),
        }
    }

    /// Whether the error is a transient store failure the scheduler may skip over.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::StoreUnavailable(_))
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A store call did not finish in time
    #[error("Store call timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// An earlier store call that timed out is still running
    #[error("Previous store call is still running")]
    Busy,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Habit or category name is blank
    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },

    /// Reminder time is not `HH:MM`
    #[error("Invalid time of day '{0}': expected HH:MM (00:00-23:59)")]
    InvalidTimeOfDay(String),

    /// Weekly target below zero
    #[error("Weekly target must be >= 0, got {0}")]
    NegativeTarget(i64),

    /// Precondition violation on a pure function argument
    #[error("Invalid argument '{name}': {message}")]
    InvalidArgument { name: &'static str, message: String },

    /// Category name already taken
    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    /// Display color is not `#rrggbb`
    #[error("Invalid color '{0}': expected #rrggbb")]
    InvalidColor(String),

    /// The default category must always exist
    #[error("The default category '{0}' cannot be renamed or deleted")]
    ProtectedCategory(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::StoreUnavailable(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
