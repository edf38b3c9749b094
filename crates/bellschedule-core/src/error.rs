//! Core error types for bellschedule-core.
//!
//! This module defines the error hierarchy using thiserror. Dataset loading
//! failures are split into the three [`LoadError`] kinds the loader reacts to:
//! missing data and unexpected shapes fall back to the cached snapshot, while
//! [`LoadError::NoFallbackAvailable`] is terminal for one load attempt.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for bellschedule-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Dataset loading errors
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Key-value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP transport errors from the dataset provider
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The dataset documents the engine reads and caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Bundle,
    ScheduleTable,
    Calendar,
    Symbols,
    CustomSymbols,
    ZeroPeriodMarker,
    LastModified,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Document::Bundle => "dataset bundle",
            Document::ScheduleTable => "schedule table",
            Document::Calendar => "calendar",
            Document::Symbols => "symbol table",
            Document::CustomSymbols => "custom symbols",
            Document::ZeroPeriodMarker => "zero period marker",
            Document::LastModified => "last modified timestamp",
        };
        f.write_str(name)
    }
}

/// Dataset loading errors.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A required document could not be fetched or parsed
    #[error("Missing {document}: {reason}")]
    MissingData { document: Document, reason: String },

    /// A document parsed but did not have the expected structure
    #[error("Unexpected shape for {document}: {reason}")]
    UnexpectedShape { document: Document, reason: String },

    /// Neither a fresh dataset nor a cached snapshot is available
    #[error("No dataset available and no cached snapshot to fall back to ({} error(s))", .causes.len())]
    NoFallbackAvailable { causes: Vec<String> },
}

impl LoadError {
    pub fn missing(document: Document, reason: impl Into<String>) -> Self {
        LoadError::MissingData {
            document,
            reason: reason.into(),
        }
    }

    pub fn shape(document: Document, reason: impl Into<String>) -> Self {
        LoadError::UnexpectedShape {
            document,
            reason: reason.into(),
        }
    }
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("Store is locked")]
    Locked,
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

    /// No data directory could be determined
    #[error("Cannot determine data directory: {0}")]
    NoDataDir(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
