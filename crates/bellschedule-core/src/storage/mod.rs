mod compat;
mod config;
mod kv;
mod persistence;
mod sqlite;

pub use compat::migrate_legacy_overrides;
pub use config::{Config, DatasetConfig, DisplayConfig};
pub use kv::{KeyValueStore, MemoryStore};
pub use persistence::{
    Persistence, CALENDAR_KEY, CUSTOM_SYMBOLS_KEY, LAST_SYNCED_KEY, LAST_VERSION_USED_KEY,
    SCHEDULE_TABLE_KEY, SYMBOLS_KEY, ZERO_PERIOD_MARKER_KEY,
};
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/bellschedule/`, or `$BELLSCHEDULE_DATA_DIR` when set.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("BELLSCHEDULE_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .ok_or_else(|| ConfigError::NoDataDir("home directory not found".into()))?
            .join(".config")
            .join("bellschedule"),
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::NoDataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
