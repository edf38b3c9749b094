//! Upgrades storage written by releases that predate namespaced keys.
//!
//! Those releases kept each symbol override as its own top-level entry. On
//! the first run with no recorded version, such entries are folded into the
//! overrides document and removed.

use log::info;

use super::kv::KeyValueStore;
use super::persistence::{Persistence, KEY_PREFIX};
use crate::error::Result;

/// Migrates legacy per-key overrides and records the running version.
///
/// Overrides already stored under the current layout win over legacy
/// entries with the same key. Returns the number of entries migrated.
///
/// # Errors
/// Returns an error if the store cannot be read or written.
pub fn migrate_legacy_overrides<S: KeyValueStore>(
    persistence: &mut Persistence<S>,
) -> Result<usize> {
    if persistence.last_version_used()?.is_some() {
        return Ok(0);
    }

    let legacy: Vec<(String, String)> = persistence
        .store()
        .entries()?
        .into_iter()
        .filter(|(key, _)| !key.starts_with(KEY_PREFIX))
        .collect();

    let mut overrides = persistence.load_overrides()?;
    for (key, value) in &legacy {
        overrides.entry(key.clone()).or_insert_with(|| value.clone());
    }
    if !legacy.is_empty() {
        persistence.write_overrides(&overrides)?;
        for (key, _) in &legacy {
            persistence.store_mut().remove(key)?;
        }
        info!("migrated {} legacy override(s)", legacy.len());
    }

    persistence.set_last_version_used(env!("CARGO_PKG_VERSION"))?;
    Ok(legacy.len())
}
