//! Snapshot persistence over a [`KeyValueStore`].
//!
//! A hard save writes the whole dataset snapshot after a successful fetch; a
//! soft save writes only the user's symbol overrides.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::kv::KeyValueStore;
use crate::calendar::ScheduleCalendar;
use crate::context::{Context, ContextOrigin};
use crate::error::Result;
use crate::schedule::ScheduleTable;
use crate::symbol::{parse_overrides, Symbol, SymbolTable};

pub(crate) const KEY_PREFIX: &str = "bellschedule.";

pub const SYMBOLS_KEY: &str = "bellschedule.symbols";
pub const CUSTOM_SYMBOLS_KEY: &str = "bellschedule.symbols.custom";
pub const SCHEDULE_TABLE_KEY: &str = "bellschedule.schedule_table";
pub const CALENDAR_KEY: &str = "bellschedule.calendar";
pub const ZERO_PERIOD_MARKER_KEY: &str = "bellschedule.zero_period_marker";
pub const LAST_SYNCED_KEY: &str = "bellschedule.last_synced";
pub const LAST_VERSION_USED_KEY: &str = "bellschedule.last_version_used";

pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Writes the full snapshot, overrides included, stamped with `synced_at`.
    ///
    /// Stored overrides for symbols the table does not offer as configurable
    /// are kept, so a dataset refresh never discards them.
    ///
    /// # Errors
    /// Returns an error if serialization or any store write fails.
    pub fn save_snapshot(&mut self, context: &Context, synced_at: DateTime<Utc>) -> Result<()> {
        let export = context.symbol_table.export()?;
        let schedule_table =
            serde_json::to_string(&context.calendar.schedule_table().to_value())?;
        let calendar = serde_json::to_string(&context.calendar.to_value())?;

        self.store.set(SCHEDULE_TABLE_KEY, &schedule_table)?;
        self.store.set(CALENDAR_KEY, &calendar)?;
        self.store.set(SYMBOLS_KEY, &export.symbol_table)?;
        let overrides = self.merged_overrides(&context.symbol_table)?;
        self.write_overrides(&overrides)?;
        self.store
            .set(ZERO_PERIOD_MARKER_KEY, &context.zero_period_marker)?;
        self.store.set(LAST_SYNCED_KEY, &synced_at.to_rfc3339())?;
        debug!("saved snapshot synced at {synced_at}");
        Ok(())
    }

    /// Writes only the overrides of `symbols`.
    ///
    /// A configurable symbol without an override clears its stored entry;
    /// entries for keys the table cannot configure are left alone.
    pub fn save_overrides(&mut self, symbols: &SymbolTable) -> Result<()> {
        let overrides = self.merged_overrides(symbols)?;
        self.write_overrides(&overrides)
    }

    fn merged_overrides(&self, symbols: &SymbolTable) -> Result<BTreeMap<String, String>> {
        let mut merged: BTreeMap<String, String> = self
            .load_overrides()?
            .into_iter()
            .filter(|(key, _)| !symbols.get(key).is_some_and(Symbol::is_configurable))
            .collect();
        merged.extend(symbols.overrides());
        Ok(merged)
    }

    pub(crate) fn write_overrides(&mut self, overrides: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string(overrides)?;
        self.store.set(CUSTOM_SYMBOLS_KEY, &json)
    }

    /// Stored overrides. A missing or malformed document reads as empty.
    pub fn load_overrides(&self) -> Result<BTreeMap<String, String>> {
        let Some(json) = self.store.get(CUSTOM_SYMBOLS_KEY)? else {
            return Ok(BTreeMap::new());
        };
        match parse_overrides(&json) {
            Ok(overrides) => Ok(overrides),
            Err(e) => {
                warn!("discarding stored overrides: {e}");
                Ok(BTreeMap::new())
            }
        }
    }

    /// When the snapshot was last saved, if ever.
    pub fn last_synced(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.store.get(LAST_SYNCED_KEY)? else {
            return Ok(None);
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(t) => Ok(Some(t.with_timezone(&Utc))),
            Err(e) => {
                warn!("ignoring malformed sync timestamp {raw:?}: {e}");
                Ok(None)
            }
        }
    }

    /// Rebuilds a cache-origin context from the stored snapshot.
    ///
    /// Returns `Ok(None)` when no complete snapshot has been saved.
    ///
    /// # Errors
    /// Returns a load error if a stored document no longer parses.
    pub fn load_context(&self) -> Result<Option<Context>> {
        let (Some(schedules), Some(calendar), Some(symbols)) = (
            self.store.get(SCHEDULE_TABLE_KEY)?,
            self.store.get(CALENDAR_KEY)?,
            self.store.get(SYMBOLS_KEY)?,
        ) else {
            return Ok(None);
        };

        let schedule_table = ScheduleTable::from_json(&schedules)?;
        let calendar = ScheduleCalendar::from_json(&calendar, schedule_table)?;
        let mut symbol_table = SymbolTable::from_json(&symbols)?;
        symbol_table.register_overrides(&self.load_overrides()?);
        let zero_period_marker = self.store.get(ZERO_PERIOD_MARKER_KEY)?.unwrap_or_default();
        let last_updated = self.last_synced()?.unwrap_or(DateTime::UNIX_EPOCH);

        Ok(Some(Context {
            calendar,
            symbol_table,
            origin: ContextOrigin::Cache,
            last_updated,
            zero_period_marker,
        }))
    }

    pub fn last_version_used(&self) -> Result<Option<String>> {
        self.store.get(LAST_VERSION_USED_KEY)
    }

    pub fn set_last_version_used(&mut self, version: &str) -> Result<()> {
        self.store.set(LAST_VERSION_USED_KEY, version)
    }
}
