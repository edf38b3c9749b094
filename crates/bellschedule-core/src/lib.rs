//! # Bellschedule Core Library
//!
//! Resolves, for any instant, which period of a school's bell schedule is
//! running, and plans period-ending reminders ahead of time. The `bellschedule`
//! CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Model**: [`ClockTime`], [`SymbolTable`], [`Schedule`] and
//!   [`ScheduleCalendar`] are plain values parsed from the dataset documents
//! - **Planner**: [`NotificationPlanner`] walks the calendar forward from an
//!   instant and emits a bounded, deterministic reminder plan
//! - **Dataset**: providers fetch the authoritative documents over HTTP or
//!   from a local bundle; [`load_newest_context`] reconciles them with the cache
//! - **Storage**: snapshot [`Persistence`] over a [`KeyValueStore`]
//!   (SQLite-backed by default) and TOML-based [`Config`]
//!
//! All wall-clock values are local, naive date-times.

pub mod calendar;
pub mod clock;
pub mod context;
pub mod dataset;
pub mod error;
pub mod notifications;
pub mod schedule;
pub mod storage;
pub mod symbol;

pub use calendar::ScheduleCalendar;
pub use clock::{ClockTime, HourCycle};
pub use context::{format_countdown, Context, ContextOrigin, LiveStatus};
pub use dataset::{
    load_newest_context, Dataset, DatasetProvider, FileDatasetProvider, HttpDatasetProvider,
    LoadOutcome,
};
pub use error::{ConfigError, CoreError, Document, LoadError, Result, StoreError};
pub use notifications::{
    apply_plan, plan_notifications, Exhaustion, JsonFileSink, MemorySink, NotificationPlan,
    NotificationPlanner, NotificationSettings, NotificationSink, PlannedNotification,
};
pub use schedule::{Period, Schedule, ScheduleTable};
pub use storage::{
    data_dir, migrate_legacy_overrides, Config, KeyValueStore, MemoryStore, Persistence,
    SqliteStore,
};
pub use symbol::{Symbol, SymbolTable};
