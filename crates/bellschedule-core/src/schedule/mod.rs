//! Periods, daily schedules, and the schedule table.
//!
//! A [`Schedule`] is one day's ordered list of [`Period`]s. Schedules are
//! keyed by dataset-assigned ids in a [`ScheduleTable`].

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::clock::ClockTime;
use crate::error::{Document, LoadError};

static ORDERING_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"![0-9]*( )?").expect("valid ordering prefix regex"));

const HIDDEN_MARKER: &str = "ZZZ";

/// A named time window within a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    /// Identity within the owning schedule.
    pub key: String,
    /// Display name; may embed `$(symbol)` placeholders.
    pub name: String,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl Period {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        start_time: ClockTime,
        end_time: ClockTime,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            start_time,
            end_time,
        }
    }

    /// True iff `start_time <= at < end_time`, comparing time of day only.
    pub fn is_current(&self, at: &NaiveDateTime) -> bool {
        let t = at.time();
        t >= self.start_time.to_naive_time() && t < self.end_time.to_naive_time()
    }

    pub fn duration(&self) -> Duration {
        self.end_time.to_naive_time() - self.start_time.to_naive_time()
    }

    /// Whether the two windows share any instant.
    pub fn overlaps(&self, other: &Period) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }

    fn from_value(key: &str, value: &Value) -> Option<Self> {
        let start = value.get("start")?.as_str()?;
        let end = value.get("end")?.as_str()?;
        let name = value.get("name")?.as_str()?;
        Some(Self::new(key, name, ClockTime::parse(start), ClockTime::parse(end)))
    }

    fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "start": self.start_time.to_string(),
            "end": self.end_time.to_string(),
        })
    }
}

/// One day's bell schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub name: String,
    /// Periods in declared order (source keys sorted lexicographically).
    pub periods: Vec<Period>,
}

impl Schedule {
    pub fn new(name: impl Into<String>, periods: Vec<Period>) -> Self {
        Self {
            name: name.into(),
            periods,
        }
    }

    /// Name with the `!<n>` ordering prefix and the hidden marker removed.
    pub fn display_name(&self) -> String {
        ORDERING_PREFIX_RE
            .replace_all(&self.name, "")
            .replace(HIDDEN_MARKER, "")
    }

    /// The active period at `at`.
    ///
    /// When periods overlap, the last matching one in declared order wins.
    pub fn current_period(&self, at: &NaiveDateTime) -> Option<&Period> {
        self.periods.iter().rev().find(|p| p.is_current(at))
    }

    pub fn period(&self, key: &str) -> Option<&Period> {
        self.periods.iter().find(|p| p.key == key)
    }

    /// Pairs of periods whose windows overlap, in declared order.
    pub fn overlapping_periods(&self) -> Vec<(&Period, &Period)> {
        let mut pairs = Vec::new();
        for (i, a) in self.periods.iter().enumerate() {
            for b in &self.periods[i + 1..] {
                if a.overlaps(b) {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    /// Builds a schedule from its dataset entry.
    ///
    /// Returns `None` for hidden entries and entries without a name. Every
    /// other key holding a well-formed period object becomes a period.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.contains_key("hidden") {
            return None;
        }
        let name = object.get("name")?.as_str()?;

        let mut keys: Vec<&String> = object.keys().filter(|k| k.as_str() != "name").collect();
        keys.sort();

        let periods = keys
            .into_iter()
            .filter_map(|key| Period::from_value(key, &object[key.as_str()]))
            .collect();

        Some(Self::new(name, periods))
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("name".into(), Value::String(self.name.clone()));
        for period in &self.periods {
            object.insert(period.key.clone(), period.to_value());
        }
        Value::Object(object)
    }
}

/// All known schedules, keyed by schedule id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleTable {
    schedules: BTreeMap<String, Schedule>,
}

impl ScheduleTable {
    pub fn new(schedules: BTreeMap<String, Schedule>) -> Self {
        Self { schedules }
    }

    /// Builds the table from the dataset's schedules document.
    ///
    /// Malformed and hidden entries are dropped. Overlapping periods are
    /// kept but logged.
    pub fn from_value(value: &Value) -> Result<Self, LoadError> {
        let object = value.as_object().ok_or_else(|| {
            LoadError::shape(Document::ScheduleTable, "expected an object of schedules")
        })?;

        let schedules: BTreeMap<String, Schedule> = object
            .iter()
            .filter_map(|(id, entry)| Some((id.clone(), Schedule::from_value(entry)?)))
            .collect();

        for (id, schedule) in &schedules {
            for (a, b) in schedule.overlapping_periods() {
                warn!(
                    "schedule {id}: period {} ({}-{}) overlaps {} ({}-{})",
                    a.key, a.start_time, a.end_time, b.key, b.start_time, b.end_time
                );
            }
        }

        Ok(Self { schedules })
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| LoadError::missing(Document::ScheduleTable, e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.schedules
                .iter()
                .map(|(id, s)| (id.clone(), s.to_value()))
                .collect(),
        )
    }

    pub fn get(&self, id: &str) -> Option<&Schedule> {
        self.schedules.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.schedules.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Schedule)> {
        self.schedules.iter()
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}
