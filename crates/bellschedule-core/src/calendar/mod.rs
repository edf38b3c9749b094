//! Schedule calendar: which schedule runs on which date.
//!
//! The serialized form groups days by year and month, with each month stored
//! as a comma-joined list of 32 slots indexed by day of month (slot 0 unused):
//!
//! ```json
//! { "2024": { "09": ",,,regular,regular,late,,..." } }
//! ```

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::{Document, LoadError};
use crate::schedule::{Period, Schedule, ScheduleTable};

const MONTH_SLOTS: usize = 32;

/// Parses a `year/month/day` key. Zero-padding is optional.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let mut parts = key.split('/');
    let year = parts.next()?.trim().parse().ok()?;
    let month = parts.next()?.trim().parse().ok()?;
    let day = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Formats `date` as an unpadded `year/month/day` key.
pub fn date_key(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}

/// Date to schedule-id assignment over a [`ScheduleTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleCalendar {
    schedule_table: ScheduleTable,
    days: BTreeMap<NaiveDate, String>,
}

impl ScheduleCalendar {
    pub fn new(schedule_table: ScheduleTable) -> Self {
        Self {
            schedule_table,
            days: BTreeMap::new(),
        }
    }

    /// Builds a calendar from the dataset's calendar document.
    ///
    /// Empty slots, impossible dates and ids missing from `schedule_table`
    /// are skipped. The top-level `bounds` entry is metadata and ignored.
    pub fn from_value(value: &Value, schedule_table: ScheduleTable) -> Result<Self, LoadError> {
        let years = value.as_object().ok_or_else(|| {
            LoadError::shape(Document::Calendar, "expected an object keyed by year")
        })?;

        let mut calendar = Self::new(schedule_table);
        for (year, months) in years {
            if year == "bounds" {
                continue;
            }
            let (Ok(year), Some(months)) = (year.trim().parse::<i32>(), months.as_object()) else {
                continue;
            };
            for (month, slots) in months {
                let (Ok(month), Some(slots)) = (month.trim().parse::<u32>(), slots.as_str()) else {
                    continue;
                };
                for (day, id) in slots.split(',').enumerate() {
                    if id.is_empty() || !calendar.schedule_table.contains(id) {
                        continue;
                    }
                    let Some(date) = u32::try_from(day)
                        .ok()
                        .and_then(|d| NaiveDate::from_ymd_opt(year, month, d))
                    else {
                        continue;
                    };
                    calendar.days.insert(date, id.to_string());
                }
            }
        }
        Ok(calendar)
    }

    pub fn from_json(json: &str, schedule_table: ScheduleTable) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| LoadError::missing(Document::Calendar, e.to_string()))?;
        Self::from_value(&value, schedule_table)
    }

    /// Serializes back to the year/month slot form.
    pub fn to_value(&self) -> Value {
        let mut grouped: BTreeMap<i32, BTreeMap<u32, Vec<&str>>> = BTreeMap::new();
        for (date, id) in &self.days {
            let slots = grouped
                .entry(date.year())
                .or_default()
                .entry(date.month())
                .or_insert_with(|| vec![""; MONTH_SLOTS]);
            slots[date.day() as usize] = id.as_str();
        }

        let years: Map<String, Value> = grouped
            .into_iter()
            .map(|(year, months)| {
                let months: Map<String, Value> = months
                    .into_iter()
                    .map(|(month, slots)| (format!("{month:02}"), Value::String(slots.join(","))))
                    .collect();
                (year.to_string(), Value::Object(months))
            })
            .collect();
        Value::Object(years)
    }

    pub fn schedule_table(&self) -> &ScheduleTable {
        &self.schedule_table
    }

    /// Assigns `schedule_id` to `date`. Returns false when the id is unknown.
    pub fn assign(&mut self, date: NaiveDate, schedule_id: impl Into<String>) -> bool {
        let schedule_id = schedule_id.into();
        if !self.schedule_table.contains(&schedule_id) {
            return false;
        }
        self.days.insert(date, schedule_id);
        true
    }

    pub fn schedule_id_for(&self, date: NaiveDate) -> Option<&str> {
        self.days.get(&date).map(String::as_str)
    }

    /// The schedule running on `date`, if any.
    pub fn schedule_for(&self, date: NaiveDate) -> Option<&Schedule> {
        self.schedule_table.get(self.days.get(&date)?)
    }

    /// Looks a date up by its `year/month/day` key.
    pub fn schedule_for_key(&self, key: &str) -> Option<&Schedule> {
        self.schedule_for(parse_date_key(key)?)
    }

    pub fn current_schedule(&self, now: &NaiveDateTime) -> Option<&Schedule> {
        self.schedule_for(now.date())
    }

    pub fn current_period(&self, now: &NaiveDateTime) -> Option<&Period> {
        self.current_schedule(now)?.current_period(now)
    }

    /// Day of month to schedule id for every assigned day in the month.
    pub fn month_schedule(&self, year: i32, month: u32) -> BTreeMap<u32, String> {
        self.days
            .iter()
            .filter(|(date, _)| date.year() == year && date.month() == month)
            .map(|(date, id)| (date.day(), id.clone()))
            .collect()
    }

    /// Assigned dates in ascending order.
    pub fn days(&self) -> impl Iterator<Item = (&NaiveDate, &String)> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
