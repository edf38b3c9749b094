//! Loaded dataset snapshot and "what's happening now" queries.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::ScheduleCalendar;
use crate::clock::ClockTime;
use crate::dataset::Dataset;
use crate::error::LoadError;
use crate::notifications::{NotificationPlan, NotificationPlanner, NotificationSettings};
use crate::schedule::ScheduleTable;
use crate::symbol::SymbolTable;

/// Where a [`Context`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextOrigin {
    Network,
    Cache,
}

/// Everything the engine needs to answer queries: calendar, symbols, and the
/// zero-period marker, plus provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub calendar: ScheduleCalendar,
    pub symbol_table: SymbolTable,
    pub origin: ContextOrigin,
    /// When this data was fetched from its source. A cached context keeps
    /// the time of the fetch that produced the snapshot.
    pub last_updated: DateTime<Utc>,
    pub zero_period_marker: String,
}

/// Live status at an instant, as shown by a countdown display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveStatus {
    /// No schedule runs today.
    NoSchedule,
    /// A schedule runs today but no period is active.
    NoClass { schedule_name: String },
    InPeriod {
        schedule_name: String,
        period_key: String,
        /// Rendered period name.
        name: String,
        start: ClockTime,
        end: ClockTime,
        remaining: Duration,
    },
}

impl Context {
    /// Builds a network-origin context from a dataset fetched at
    /// `fetched_at` and re-applies the user's stored overrides.
    pub fn from_dataset(
        dataset: &Dataset,
        overrides: &BTreeMap<String, String>,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, LoadError> {
        let schedule_table = ScheduleTable::from_value(&dataset.schedule_table)?;
        let calendar = ScheduleCalendar::from_value(&dataset.calendar, schedule_table)?;
        let mut symbol_table = SymbolTable::from_value(&dataset.symbols)?;
        symbol_table.register_overrides(overrides);

        Ok(Self {
            calendar,
            symbol_table,
            origin: ContextOrigin::Network,
            last_updated: fetched_at,
            zero_period_marker: dataset.zero_period_marker.clone(),
        })
    }

    pub fn status_at(&self, now: &NaiveDateTime) -> LiveStatus {
        let Some(schedule) = self.calendar.current_schedule(now) else {
            return LiveStatus::NoSchedule;
        };
        let schedule_name = schedule.display_name();
        let Some(period) = schedule.current_period(now) else {
            return LiveStatus::NoClass { schedule_name };
        };

        let remaining = period.end_time.on(now.date()) - *now;
        LiveStatus::InPeriod {
            schedule_name,
            period_key: period.key.clone(),
            name: self.symbol_table.render(&period.name),
            start: period.start_time,
            end: period.end_time,
            remaining: remaining.max(Duration::zero()),
        }
    }

    pub fn planner<'a>(&'a self, settings: &'a NotificationSettings) -> NotificationPlanner<'a> {
        NotificationPlanner::new(
            &self.calendar,
            &self.symbol_table,
            settings,
            &self.zero_period_marker,
        )
    }

    pub fn plan_notifications(
        &self,
        settings: &NotificationSettings,
        now: NaiveDateTime,
    ) -> NotificationPlan {
        self.planner(settings).plan(now)
    }
}

/// Renders a countdown as `h:mm:ss`, or `mm:ss` under an hour.
pub fn format_countdown(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn dataset() -> Dataset {
        Dataset {
            schedule_table: json!({
                "regular": {
                    "name": "!1 Regular",
                    "p1": { "name": "$(per1)", "start": "08:00", "end": "08:55" },
                    "p2": { "name": "Passing Period", "start": "08:55", "end": "09:00" },
                },
            }),
            calendar: json!({ "2024": { "9": ",,,regular" } }),
            symbols: json!({ "per1": { "configurable": true, "value": "Period 1" } }),
            zero_period_marker: "$(per0)".into(),
            last_modified: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    fn fetched() -> DateTime<Utc> {
        DateTime::from_timestamp(1_800_000_000, 0).unwrap()
    }

    fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn from_dataset_applies_overrides() {
        let overrides = BTreeMap::from([("per1".to_string(), "Chem".to_string())]);
        let ctx = Context::from_dataset(&dataset(), &overrides, fetched()).unwrap();
        assert_eq!(ctx.origin, ContextOrigin::Network);
        assert_eq!(ctx.last_updated, fetched());
        assert_eq!(ctx.symbol_table.render("$(per1)"), "Chem");
        assert_eq!(ctx.calendar.len(), 1);
    }

    #[test]
    fn from_dataset_rejects_bad_shape() {
        let mut bad = dataset();
        bad.calendar = json!("nope");
        let err = Context::from_dataset(&bad, &BTreeMap::new(), fetched()).unwrap_err();
        assert!(matches!(err, LoadError::UnexpectedShape { .. }));
    }

    #[test]
    fn status_reports_period_and_remaining_time() {
        let ctx = Context::from_dataset(&dataset(), &BTreeMap::new(), fetched()).unwrap();

        match ctx.status_at(&at(3, 8, 50, 30)) {
            LiveStatus::InPeriod {
                schedule_name,
                name,
                remaining,
                ..
            } => {
                assert_eq!(schedule_name, "Regular");
                assert_eq!(name, "Period 1");
                assert_eq!(remaining, Duration::seconds(270));
            }
            other => panic!("unexpected status: {other:?}"),
        }

        assert_eq!(
            ctx.status_at(&at(3, 12, 0, 0)),
            LiveStatus::NoClass {
                schedule_name: "Regular".into()
            }
        );
        assert_eq!(ctx.status_at(&at(4, 8, 30, 0)), LiveStatus::NoSchedule);
    }

    #[test]
    fn countdown_formatting() {
        assert_eq!(format_countdown(Duration::seconds(270)), "04:30");
        assert_eq!(format_countdown(Duration::seconds(3725)), "1:02:05");
        assert_eq!(format_countdown(Duration::seconds(-5)), "00:00");
    }
}
