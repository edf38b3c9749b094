//! Reminder planning.
//!
//! The planner walks forward one calendar day at a time from `now`, emitting a
//! "period is ending soon" reminder for each eligible period. Delivery
//! backends cap how many reminders may be pending, so the walk stops at
//! [`PLANNER_CAP`] and appends a final reminder telling the user to reopen
//! the app. A run of [`NO_SCHEDULE_LIMIT`] consecutive days without a schedule
//! ends the walk without that final reminder.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

use super::settings::NotificationSettings;
use crate::calendar::ScheduleCalendar;
use crate::schedule::Period;
use crate::symbol::SymbolTable;

/// Maximum number of period reminders in one plan.
pub const PLANNER_CAP: usize = 62;
/// Consecutive schedule-less days after which the walk gives up.
pub const NO_SCHEDULE_LIMIT: u32 = 7;
/// Rendered period name that never gets a reminder.
pub const PASSING_PERIOD: &str = "Passing Period";
pub const EXHAUSTED_TITLE: &str = "Notifications exhausted";
pub const EXHAUSTED_BODY: &str =
    "Reminders have run out. Open Bell Schedule again to schedule more.";

/// A reminder to deliver at a wall-clock instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedNotification {
    pub firing_instant: NaiveDateTime,
    pub title: String,
    pub body: String,
}

/// Why the walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exhaustion {
    /// Notifications are turned off; no walk happened.
    Disabled,
    /// The cap was hit; the plan ends with the exhausted reminder.
    CapReached,
    /// Too many consecutive days had no schedule.
    NoMoreData,
}

/// Output of one planning pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPlan {
    pub notifications: Vec<PlannedNotification>,
    pub exhaustion: Exhaustion,
}

impl NotificationPlan {
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }
}

/// Plans reminders over borrowed, immutable inputs.
#[derive(Debug, Clone, Copy)]
pub struct NotificationPlanner<'a> {
    calendar: &'a ScheduleCalendar,
    symbols: &'a SymbolTable,
    settings: &'a NotificationSettings,
    zero_period_marker: &'a str,
    cap: usize,
}

impl<'a> NotificationPlanner<'a> {
    pub fn new(
        calendar: &'a ScheduleCalendar,
        symbols: &'a SymbolTable,
        settings: &'a NotificationSettings,
        zero_period_marker: &'a str,
    ) -> Self {
        Self {
            calendar,
            symbols,
            settings,
            zero_period_marker,
            cap: PLANNER_CAP,
        }
    }

    /// Overrides the reminder cap. A cap below 1 is treated as 1.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap.max(1);
        self
    }

    /// Produces the plan for `now`. Identical inputs give identical plans.
    pub fn plan(&self, now: NaiveDateTime) -> NotificationPlan {
        if !self.settings.enabled {
            return NotificationPlan {
                notifications: Vec::new(),
                exhaustion: Exhaustion::Disabled,
            };
        }

        let lead = self.settings.lead_time();
        let mut notifications = Vec::new();
        let mut day = now.date();
        let mut days_without_schedule = 0;

        let exhaustion = 'walk: loop {
            match self.calendar.schedule_for(day) {
                Some(schedule) => {
                    days_without_schedule = 0;
                    for period in &schedule.periods {
                        let Some(notification) = self.reminder_for(period, day, lead, now) else {
                            continue;
                        };
                        notifications.push(notification);
                        if notifications.len() >= self.cap {
                            break 'walk Exhaustion::CapReached;
                        }
                    }
                }
                None => {
                    days_without_schedule += 1;
                    if days_without_schedule >= NO_SCHEDULE_LIMIT {
                        break Exhaustion::NoMoreData;
                    }
                }
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break Exhaustion::NoMoreData,
            }
        };

        notifications.sort_by_key(|n| n.firing_instant);

        if exhaustion == Exhaustion::CapReached {
            if let Some(last) = notifications.last().map(|n| n.firing_instant) {
                notifications.push(PlannedNotification {
                    firing_instant: last + Duration::seconds(5),
                    title: EXHAUSTED_TITLE.to_string(),
                    body: EXHAUSTED_BODY.to_string(),
                });
            }
        }

        debug!(
            "planned {} reminder(s) from {now}, stopped: {exhaustion:?}",
            notifications.len()
        );
        NotificationPlan {
            notifications,
            exhaustion,
        }
    }

    fn reminder_for(
        &self,
        period: &Period,
        day: NaiveDate,
        lead: Duration,
        now: NaiveDateTime,
    ) -> Option<PlannedNotification> {
        let name = self.symbols.render(&period.name);
        if name == PASSING_PERIOD {
            return None;
        }
        if self.settings.skip_zero_period
            && !self.zero_period_marker.is_empty()
            && period.name.contains(self.zero_period_marker)
        {
            debug!("skipping zero period {} on {day}", period.key);
            return None;
        }

        let notify_at = period.end_time.on(day).checked_sub_signed(lead)?;
        if notify_at <= period.start_time.on(day) || notify_at <= now {
            return None;
        }

        Some(PlannedNotification {
            firing_instant: notify_at,
            title: format!("{name} is ending soon"),
            body: remaining_body(lead),
        })
    }
}

/// Convenience wrapper around [`NotificationPlanner::plan`].
pub fn plan_notifications(
    calendar: &ScheduleCalendar,
    symbols: &SymbolTable,
    settings: &NotificationSettings,
    zero_period_marker: &str,
    now: NaiveDateTime,
) -> NotificationPlan {
    NotificationPlanner::new(calendar, symbols, settings, zero_period_marker).plan(now)
}

fn remaining_body(lead: Duration) -> String {
    let secs = lead.num_seconds();
    if secs < 60 {
        return format!("{secs} seconds remain.");
    }
    match secs / 60 {
        1 => "1 minute remains.".to_string(),
        mins => format!("{mins} minutes remain."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockTime;
    use crate::schedule::{Schedule, ScheduleTable};
    use crate::symbol::Symbol;
    use std::collections::BTreeMap;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn period(key: &str, name: &str, start: &str, end: &str) -> Period {
        Period::new(key, name, ClockTime::parse(start), ClockTime::parse(end))
    }

    fn single_day(periods: Vec<Period>) -> ScheduleCalendar {
        let table = ScheduleTable::new(BTreeMap::from([(
            "day".to_string(),
            Schedule::new("Day", periods),
        )]));
        let mut calendar = ScheduleCalendar::new(table);
        calendar.assign(date(2), "day");
        calendar
    }

    fn enabled(lead: f64) -> NotificationSettings {
        NotificationSettings {
            enabled: true,
            skip_zero_period: false,
            lead_time_minutes: lead,
        }
    }

    fn early() -> NaiveDateTime {
        date(2).and_hms_opt(6, 0, 0).unwrap()
    }

    #[test]
    fn body_wording() {
        assert_eq!(remaining_body(Duration::seconds(30)), "30 seconds remain.");
        assert_eq!(remaining_body(Duration::minutes(1)), "1 minute remains.");
        assert_eq!(remaining_body(Duration::minutes(5)), "5 minutes remain.");
    }

    #[test]
    fn renders_title_from_symbols() {
        let calendar = single_day(vec![period("p1", "$(per1)", "08:00", "08:55")]);
        let symbols = SymbolTable::new([Symbol::new("per1", "Period 1", true)]);
        let plan = plan_notifications(&calendar, &symbols, &enabled(5.0), "", early());

        assert_eq!(plan.exhaustion, Exhaustion::NoMoreData);
        assert_eq!(plan.len(), 1);
        let n = &plan.notifications[0];
        assert_eq!(n.title, "Period 1 is ending soon");
        assert_eq!(n.body, "5 minutes remain.");
        assert_eq!(n.firing_instant, date(2).and_hms_opt(8, 50, 0).unwrap());
    }

    #[test]
    fn passing_periods_are_skipped() {
        let calendar = single_day(vec![
            period("p1", "$(pass)", "08:55", "09:00"),
            period("p2", "Passing Period", "09:55", "10:05"),
            period("p3", "Math", "10:05", "11:00"),
        ]);
        let symbols = SymbolTable::new([Symbol::new("pass", "Passing Period", false)]);
        let plan = plan_notifications(&calendar, &symbols, &enabled(1.0), "", early());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.notifications[0].title, "Math is ending soon");
    }

    #[test]
    fn zero_period_skipped_only_when_requested() {
        let calendar = single_day(vec![
            period("p0", "$(per0) Zero", "07:00", "07:55"),
            period("p1", "First", "08:00", "08:55"),
        ]);
        let symbols = SymbolTable::default();
        let mut settings = enabled(5.0);

        let plan = plan_notifications(&calendar, &symbols, &settings, "$(per0)", early());
        assert_eq!(plan.len(), 2);

        settings.skip_zero_period = true;
        let plan = plan_notifications(&calendar, &symbols, &settings, "$(per0)", early());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.notifications[0].title, "First is ending soon");

        let plan = plan_notifications(&calendar, &symbols, &settings, "", early());
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn lead_time_equal_to_period_length_is_excluded() {
        let calendar = single_day(vec![period("p1", "Short", "08:00", "08:05")]);
        let symbols = SymbolTable::default();

        let plan = plan_notifications(&calendar, &symbols, &enabled(5.0), "", early());
        assert!(plan.is_empty());

        let plan = plan_notifications(&calendar, &symbols, &enabled(5.0 - 1.0 / 60.0), "", early());
        assert_eq!(plan.len(), 1);
        assert_eq!(
            plan.notifications[0].firing_instant,
            date(2).and_hms_opt(8, 0, 1).unwrap()
        );
    }

    #[test]
    fn oversized_lead_time_excludes_every_period() {
        let calendar = single_day(vec![period("p1", "First", "08:00", "08:55")]);
        let symbols = SymbolTable::default();
        let plan = plan_notifications(&calendar, &symbols, &enabled(1e12), "", early());
        assert!(plan.is_empty());
        assert_eq!(plan.exhaustion, Exhaustion::NoMoreData);

        let huge = Duration::days(365 * 1_000_000);
        let settings = enabled(5.0);
        let planner = NotificationPlanner::new(&calendar, &symbols, &settings, "");
        let first = &calendar.schedule_for(date(2)).unwrap().periods[0];
        assert!(planner.reminder_for(first, date(2), huge, early()).is_none());
    }

    #[test]
    fn reminders_in_the_past_are_dropped() {
        let calendar = single_day(vec![
            period("p1", "First", "08:00", "08:55"),
            period("p2", "Second", "09:00", "09:55"),
        ]);
        let symbols = SymbolTable::default();
        let now = date(2).and_hms_opt(8, 50, 0).unwrap();
        let plan = plan_notifications(&calendar, &symbols, &enabled(5.0), "", now);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.notifications[0].title, "Second is ending soon");
    }

    #[test]
    fn cap_appends_exhausted_reminder() {
        let calendar = single_day(vec![
            period("p1", "First", "08:00", "08:55"),
            period("p2", "Second", "09:00", "09:55"),
            period("p3", "Third", "10:00", "10:55"),
        ]);
        let symbols = SymbolTable::default();
        let plan = NotificationPlanner::new(&calendar, &symbols, &enabled(5.0), "")
            .with_cap(2)
            .plan(early());

        assert_eq!(plan.exhaustion, Exhaustion::CapReached);
        assert_eq!(plan.len(), 3);
        let last = &plan.notifications[2];
        assert_eq!(last.title, EXHAUSTED_TITLE);
        assert_eq!(
            last.firing_instant,
            plan.notifications[1].firing_instant + Duration::seconds(5)
        );
    }

    #[test]
    fn disabled_settings_plan_nothing() {
        let calendar = single_day(vec![period("p1", "First", "08:00", "08:55")]);
        let plan = plan_notifications(
            &calendar,
            &SymbolTable::default(),
            &NotificationSettings::default(),
            "",
            early(),
        );
        assert!(plan.is_empty());
        assert_eq!(plan.exhaustion, Exhaustion::Disabled);
    }
}
