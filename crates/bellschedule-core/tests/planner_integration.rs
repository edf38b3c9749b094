//! Integration tests for reminder planning.
//!
//! Builds calendars through the public parsing API and checks the planner's
//! termination and ordering guarantees end to end.

use std::collections::BTreeMap;

use bellschedule_core::notifications::{EXHAUSTED_TITLE, NO_SCHEDULE_LIMIT, PLANNER_CAP};
use bellschedule_core::{
    apply_plan, Exhaustion, MemorySink, NotificationSettings, ScheduleCalendar, ScheduleTable,
    SymbolTable,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::{json, Map, Value};

fn enabled() -> NotificationSettings {
    NotificationSettings {
        enabled: true,
        ..Default::default()
    }
}

fn at(month: u32, day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// A ten-period schedule assigned to every day of September and October.
fn busy_calendar() -> ScheduleCalendar {
    let mut schedule = Map::new();
    schedule.insert("name".into(), json!("Busy"));
    for i in 0..10 {
        schedule.insert(
            format!("p{i}"),
            json!({
                "name": format!("Block {i}"),
                "start": format!("{:02}:00", 8 + i),
                "end": format!("{:02}:50", 8 + i),
            }),
        );
    }
    let table = ScheduleTable::from_value(&json!({ "busy": Value::Object(schedule) })).unwrap();

    let slots = |days: usize| {
        let mut s = vec![""; 32];
        for slot in s.iter_mut().take(days + 1).skip(1) {
            *slot = "busy";
        }
        s.join(",")
    };
    ScheduleCalendar::from_value(
        &json!({ "2024": { "09": slots(30), "10": slots(31) } }),
        table,
    )
    .unwrap()
}

#[test]
fn test_cap_bounds_the_plan() {
    let calendar = busy_calendar();
    let symbols = SymbolTable::default();
    let settings = enabled();

    let plan = bellschedule_core::plan_notifications(
        &calendar,
        &symbols,
        &settings,
        "",
        at(9, 1, 0, 0),
    );
    assert_eq!(plan.exhaustion, Exhaustion::CapReached);
    assert_eq!(plan.len(), PLANNER_CAP + 1);

    let last = plan.notifications.last().unwrap();
    assert_eq!(last.title, EXHAUSTED_TITLE);
    let before_last = &plan.notifications[PLANNER_CAP - 1];
    assert_eq!(
        last.firing_instant - before_last.firing_instant,
        Duration::seconds(5)
    );

    for pair in plan.notifications.windows(2) {
        assert!(pair[0].firing_instant < pair[1].firing_instant);
    }
}

#[test]
fn test_walk_stops_after_empty_week() {
    let table = ScheduleTable::from_value(&json!({
        "regular": {
            "name": "Regular",
            "p1": { "name": "First", "start": "08:00", "end": "08:55" },
        },
    }))
    .unwrap();
    // Schedules on the 2nd and on the 10th: the gap of seven empty days in
    // between ends the walk before the 10th is reached.
    let calendar = ScheduleCalendar::from_value(
        &json!({ "2024": { "09": ",,regular,,,,,,,,regular" } }),
        table,
    )
    .unwrap();
    let symbols = SymbolTable::default();
    let settings = enabled();

    let plan = bellschedule_core::plan_notifications(
        &calendar,
        &symbols,
        &settings,
        "",
        at(9, 1, 0, 0),
    );
    assert_eq!(NO_SCHEDULE_LIMIT, 7);
    assert_eq!(plan.exhaustion, Exhaustion::NoMoreData);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.notifications[0].firing_instant, at(9, 2, 8, 50));
}

#[test]
fn test_disabled_and_empty_calendar() {
    let calendar = busy_calendar();
    let symbols = SymbolTable::default();

    let plan = bellschedule_core::plan_notifications(
        &calendar,
        &symbols,
        &NotificationSettings::default(),
        "",
        at(9, 1, 0, 0),
    );
    assert_eq!(plan.exhaustion, Exhaustion::Disabled);
    assert!(plan.is_empty());

    let empty = ScheduleCalendar::new(ScheduleTable::new(BTreeMap::new()));
    let plan =
        bellschedule_core::plan_notifications(&empty, &symbols, &enabled(), "", at(9, 1, 0, 0));
    assert_eq!(plan.exhaustion, Exhaustion::NoMoreData);
    assert!(plan.is_empty());
}

#[test]
fn test_planning_is_deterministic_and_replaces_pending() {
    let calendar = busy_calendar();
    let symbols = SymbolTable::default();
    let settings = enabled();
    let now = at(9, 15, 9, 30);

    let first =
        bellschedule_core::plan_notifications(&calendar, &symbols, &settings, "", now);
    let second =
        bellschedule_core::plan_notifications(&calendar, &symbols, &settings, "", now);
    assert_eq!(first, second);
    assert!(first.notifications[0].firing_instant > now);

    let mut sink = MemorySink::new();
    apply_plan(&mut sink, &first).unwrap();
    apply_plan(&mut sink, &second).unwrap();
    assert_eq!(sink.pending(), first.notifications.as_slice());
}
