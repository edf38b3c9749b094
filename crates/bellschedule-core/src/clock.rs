//! Wall-clock time-of-day values used for period boundaries.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Hour convention used when rendering a [`ClockTime`] for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HourCycle {
    /// `h:mm AM/PM`
    #[default]
    #[serde(rename = "12h")]
    H12,
    /// `HH:MM`
    #[serde(rename = "24h")]
    H24,
}

/// An hour:minute time of day with no date attached.
///
/// Ordering is the natural order within a single day; there is no notion of
/// a time crossing midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime { hour: 0, minute: 0 };

    /// Builds a time, returning `None` when the components are out of range.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Parses `HH:MM`. Never fails.
    ///
    /// Splits on the first `:`. A component that is not a number reads as 0,
    /// and a result outside a valid time of day becomes `00:00`.
    pub fn parse(s: &str) -> Self {
        let (hour, minute) = match s.split_once(':') {
            Some((h, m)) => (h, m),
            None => (s, ""),
        };
        let hour = hour.trim().parse::<i64>().unwrap_or(0);
        let minute = minute.trim().parse::<i64>().unwrap_or(0);

        match (u32::try_from(hour), u32::try_from(minute)) {
            (Ok(h), Ok(m)) => Self::new(h, m).unwrap_or(Self::MIDNIGHT),
            _ => Self::MIDNIGHT,
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Truncates an instant to its hour and minute.
    pub fn of(instant: &NaiveDateTime) -> Self {
        Self {
            hour: instant.hour(),
            minute: instant.minute(),
        }
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Projects this time onto `date`.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.to_naive_time())
    }

    /// Renders for display using the given hour convention.
    pub fn format(&self, cycle: HourCycle) -> String {
        match cycle {
            HourCycle::H24 => format!("{:02}:{:02}", self.hour, self.minute),
            HourCycle::H12 => {
                let suffix = if self.hour < 12 { "AM" } else { "PM" };
                let hour = match self.hour % 12 {
                    0 => 12,
                    h => h,
                };
                format!("{hour}:{:02} {suffix}", self.minute)
            }
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl From<String> for ClockTime {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_well_formed_times() {
        assert_eq!(ClockTime::parse("08:55"), ClockTime::new(8, 55).unwrap());
        assert_eq!(ClockTime::parse("8:05"), ClockTime::new(8, 5).unwrap());
        assert_eq!(ClockTime::parse("23:59"), ClockTime::new(23, 59).unwrap());
    }

    #[test]
    fn non_numeric_components_read_as_zero() {
        assert_eq!(ClockTime::parse("ab:30"), ClockTime::new(0, 30).unwrap());
        assert_eq!(ClockTime::parse("14:xx"), ClockTime::new(14, 0).unwrap());
        assert_eq!(ClockTime::parse("9"), ClockTime::new(9, 0).unwrap());
        assert_eq!(ClockTime::parse(""), ClockTime::MIDNIGHT);
    }

    #[test]
    fn out_of_range_becomes_midnight() {
        assert_eq!(ClockTime::parse("25:00"), ClockTime::MIDNIGHT);
        assert_eq!(ClockTime::parse("10:75"), ClockTime::MIDNIGHT);
        assert_eq!(ClockTime::parse("-1:10"), ClockTime::MIDNIGHT);
    }

    #[test]
    fn formats_both_hour_cycles() {
        let t = ClockTime::new(13, 5).unwrap();
        assert_eq!(t.format(HourCycle::H24), "13:05");
        assert_eq!(t.format(HourCycle::H12), "1:05 PM");
        assert_eq!(ClockTime::MIDNIGHT.format(HourCycle::H12), "12:00 AM");
        assert_eq!(ClockTime::new(12, 0).unwrap().format(HourCycle::H12), "12:00 PM");
    }

    #[test]
    fn serde_uses_text_form() {
        let t = ClockTime::new(7, 30).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:30\"");
        let parsed: ClockTime = serde_json::from_str("\"7:30\"").unwrap();
        assert_eq!(parsed, t);
    }

    proptest! {
        #[test]
        fn order_matches_minutes_since_midnight(
            h1 in 0u32..24,
            m1 in 0u32..60,
            h2 in 0u32..24,
            m2 in 0u32..60,
        ) {
            let a = ClockTime::new(h1, m1).unwrap();
            let b = ClockTime::new(h2, m2).unwrap();
            prop_assert_eq!(a.cmp(&b), (h1 * 60 + m1).cmp(&(h2 * 60 + m2)));
            prop_assert_eq!(a.cmp(&b), a.to_naive_time().cmp(&b.to_naive_time()));
        }

        #[test]
        fn display_round_trips(h in 0u32..24, m in 0u32..60) {
            let t = ClockTime::new(h, m).unwrap();
            prop_assert_eq!(ClockTime::parse(&t.to_string()), t);
        }
    }
}
