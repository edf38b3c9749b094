use chrono::Duration;
use serde::{Deserialize, Serialize};

/// User preferences for period-ending reminders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Skip periods whose name contains the dataset's zero-period marker.
    #[serde(default)]
    pub skip_zero_period: bool,
    /// Minutes before a period ends at which the reminder fires.
    #[serde(default = "default_lead_time_minutes")]
    pub lead_time_minutes: f64,
}

const MAX_LEAD_TIME_MINUTES: f64 = 24.0 * 60.0;

fn default_lead_time_minutes() -> f64 {
    5.0
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            skip_zero_period: false,
            lead_time_minutes: default_lead_time_minutes(),
        }
    }
}

impl NotificationSettings {
    /// Lead time as a duration, rounded to the millisecond.
    ///
    /// Negative or non-finite values read as zero; anything longer than a day
    /// reads as one day.
    pub fn lead_time(&self) -> Duration {
        if !self.lead_time_minutes.is_finite() || self.lead_time_minutes <= 0.0 {
            return Duration::zero();
        }
        let minutes = self.lead_time_minutes.min(MAX_LEAD_TIME_MINUTES);
        Duration::milliseconds((minutes * 60_000.0).round() as i64)
    }
}
