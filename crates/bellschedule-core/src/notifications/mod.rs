mod planner;
mod settings;
mod sink;

pub use planner::{
    plan_notifications, Exhaustion, NotificationPlan, NotificationPlanner, PlannedNotification,
    EXHAUSTED_BODY, EXHAUSTED_TITLE, NO_SCHEDULE_LIMIT, PASSING_PERIOD, PLANNER_CAP,
};
pub use settings::NotificationSettings;
pub use sink::{apply_plan, JsonFileSink, MemorySink, NotificationSink};
