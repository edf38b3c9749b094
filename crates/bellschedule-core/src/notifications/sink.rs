//! Delivery sinks for planned reminders.
//!
//! A sink only needs to clear what it holds and accept new reminders. How a
//! reminder actually fires is up to the sink's owner.

use std::path::{Path, PathBuf};

use super::planner::{NotificationPlan, PlannedNotification};
use crate::error::Result;

pub trait NotificationSink {
    /// Drop every pending and delivered reminder.
    fn clear_all(&mut self) -> Result<()>;

    /// Queue one reminder.
    fn enqueue(&mut self, notification: &PlannedNotification) -> Result<()>;
}

/// Replaces whatever `sink` holds with `plan`.
///
/// If this is interrupted, re-planning and applying again restores the same
/// state. Returns the number of reminders enqueued.
pub fn apply_plan<S>(sink: &mut S, plan: &NotificationPlan) -> Result<usize>
where
    S: NotificationSink + ?Sized,
{
    sink.clear_all()?;
    for notification in &plan.notifications {
        sink.enqueue(notification)?;
    }
    Ok(plan.notifications.len())
}

/// In-memory sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    pending: Vec<PlannedNotification>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[PlannedNotification] {
        &self.pending
    }
}

impl NotificationSink for MemorySink {
    fn clear_all(&mut self) -> Result<()> {
        self.pending.clear();
        Ok(())
    }

    fn enqueue(&mut self, notification: &PlannedNotification) -> Result<()> {
        self.pending.push(notification.clone());
        Ok(())
    }
}

/// Sink that keeps pending reminders in a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the pending reminders. A missing file means none.
    pub fn pending(&self) -> Result<Vec<PlannedNotification>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, pending: &[PlannedNotification]) -> Result<()> {
        let content = serde_json::to_string_pretty(pending)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl NotificationSink for JsonFileSink {
    fn clear_all(&mut self) -> Result<()> {
        self.write(&[])
    }

    fn enqueue(&mut self, notification: &PlannedNotification) -> Result<()> {
        let mut pending = self.pending()?;
        pending.push(notification.clone());
        self.write(&pending)
    }
}
