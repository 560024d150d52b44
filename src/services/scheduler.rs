use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::models::{Reminder, Task, TaskId};
use crate::services::notifier::Notifier;
use crate::services::store::TaskStore;

/// A reminder that matched the current minute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder {
    pub id: TaskId,
    pub message: String,
}

/// Shortest interval the loop accepts.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically checks reminders against the clock.
///
/// Matching is exact to the minute and nothing is marked as fired: a tick
/// that misses the reminder's minute (process suspended, interval longer
/// than a minute) means that reminder never fires.
pub struct ReminderScheduler {
    store: TaskStore,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ReminderScheduler {
    pub fn new(
        store: TaskStore,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            interval,
        }
    }

    /// Runs one check and notifies once per due task.
    pub async fn tick(&self) -> Vec<DueReminder> {
        let now = self.clock.now();
        let due = due_reminders(&self.store.snapshot(), now);

        for reminder in &due {
            info!("reminder due for task {}", reminder.id);
            self.notifier.notify(&reminder.message).await;
        }
        due
    }

    /// Checks forever, first check one interval after start. Checks stay on
    /// a fixed schedule however long notifications take; a check that falls
    /// behind is skipped rather than bunched up.
    pub async fn start(self) {
        let period = if self.interval < MIN_INTERVAL {
            warn!("reminder interval {:?} too short, using {:?}", self.interval, MIN_INTERVAL);
            MIN_INTERVAL
        } else {
            self.interval
        };
        info!("Starting reminder scheduler (interval: {:?})", period);

        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let fired = self.tick().await;
            debug!("reminder tick fired {} notifications", fired.len());
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.start())
    }
}

/// Active tasks whose reminder falls on the minute of `now`.
pub fn due_reminders(tasks: &[Task], now: NaiveDateTime) -> Vec<DueReminder> {
    tasks
        .iter()
        .filter(|task| !task.completed)
        .filter(|task| task.reminder.as_ref().is_some_and(|r| r.is_due_at(now)))
        .map(|task| DueReminder {
            id: task.id,
            message: format!("Reminder: {}", task.text),
        })
        .collect()
}

/// The `limit` earliest reminders of active tasks. Ties keep collection order.
pub fn upcoming_reminders(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut upcoming: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.reminder.is_some() && !task.completed)
        .collect();
    upcoming.sort_by(|a, b| reminder_key(a).cmp(&reminder_key(b)));
    upcoming.truncate(limit);
    upcoming
}

fn reminder_key(task: &Task) -> Option<(&str, &str)> {
    task.reminder.as_ref().map(Reminder::sort_key)
}
