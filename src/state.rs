use std::sync::Arc;

use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::db::{KeyValueStore, MemoryStore, SqliteStore};
use crate::error::{StorageError, TrackerError};
use crate::models::Task;
use crate::repository::JsonTaskRepository;
use crate::services::{
    FilterCriterion, Notifier, ReminderScheduler, TaskStats, TaskStore, filter_tasks,
    upcoming_reminders,
};

/// A task store wired to its storage backend, plus read-side helpers for the
/// presentation layer.
#[derive(Clone)]
pub struct Tracker {
    pub store: TaskStore,
    pub config: TrackerConfig,
    clock: Arc<dyn Clock>,
}

impl Tracker {
    /// Configuration from the environment and the host's local clock.
    pub async fn from_env() -> Result<Self, TrackerError> {
        let config = TrackerConfig::from_env()?;
        Ok(Self::open(config, Arc::new(SystemClock)).await?)
    }

    /// Opens SQLite storage when `database_url` is set, memory otherwise.
    pub async fn open(config: TrackerConfig, clock: Arc<dyn Clock>) -> Result<Self, StorageError> {
        let kv: Arc<dyn KeyValueStore> = match &config.database_url {
            Some(url) => Arc::new(SqliteStore::connect(url).await?),
            None => {
                info!("no DATABASE_URL configured, keeping tasks in memory");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Self::with_backend(config, clock, kv).await)
    }

    pub async fn with_backend(
        config: TrackerConfig,
        clock: Arc<dyn Clock>,
        kv: Arc<dyn KeyValueStore>,
    ) -> Self {
        let seed = if config.seed_on_empty {
            Task::samples(clock.now())
        } else {
            Vec::new()
        };
        let repository = JsonTaskRepository::new(kv, config.storage_key.clone()).with_seed(seed);
        let store = TaskStore::open(Arc::new(repository), clock.clone(), config.removal_delay).await;

        Self {
            store,
            config,
            clock,
        }
    }

    pub fn filtered(&self, criterion: &FilterCriterion) -> Vec<Task> {
        filter_tasks(&self.store.snapshot(), criterion)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.store.snapshot())
    }

    pub fn upcoming_reminders(&self) -> Vec<Task> {
        upcoming_reminders(&self.store.snapshot(), self.config.upcoming_limit)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn reminder_scheduler(&self, notifier: Arc<dyn Notifier>) -> ReminderScheduler {
        ReminderScheduler::new(
            self.store.clone(),
            notifier,
            self.clock.clone(),
            self.config.reminder_interval,
        )
    }
}
