use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::db::KeyValueStore;
use crate::error::StorageError;
use crate::models::{Reminder, Task};

/// Loads and saves the whole task collection as one blob.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Never fails: missing or unusable data yields the seed collection.
    async fn load(&self) -> Vec<Task>;
    async fn save(&self, tasks: &[Task]) -> Result<(), StorageError>;
}

/// Stores the collection as a JSON array under a single key.
pub struct JsonTaskRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
    seed: Vec<Task>,
}

impl JsonTaskRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            seed: Vec::new(),
        }
    }

    /// Collection returned by `load` when nothing usable is stored.
    pub fn with_seed(mut self, seed: Vec<Task>) -> Self {
        self.seed = seed;
        self
    }
}

#[async_trait]
impl PersistenceAdapter for JsonTaskRepository {
    async fn load(&self) -> Vec<Task> {
        match self.store.get(&self.key).await {
            Ok(Some(raw)) => match decode(&raw) {
                Ok(tasks) => {
                    debug!("loaded {} tasks from {:?}", tasks.len(), self.key);
                    tasks
                }
                Err(e) => {
                    warn!("stored tasks under {:?} are unusable, using seed: {}", self.key, e);
                    self.seed.clone()
                }
            },
            Ok(None) => {
                debug!("no tasks stored under {:?}, using seed", self.key);
                self.seed.clone()
            }
            Err(e) => {
                error!("failed to read tasks under {:?}, using seed: {}", self.key, e);
                self.seed.clone()
            }
        }
    }

    async fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(tasks)?;
        self.store.set(&self.key, &raw).await
    }
}

/// Parses a stored blob and re-establishes the record invariants. Records
/// whose text is blank are dropped.
pub fn decode(raw: &str) -> Result<Vec<Task>, StorageError> {
    let mut tasks: Vec<Task> = serde_json::from_str(raw)?;

    tasks.retain_mut(|task| {
        let trimmed = task.text.trim();
        if trimmed.is_empty() {
            warn!("dropping task {} with empty text", task.id);
            return false;
        }
        if trimmed.len() != task.text.len() {
            task.text = trimmed.to_string();
        }
        true
    });

    let mut seen = HashSet::new();
    for task in &mut tasks {
        if !seen.insert(task.id) {
            return Err(StorageError::Malformed(format!("duplicate task id {}", task.id)));
        }
        task.reminder = task.reminder.take().and_then(|reminder| {
            Reminder::normalize(reminder.date(), reminder.time()).unwrap_or_else(|e| {
                warn!("dropping reminder of task {}: {}", task.id, e);
                None
            })
        });
    }

    Ok(tasks)
}
