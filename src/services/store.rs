use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{StorageError, TaskError};
use crate::models::{Task, TaskEdit, TaskEntry, TaskId};
use crate::repository::PersistenceAdapter;
use crate::services::writer::{PersistenceEvent, PersistenceWriter};

/// Owner of the task collection and the only writer to persistence.
///
/// Clones share the same collection. Every mutation is applied under a
/// single write lock and its save is issued before the lock is released, so
/// saves land in mutation order.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: RwLock<State>,
    clock: Arc<dyn Clock>,
    writer: PersistenceWriter,
    removal_delay: Duration,
    runtime: Handle,
}

#[derive(Default)]
struct State {
    tasks: Vec<Task>,
    pending_removal: HashSet<TaskId>,
    last_id: i64,
}

impl TaskStore {
    /// Loads the collection and starts the background writer on the current
    /// tokio runtime.
    pub async fn open(
        adapter: Arc<dyn PersistenceAdapter>,
        clock: Arc<dyn Clock>,
        removal_delay: Duration,
    ) -> Self {
        let tasks = adapter.load().await;
        let last_id = tasks.iter().map(|t| t.id.0).max().unwrap_or(0);
        info!("task store opened with {} tasks", tasks.len());

        let runtime = Handle::current();
        let writer = PersistenceWriter::spawn(adapter, &runtime);

        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(State {
                    tasks,
                    pending_removal: HashSet::new(),
                    last_id,
                }),
                clock,
                writer,
                removal_delay,
                runtime,
            }),
        }
    }

    pub fn create(&self, text: &str) -> Result<Task, TaskError> {
        let text = validate_text(text)?;
        let now = self.inner.clock.now();

        let mut state = self.write();
        // Millisecond timestamps like the stored ids, bumped past the last
        // issued id so ids are never reused within a session.
        let next = state
            .last_id
            .checked_add(1)
            .ok_or(TaskError::IdsExhausted(TaskId(state.last_id)))
            .inspect_err(|e| warn!("rejected create: {}", e))?;
        let id = now.and_utc().timestamp_millis().max(next);
        state.last_id = id;

        let task = Task::new(TaskId(id), text, now);
        state.tasks.push(task.clone());
        self.persist(&state);

        info!("created task {}", task.id);
        Ok(task)
    }

    pub fn edit(&self, id: TaskId, edit: TaskEdit) -> Result<Task, TaskError> {
        let text = validate_text(&edit.text)?;
        let reminder = edit.reminder.normalize()?;

        let mut state = self.write();
        let task = find_mut(&mut state.tasks, id)?;
        task.text = text.to_string();
        task.details = edit.details;
        task.category = edit.category;
        task.reminder = reminder;
        let updated = task.clone();
        self.persist(&state);

        info!("edited task {}", id);
        Ok(updated)
    }

    pub fn toggle_completed(&self, id: TaskId) -> Result<Task, TaskError> {
        self.update(id, |task| task.completed = !task.completed)
            .inspect(|task| info!("task {} completed={}", id, task.completed))
    }

    pub fn toggle_important(&self, id: TaskId) -> Result<Task, TaskError> {
        self.update(id, |task| task.important = !task.important)
            .inspect(|task| info!("task {} important={}", id, task.important))
    }

    /// Phase 1 of removal: the task stays in the collection, flagged as
    /// pending, and is removed once the configured delay has elapsed.
    pub fn delete(&self, id: TaskId) -> Result<(), TaskError> {
        {
            let mut state = self.write();
            find_mut(&mut state.tasks, id)?;
            if !state.pending_removal.insert(id) {
                debug!("task {} is already pending removal", id);
                return Ok(());
            }
        }
        info!("task {} pending removal", id);

        let store = self.clone();
        let delay = self.inner.removal_delay;
        self.inner.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            store.finish_removal(id);
        });
        Ok(())
    }

    fn finish_removal(&self, id: TaskId) {
        let mut state = self.write();
        state.pending_removal.remove(&id);

        let before = state.tasks.len();
        state.tasks.retain(|task| task.id != id);
        if state.tasks.len() == before {
            warn!("task {} vanished before removal", id);
            return;
        }
        self.persist(&state);
        info!("removed task {}", id);
    }

    /// Current collection in insertion order, pending removals included.
    pub fn snapshot(&self) -> Vec<Task> {
        self.read().tasks.clone()
    }

    pub fn entries(&self) -> Vec<TaskEntry> {
        let state = self.read();
        state
            .tasks
            .iter()
            .map(|task| TaskEntry {
                task: task.clone(),
                pending_removal: state.pending_removal.contains(&task.id),
            })
            .collect()
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.read().tasks.iter().find(|task| task.id == id).cloned()
    }

    pub fn is_pending_removal(&self, id: TaskId) -> bool {
        self.read().pending_removal.contains(&id)
    }

    /// Waits for every save issued so far.
    pub async fn flush(&self) -> Result<(), StorageError> {
        self.inner.writer.flush().await
    }

    pub fn persistence_events(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.inner.writer.subscribe()
    }

    fn update<F>(&self, id: TaskId, apply: F) -> Result<Task, TaskError>
    where
        F: FnOnce(&mut Task),
    {
        let mut state = self.write();
        let task = find_mut(&mut state.tasks, id)?;
        apply(task);
        let updated = task.clone();
        self.persist(&state);
        Ok(updated)
    }

    fn persist(&self, state: &State) {
        self.inner.writer.submit(state.tasks.clone());
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate_text(text: &str) -> Result<&str, TaskError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        debug!("rejected empty task text");
        return Err(TaskError::ValidationRejected(
            "task text must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

fn find_mut(tasks: &mut [Task], id: TaskId) -> Result<&mut Task, TaskError> {
    tasks
        .iter_mut()
        .find(|task| task.id == id)
        .ok_or(TaskError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::clock::ManualClock;
    use crate::db::MemoryStore;
    use crate::models::{Category, ReminderInput};
    use crate::repository::JsonTaskRepository;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .expect("valid date")
    }

    async fn empty_store() -> TaskStore {
        let repo = JsonTaskRepository::new(Arc::new(MemoryStore::new()), "tasks");
        TaskStore::open(
            Arc::new(repo),
            Arc::new(ManualClock::new(start())),
            Duration::from_millis(300),
        )
        .await
    }

    #[tokio::test]
    async fn test_create_trims_and_applies_defaults() {
        let store = empty_store().await;
        let task = store.create("  Write migration  ").expect("created");

        assert_eq!(task.text, "Write migration");
        assert_eq!(task.created_date, "2024-06-01");
        assert_eq!(task.category, Category::Frontend);
        assert_eq!(store.snapshot(), vec![task]);
    }

    #[tokio::test]
    async fn test_ids_stay_unique_under_a_frozen_clock() {
        let store = empty_store().await;
        let ids: HashSet<TaskId> = (0..20)
            .map(|i| store.create(&format!("task {}", i)).expect("created").id)
            .collect();
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn test_edit_rejects_empty_text_without_mutation() {
        let store = empty_store().await;
        let task = store.create("Original").expect("created");

        let edit = TaskEdit {
            text: "   ".to_string(),
            ..TaskEdit::from_task(&task)
        };
        assert!(matches!(
            store.edit(task.id, edit),
            Err(TaskError::ValidationRejected(_))
        ));
        assert_eq!(store.get(task.id), Some(task));
    }

    #[tokio::test]
    async fn test_edit_overwrites_fields_and_normalizes_reminder() {
        let store = empty_store().await;
        let task = store.create("Original").expect("created");

        let edited = store
            .edit(
                task.id,
                TaskEdit {
                    text: "Renamed".to_string(),
                    details: "more context".to_string(),
                    category: Category::Database,
                    reminder: ReminderInput::new("2024-06-02", "7:15"),
                },
            )
            .expect("edited");

        assert_eq!(edited.text, "Renamed");
        assert_eq!(edited.details, "more context");
        assert_eq!(edited.category, Category::Database);
        let reminder = edited.reminder.expect("reminder set");
        assert_eq!((reminder.date(), reminder.time()), ("2024-06-02", "07:15"));
        assert_eq!(edited.id, task.id);
        assert_eq!(edited.created_date, task.created_date);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = empty_store().await;
        let missing = TaskId(99);
        assert_eq!(store.toggle_completed(missing), Err(TaskError::NotFound(missing)));
        assert_eq!(store.toggle_important(missing), Err(TaskError::NotFound(missing)));
        assert_eq!(store.delete(missing), Err(TaskError::NotFound(missing)));
        assert_eq!(
            store.edit(missing, TaskEdit { text: "x".to_string(), ..Default::default() }),
            Err(TaskError::NotFound(missing))
        );
    }
}
