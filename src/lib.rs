//! Task lifecycle engine: a persisted task collection with toggles, edits,
//! two-phase deletion, one-shot reminders, filtered views and statistics.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod state;
pub mod telemetry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TrackerConfig;
pub use error::{ConfigError, StorageError, TaskError, TrackerError};
pub use models::{Category, Reminder, ReminderInput, Task, TaskEdit, TaskEntry, TaskId};
pub use repository::{JsonTaskRepository, PersistenceAdapter};
pub use state::Tracker;
