use thiserror::Error;

use crate::models::TaskId;

/// Rejections returned by task mutations. None of them leave a trace in the
/// collection or trigger a persistence write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Validation rejected: {0}")]
    ValidationRejected(String),

    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Invalid reminder: date={date:?} time={time:?}")]
    InvalidReminder { date: String, time: String },

    #[error("No task ids left after {0}")]
    IdsExhausted(TaskId),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed persisted data: {0}")]
    Malformed(String),

    #[error("Persistence writer is closed")]
    WriterClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Failure to bring up a tracker from its configuration.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
