use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Category, Reminder, ReminderInput};

/// Display format of the creation date stored in the `date` field.
pub const CREATED_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The persisted task record. Transient view flags (new, pending removal)
/// are never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub important: bool,
    #[serde(rename = "date")]
    pub created_date: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub reminder: Option<Reminder>,
}

impl Task {
    pub fn new(id: TaskId, text: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            important: false,
            created_date: created_at.format(CREATED_DATE_FORMAT).to_string(),
            details: String::new(),
            category: Category::default(),
            reminder: None,
        }
    }

    /// Sample collection used when storage holds nothing usable.
    pub fn samples(now: NaiveDateTime) -> Vec<Task> {
        let reminder_on = |days: i64, hour: u32| {
            (now.date() + Duration::days(days))
                .and_hms_opt(hour, 0, 0)
                .map(Reminder::at)
        };

        vec![
            Task {
                important: true,
                details: "Issue with JWT token validation in the authorization middleware"
                    .to_string(),
                category: Category::Backend,
                reminder: reminder_on(1, 14),
                ..Task::new(TaskId(1), "Debug API authentication issue", now)
            },
            Task {
                completed: true,
                details: "Implement slice pattern and normalize state".to_string(),
                category: Category::Frontend,
                ..Task::new(TaskId(2), "Refactor Redux store structure", now)
            },
            Task {
                important: true,
                details: "Configure GitHub Actions for testing and deployment".to_string(),
                category: Category::DevOps,
                reminder: reminder_on(2, 10),
                ..Task::new(TaskId(3), "Setup CI/CD pipeline", now)
            },
        ]
    }
}

/// Editable fields of a task, applied together by `TaskStore::edit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEdit {
    pub text: String,
    pub details: String,
    pub category: Category,
    pub reminder: ReminderInput,
}

impl TaskEdit {
    /// Edit form prefilled with the task's current values.
    pub fn from_task(task: &Task) -> Self {
        Self {
            text: task.text.clone(),
            details: task.details.clone(),
            category: task.category.clone(),
            reminder: task
                .reminder
                .as_ref()
                .map(ReminderInput::from)
                .unwrap_or_default(),
        }
    }
}

/// A task together with its view-only pending-removal flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskEntry {
    pub task: Task,
    pub pending_removal: bool,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new(TaskId(7), "Write docs", noon());
        assert!(!task.completed);
        assert!(!task.important);
        assert_eq!(task.created_date, "2024-06-01");
        assert_eq!(task.details, "");
        assert_eq!(task.category, Category::Frontend);
        assert_eq!(task.reminder, None);
    }

    #[test]
    fn test_persisted_schema_field_names() {
        let mut task = Task::new(TaskId(42), "Ship it", noon());
        task.reminder = Reminder::normalize("2024-06-02", "10:00").expect("valid");

        let value = serde_json::to_value(&task).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "id": 42,
                "text": "Ship it",
                "completed": false,
                "important": false,
                "date": "2024-06-01",
                "details": "",
                "category": "frontend",
                "reminder": { "date": "2024-06-02", "time": "10:00" }
            })
        );
    }

    #[test]
    fn test_minimal_schema_record_gets_defaults() {
        let json = r#"{"id": 1700000000000, "text": "Old task", "completed": true,
                       "important": false, "date": "1/2/2024", "isNew": false}"#;
        let task: Task = serde_json::from_str(json).expect("deserialize");
        assert_eq!(task.id, TaskId(1_700_000_000_000));
        assert!(task.completed);
        assert_eq!(task.details, "");
        assert_eq!(task.category, Category::Frontend);
        assert_eq!(task.reminder, None);
    }

    #[test]
    fn test_samples_have_distinct_ids_and_future_reminders() {
        let samples = Task::samples(noon());
        assert_eq!(samples.len(), 3);
        assert_eq!(
            samples[0].reminder.as_ref().map(|r| (r.date(), r.time())),
            Some(("2024-06-02", "14:00"))
        );
        assert_eq!(samples[1].reminder, None);
        assert_eq!(
            samples[2].reminder.as_ref().map(|r| (r.date(), r.time())),
            Some(("2024-06-03", "10:00"))
        );
    }

    #[test]
    fn test_edit_form_prefill() {
        let mut task = Task::new(TaskId(1), "Tune queries", noon());
        task.category = Category::Database;
        let edit = TaskEdit::from_task(&task);
        assert_eq!(edit.text, "Tune queries");
        assert_eq!(edit.category, Category::Database);
        assert_eq!(edit.reminder, ReminderInput::cleared());
    }
}
