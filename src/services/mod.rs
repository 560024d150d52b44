pub mod filter;
pub mod notifier;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod writer;

pub use filter::{FilterCriterion, filter_tasks};
pub use notifier::{LogNotifier, Notifier};
pub use scheduler::{DueReminder, ReminderScheduler, due_reminders, upcoming_reminders};
pub use stats::{
    CategoryCount, CategoryDistribution, StatusDistribution, TaskStats, category_distribution,
    status_distribution,
};
pub use store::TaskStore;
pub use writer::{PersistenceEvent, PersistenceWriter};
