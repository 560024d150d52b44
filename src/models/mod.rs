pub mod category;
pub mod reminder;
pub mod task;

pub use category::Category;
pub use reminder::{Reminder, ReminderInput, DATE_FORMAT, TIME_FORMAT};
pub use task::{Task, TaskEdit, TaskEntry, TaskId, CREATED_DATE_FORMAT};
