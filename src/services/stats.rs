use serde::Serialize;

use crate::models::{Category, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusDistribution {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub important: usize,
}

impl StatusDistribution {
    /// Percentage of completed tasks, 0 for an empty collection.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 * 100.0 / self.total as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub label: &'static str,
    pub count: usize,
}

/// One bucket per known category in enumeration order. Tasks with an
/// unrecognized category fall in no bucket and are counted separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDistribution {
    pub buckets: Vec<CategoryCount>,
    pub unrecognized: usize,
}

impl CategoryDistribution {
    pub fn bucketed(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStats {
    pub status: StatusDistribution,
    pub categories: CategoryDistribution,
    pub completion_rate: f64,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let status = status_distribution(tasks);
        Self {
            status,
            categories: category_distribution(tasks),
            completion_rate: status.completion_rate(),
        }
    }
}

pub fn status_distribution(tasks: &[Task]) -> StatusDistribution {
    let completed = tasks.iter().filter(|t| t.completed).count();
    StatusDistribution {
        total: tasks.len(),
        completed,
        active: tasks.len() - completed,
        important: tasks.iter().filter(|t| t.important).count(),
    }
}

pub fn category_distribution(tasks: &[Task]) -> CategoryDistribution {
    let buckets = Category::ALL
        .into_iter()
        .map(|category| CategoryCount {
            count: tasks.iter().filter(|t| t.category == category).count(),
            label: category.label(),
            category,
        })
        .collect();

    CategoryDistribution {
        buckets,
        unrecognized: tasks.iter().filter(|t| !t.category.is_recognized()).count(),
    }
}
