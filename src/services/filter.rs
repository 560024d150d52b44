use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::models::{Category, Task};

/// View selector over the task collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterCriterion {
    #[default]
    All,
    Completed,
    Active,
    Important,
    Category(Category),
}

impl FilterCriterion {
    /// Parses a criterion. Anything unrecognized selects every task.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "all" => FilterCriterion::All,
            "completed" => FilterCriterion::Completed,
            "active" => FilterCriterion::Active,
            "important" => FilterCriterion::Important,
            other => match other
                .strip_prefix("category:")
                .or_else(|| other.strip_prefix("category-"))
            {
                Some(category) => FilterCriterion::Category(Category::from(category)),
                None => {
                    debug!("unknown filter {:?}, showing all tasks", other);
                    FilterCriterion::All
                }
            },
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            FilterCriterion::All => true,
            FilterCriterion::Completed => task.completed,
            FilterCriterion::Active => !task.completed,
            FilterCriterion::Important => task.important,
            FilterCriterion::Category(category) => &task.category == category,
        }
    }
}

impl FromStr for FilterCriterion {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for FilterCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterCriterion::All => f.write_str("all"),
            FilterCriterion::Completed => f.write_str("completed"),
            FilterCriterion::Active => f.write_str("active"),
            FilterCriterion::Important => f.write_str("important"),
            FilterCriterion::Category(category) => write!(f, "category:{}", category.id()),
        }
    }
}

/// Order-preserving subsequence of `tasks` matching `criterion`.
pub fn filter_tasks<'a>(tasks: &'a [Task], criterion: &FilterCriterion) -> Vec<&'a Task> {
    tasks.iter().filter(|task| criterion.matches(task)).collect()
}
