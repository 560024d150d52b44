use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed set of task categories.
///
/// Values stored by an older schema that are not part of the set survive as
/// `Unrecognized` so the task is never rejected on load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    Frontend,
    Backend,
    DevOps,
    Design,
    Database,
    Unrecognized(String),
}

impl Category {
    /// Enumeration order used by statistics and category pickers.
    pub const ALL: [Category; 5] = [
        Category::Frontend,
        Category::Backend,
        Category::DevOps,
        Category::Design,
        Category::Database,
    ];

    pub fn id(&self) -> &str {
        match self {
            Category::Frontend => "frontend",
            Category::Backend => "backend",
            Category::DevOps => "devops",
            Category::Design => "design",
            Category::Database => "database",
            Category::Unrecognized(raw) => raw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Frontend => "Frontend",
            Category::Backend => "Backend",
            Category::DevOps => "DevOps",
            Category::Design => "Design",
            Category::Database => "Database",
            Category::Unrecognized(_) => "Other",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Category::Unrecognized(_))
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        match value {
            "frontend" => Category::Frontend,
            "backend" => Category::Backend,
            "devops" => Category::DevOps,
            "design" => Category::Design,
            "database" => Category::Database,
            other => Category::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match Category::from(value.as_str()) {
            Category::Unrecognized(_) => Category::Unrecognized(value),
            known => known,
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Unrecognized(raw) => raw,
            known => known.id().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
