//! Project model types.

use serde::{Deserialize, Serialize};

/// Projects seeded on first run, as `(id, name)`.
///
/// The IDs are the lowercase names so that tasks tagged before any project
/// was created still resolve.
pub const DEFAULT_PROJECTS: [(&str, &str); 4] = [
    ("personal", "Personal"),
    ("work", "Work"),
    ("grocery", "Grocery"),
    ("assignments", "Assignments"),
];

/// A named grouping a task may optionally belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: String,
    /// Non-empty display name, unique ignoring case.
    pub name: String,
}

impl Project {
    /// Whether this is one of the seeded default projects.
    ///
    /// Callers may use this to hide a delete action; the store itself
    /// deletes built-in projects like any other.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        DEFAULT_PROJECTS.iter().any(|(id, _)| *id == self.id)
    }

    /// Whether `name` matches this project's name, ignoring case and
    /// surrounding whitespace.
    #[must_use]
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// The default project collection.
#[must_use]
pub fn default_projects() -> Vec<Project> {
    DEFAULT_PROJECTS
        .iter()
        .map(|(id, name)| Project { id: (*id).to_string(), name: (*name).to_string() })
        .collect()
}

/// Reasons a project creation is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRejected {
    /// The name is empty after trimming.
    EmptyName,
    /// A project with the same name (ignoring case) already exists.
    DuplicateName {
        /// ID of the existing project.
        existing_id: String,
    },
}

impl std::fmt::Display for ProjectRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "project name must not be empty"),
            Self::DuplicateName { existing_id } => {
                write!(f, "a project with this name already exists: {existing_id}")
            }
        }
    }
}

impl std::error::Error for ProjectRejected {}
