//! Task model types.

use serde::{Deserialize, Serialize};

/// Contexts offered when processing a task. Contexts are free text, so
/// tasks may carry values outside this list.
pub const DEFAULT_CONTEXTS: [&str; 4] = ["home", "work", "computer", "errands"];

/// GTD status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Captured but not yet triaged.
    #[default]
    Inbox,
    /// Triaged, actionable, tagged with context and project.
    Next,
    /// Parked as part of a larger project.
    Project,
    /// Completed.
    Done,
}

impl Status {
    /// Every status, in workflow order.
    pub const ALL: [Self; 4] = [Self::Inbox, Self::Next, Self::Project, Self::Done];

    /// Parse a status from a string (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid status.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidStatus> {
        match s.trim().to_lowercase().as_str() {
            "inbox" => Ok(Self::Inbox),
            "next" => Ok(Self::Next),
            "project" => Ok(Self::Project),
            "done" => Ok(Self::Done),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }

    /// Get the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Next => "next",
            Self::Project => "project",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid status string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl std::fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid status: '{}' (must be one of: inbox, next, project, done)", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

/// A task.
///
/// Serialized with camelCase keys; absent optionals are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, immutable.
    pub id: String,
    /// Non-empty display title.
    pub title: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current status.
    pub status: Status,
    /// Situational tag such as `home` or `work`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Weak reference to a project ID. May dangle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Creation time in epoch milliseconds, never mutated.
    pub created_at: i64,
}

impl Task {
    /// Check if the task is done.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }
}

/// Fields that can be updated on a task.
///
/// For the optional fields, the outer `Option` selects whether the field is
/// touched and the inner one is the new value (`Some(None)` clears it).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    /// New title (if Some).
    pub title: Option<String>,
    /// New description (if Some).
    pub description: Option<Option<String>>,
    /// New status (if Some).
    pub status: Option<Status>,
    /// New context (if Some).
    pub context: Option<Option<String>>,
    /// New project reference (if Some).
    pub project_id: Option<Option<String>>,
}

impl TaskUpdate {
    /// An update that only changes the status.
    #[must_use]
    pub fn status(status: Status) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set or clear the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set or clear the context.
    #[must_use]
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = Some(context);
        self
    }

    /// Set or clear the project reference.
    #[must_use]
    pub fn with_project(mut self, project_id: Option<String>) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.context.is_none()
            && self.project_id.is_none()
    }

    /// Merge the update into a task. The title is expected to be validated.
    pub(crate) fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(context) = self.context {
            task.context = context;
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
    }
}

/// Reasons a task mutation is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRejected {
    /// The title is empty after trimming.
    EmptyTitle,
}

impl std::fmt::Display for TaskRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
        }
    }
}

impl std::error::Error for TaskRejected {}
