//! View-derived filters over the task and project collections.
//!
//! Everything here is recomputed from store state on demand; nothing is
//! persisted. The one piece of transient state, [`ProcessingDrafts`], holds
//! the context and project picked for inbox tasks before they are processed.

use crate::projects::Project;
use crate::tasks::{Status, Task, TaskStore, TaskUpdate};
use std::collections::HashMap;

/// Filter value meaning "do not filter on this field".
pub const ALL: &str = "all";

/// Picker value meaning "nothing selected".
pub const NONE: &str = "none";

/// Tasks with the given status, in collection order.
#[must_use]
pub fn tasks_by_status(tasks: &[Task], status: Status) -> Vec<&Task> {
    tasks.iter().filter(|t| t.status == status).collect()
}

/// A context or project filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Match every task.
    #[default]
    All,
    /// Match tasks whose field equals the value exactly.
    Only(String),
}

impl Selection {
    /// Parse a picker value; [`ALL`] (any case) or a blank value means [`Selection::All`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    /// Whether a task field satisfies this selection.
    #[must_use]
    pub fn matches(&self, field: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => field == Some(wanted.as_str()),
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Tasks with `status` that satisfy both selections, in collection order.
#[must_use]
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    status: Status,
    context: &Selection,
    project: &Selection,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| {
            t.status == status
                && context.matches(t.context.as_deref())
                && project.matches(t.project_id.as_deref())
        })
        .collect()
}

/// Next actions that satisfy both selections.
#[must_use]
pub fn filter_next<'a>(
    tasks: &'a [Task],
    context: &Selection,
    project: &Selection,
) -> Vec<&'a Task> {
    filter_tasks(tasks, Status::Next, context, project)
}

/// What the next-actions list should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextView {
    /// There are this many matching next actions.
    Pending(usize),
    /// Nothing matches, but there have been next actions before.
    CaughtUp,
    /// There have never been any next actions.
    Empty,
}

/// Tells "all caught up" apart from "never had any next actions".
#[derive(Debug, Clone, Default)]
pub struct CaughtUpTracker {
    seen_next: bool,
}

impl CaughtUpTracker {
    /// Create a tracker that has not seen any next actions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker that starts out knowing whether next actions existed
    /// before it was created, for callers that do not keep a tracker alive
    /// between observations.
    #[must_use]
    pub const fn with_history(seen_next: bool) -> Self {
        Self { seen_next }
    }

    /// Whether a non-empty next list has ever been observed.
    #[must_use]
    pub const fn has_seen_next(&self) -> bool {
        self.seen_next
    }

    /// Observe the current collection under the given filters.
    pub fn observe(
        &mut self,
        tasks: &[Task],
        context: &Selection,
        project: &Selection,
    ) -> NextView {
        if tasks.iter().any(|t| t.status == Status::Next) {
            self.seen_next = true;
        }
        let matching = filter_next(tasks, context, project).len();
        if matching > 0 {
            NextView::Pending(matching)
        } else if self.seen_next {
            NextView::CaughtUp
        } else {
            NextView::Empty
        }
    }
}

/// Whether the collection shows that tasks have left the inbox before:
/// something is done, or something carries a context or project.
#[must_use]
pub fn has_next_history(tasks: &[Task]) -> bool {
    tasks.iter().any(|t| {
        matches!(t.status, Status::Next | Status::Done)
            || t.context.is_some()
            || t.project_id.is_some()
    })
}

/// Reasons processing an inbox task is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessRejected {
    /// No task has this ID.
    TaskNotFound(String),
    /// The task is not in the inbox.
    NotInInbox(Status),
    /// No context has been selected for the task.
    MissingContext,
    /// No project has been selected for the task.
    MissingProject,
}

impl std::fmt::Display for ProcessRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::NotInInbox(status) => write!(f, "task is not in the inbox (status: {status})"),
            Self::MissingContext => write!(f, "select a context before processing"),
            Self::MissingProject => write!(f, "select a project before processing"),
        }
    }
}

impl std::error::Error for ProcessRejected {}

/// Context and project picked for one inbox task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// Selected context.
    pub context: Option<String>,
    /// Selected project ID.
    pub project_id: Option<String>,
}

impl Draft {
    /// Whether both a context and a project are selected.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.context.is_some() && self.project_id.is_some()
    }
}

/// Transient per-task selections made while processing the inbox.
#[derive(Debug, Clone, Default)]
pub struct ProcessingDrafts {
    drafts: HashMap<String, Draft>,
}

impl ProcessingDrafts {
    /// Create an empty set of drafts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a context for a task; [`NONE`] or a blank value clears it.
    pub fn select_context(&mut self, task_id: &str, context: &str) {
        self.drafts.entry(task_id.to_string()).or_default().context = picked(context);
    }

    /// Select a project for a task; [`NONE`] or a blank value clears it.
    pub fn select_project(&mut self, task_id: &str, project_id: &str) {
        self.drafts.entry(task_id.to_string()).or_default().project_id = picked(project_id);
    }

    /// The draft for a task, if anything was selected.
    #[must_use]
    pub fn draft(&self, task_id: &str) -> Option<&Draft> {
        self.drafts.get(task_id)
    }

    /// Whether the task can be processed.
    #[must_use]
    pub fn is_ready(&self, task_id: &str) -> bool {
        self.drafts.get(task_id).is_some_and(Draft::is_complete)
    }

    /// Forget the selections for a task.
    pub fn discard(&mut self, task_id: &str) {
        self.drafts.remove(task_id);
    }

    /// Drop drafts for tasks that are gone or no longer in the inbox.
    pub fn prune(&mut self, tasks: &[Task]) {
        self.drafts.retain(|id, _| tasks.iter().any(|t| t.id == *id && t.status == Status::Inbox));
    }

    /// Number of tasks with selections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    /// Whether no selections are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Move an inbox task to `next` with its selected context and project.
    ///
    /// On success the draft is discarded.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessRejected`] if the task is missing, not in the inbox,
    /// or lacks a selected context or project. Nothing is changed then.
    pub fn process(
        &mut self,
        store: &mut TaskStore,
        task_id: &str,
    ) -> Result<Task, ProcessRejected> {
        let task = store
            .get_task(task_id)
            .ok_or_else(|| ProcessRejected::TaskNotFound(task_id.to_string()))?;
        if task.status != Status::Inbox {
            return Err(ProcessRejected::NotInInbox(task.status));
        }

        let draft = self.drafts.get(task_id).cloned().unwrap_or_default();
        let context = draft.context.ok_or(ProcessRejected::MissingContext)?;
        let project_id = draft.project_id.ok_or(ProcessRejected::MissingProject)?;

        let update = TaskUpdate::status(Status::Next)
            .with_context(Some(context))
            .with_project(Some(project_id));
        let processed = match store.update_task(task_id, update) {
            Ok(Some(task)) => task,
            // The update carries no title, so it cannot be rejected.
            Ok(None) | Err(_) => return Err(ProcessRejected::TaskNotFound(task_id.to_string())),
        };

        self.drafts.remove(task_id);
        Ok(processed)
    }
}

fn picked(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(NONE) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Mark a task done, whatever its current status.
///
/// # Returns
///
/// `None` if no task has that ID.
pub fn mark_done(store: &mut TaskStore, task_id: &str) -> Option<Task> {
    store.update_task(task_id, TaskUpdate::status(Status::Done)).ok().flatten()
}

/// Number of tasks per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Tasks in the inbox.
    pub inbox: usize,
    /// Next actions.
    pub next: usize,
    /// Tasks parked under a project.
    pub project: usize,
    /// Completed tasks.
    pub done: usize,
}

impl StatusCounts {
    /// Count for one status.
    #[must_use]
    pub const fn get(&self, status: Status) -> usize {
        match status {
            Status::Inbox => self.inbox,
            Status::Next => self.next,
            Status::Project => self.project,
            Status::Done => self.done,
        }
    }

    /// Total number of tasks.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.inbox + self.next + self.project + self.done
    }
}

/// Count tasks by status.
#[must_use]
pub fn counts_by_status(tasks: &[Task]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        match task.status {
            Status::Inbox => counts.inbox += 1,
            Status::Next => counts.next += 1,
            Status::Project => counts.project += 1,
            Status::Done => counts.done += 1,
        }
    }
    counts
}

/// Look up the project a task refers to.
///
/// `project_id` is a weak reference: `None` is returned both for tasks
/// without a project and for tasks whose project has been deleted.
#[must_use]
pub fn resolve_project<'a>(projects: &'a [Project], task: &Task) -> Option<&'a Project> {
    let id = task.project_id.as_deref()?;
    projects.iter().find(|p| p.id == id)
}

/// Tasks whose `project_id` refers to no existing project.
#[must_use]
pub fn dangling_tasks<'a>(tasks: &'a [Task], projects: &[Project]) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.project_id.is_some() && resolve_project(projects, t).is_none())
        .collect()
}
