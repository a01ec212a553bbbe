//! The task store: sole owner of the task collection.

use crate::error::Result;
use crate::persist::{FlushPolicy, Persister};
use crate::persist_logging::EventLog;
use crate::storage::MemoryStore;
use crate::tasks::id::generate_task_id;
use crate::tasks::models::{Status, Task, TaskRejected, TaskUpdate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::rc::Rc;

/// Backend key holding the serialized task collection.
pub const TASKS_KEY: &str = "task-storage";

#[derive(Serialize)]
struct TaskStateRef<'a> {
    tasks: &'a [Task],
}

#[derive(Deserialize)]
struct TaskState {
    tasks: Vec<Task>,
}

/// In-memory task collection with write-behind persistence.
///
/// Tasks are kept most-recently-created first. Every mutation re-serializes
/// the whole collection and hands it to the store's [`Persister`].
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    /// Every ID issued or loaded, so IDs are never reused while the store lives.
    seen_ids: HashSet<String>,
    persister: Persister,
}

impl TaskStore {
    /// Open the store, loading any collection persisted under [`TASKS_KEY`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails or the blob is corrupt.
    pub fn open(persister: Persister) -> Result<Self> {
        let tasks = persister.load::<TaskState>()?.map(|s| s.tasks).unwrap_or_default();
        Ok(Self::from_parts(tasks, persister))
    }

    /// A store backed by a private in-memory backend.
    #[must_use]
    pub fn in_memory() -> Self {
        let persister = Persister::new(
            Rc::new(MemoryStore::new()),
            TASKS_KEY,
            FlushPolicy::Immediate,
            EventLog::disabled(),
        );
        Self::from_parts(Vec::new(), persister)
    }

    pub(crate) fn from_parts(tasks: Vec<Task>, persister: Persister) -> Self {
        let seen_ids = tasks.iter().map(|t| t.id.clone()).collect();
        Self { tasks, seen_ids, persister }
    }

    /// All tasks, newest first.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by ID.
    #[must_use]
    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Capture a new task into the inbox.
    ///
    /// The title is trimmed; a blank description is stored as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRejected::EmptyTitle`] if the trimmed title is empty.
    pub fn add_task(
        &mut self,
        title: &str,
        description: Option<&str>,
    ) -> std::result::Result<Task, TaskRejected> {
        let title = normalize_title(title)?;
        let task = Task {
            id: self.fresh_id(&title),
            title,
            description: normalize_optional(description.map(str::to_string)),
            status: Status::Inbox,
            context: None,
            project_id: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.tasks.insert(0, task.clone());
        self.persist();
        Ok(task)
    }

    /// Merge `update` into the task with the given ID.
    ///
    /// `project_id` is a weak reference and is not checked against any
    /// project store. An empty update returns the task without persisting.
    ///
    /// # Returns
    ///
    /// `None` if no task has that ID.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRejected::EmptyTitle`] if the update sets a blank title.
    pub fn update_task(
        &mut self,
        id: &str,
        mut update: TaskUpdate,
    ) -> std::result::Result<Option<Task>, TaskRejected> {
        if let Some(title) = update.title.take() {
            update.title = Some(normalize_title(&title)?);
        }
        update.description = update.description.map(normalize_optional);

        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(task.clone()));
        }

        update.apply_to(task);
        let updated = task.clone();
        self.persist();
        Ok(Some(updated))
    }

    /// Delete a task by ID.
    ///
    /// # Returns
    ///
    /// `false` if no task had that ID; nothing is persisted in that case.
    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Remove every task.
    ///
    /// # Returns
    ///
    /// The number of tasks removed.
    pub fn clear_tasks(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        self.persist();
        removed
    }

    /// Write any staged state now.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the write fails.
    pub fn flush(&mut self) -> Result<bool> {
        self.persister.flush()
    }

    /// The persister, for inspecting pending writes and failures.
    #[must_use]
    pub const fn persister(&self) -> &Persister {
        &self.persister
    }

    /// Mutable access to the persister, for installing a failure observer.
    pub fn persister_mut(&mut self) -> &mut Persister {
        &mut self.persister
    }

    fn persist(&mut self) {
        self.persister.stage(&TaskStateRef { tasks: &self.tasks });
    }

    fn fresh_id(&mut self, title: &str) -> String {
        loop {
            let id = generate_task_id(title);
            if self.seen_ids.insert(id.clone()) {
                return id;
            }
        }
    }
}

fn normalize_title(title: &str) -> std::result::Result<String, TaskRejected> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskRejected::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
