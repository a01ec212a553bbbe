//! Application state: both stores on one backend.
//!
//! A [`Workspace`] is constructed once at startup and handed to whatever
//! drives the UI. There is no global instance.

use crate::config::GtdConfig;
use crate::error::{Error, Result};
use crate::persist::{FlushPolicy, Persister};
use crate::persist_logging::EventLog;
use crate::projects::{default_projects, ProjectStore, PROJECTS_KEY};
use crate::storage::MemoryStore;
use crate::tasks::{TaskStore, TASKS_KEY};
use crate::traits::KeyValueStore;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// The task and project stores sharing one key-value backend.
#[derive(Debug)]
pub struct Workspace {
    tasks: TaskStore,
    projects: ProjectStore,
}

impl Workspace {
    /// Open both stores on `backend`.
    ///
    /// # Errors
    ///
    /// Returns an error if either persisted collection cannot be read or decoded.
    pub fn open(
        backend: Rc<dyn KeyValueStore>,
        policy: FlushPolicy,
        log: EventLog,
    ) -> Result<Self> {
        let tasks =
            TaskStore::open(Persister::new(backend.clone(), TASKS_KEY, policy, log.clone()))?;
        let projects = ProjectStore::open(Persister::new(backend, PROJECTS_KEY, policy, log))?;
        Ok(Self { tasks, projects })
    }

    /// Open the workspace described by the config in `config_dir`.
    ///
    /// A missing config file means defaults: file backend, immediate flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the config, backend or persisted state cannot be loaded.
    pub fn from_config_dir(config_dir: &Path) -> Result<Self> {
        let config = GtdConfig::load_or_default(config_dir)?;
        Self::from_config(&config, config_dir)
    }

    /// Open the workspace for an already loaded config.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend or persisted state cannot be loaded.
    pub fn from_config(config: &GtdConfig, config_dir: &Path) -> Result<Self> {
        let backend = config.open_backend(config_dir)?;
        let log = EventLog::from_path(config.event_log_path(config_dir));
        Self::open(backend, config.flush, log)
    }

    /// A workspace on a fresh in-memory backend.
    #[must_use]
    pub fn in_memory() -> Self {
        let backend: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let persister = |key: &str| {
            Persister::new(backend.clone(), key, FlushPolicy::Immediate, EventLog::disabled())
        };
        Self {
            tasks: TaskStore::from_parts(Vec::new(), persister(TASKS_KEY)),
            projects: ProjectStore::from_parts(default_projects(), persister(PROJECTS_KEY)),
        }
    }

    /// The task store.
    #[must_use]
    pub const fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// The task store, for mutation.
    pub fn tasks_mut(&mut self) -> &mut TaskStore {
        &mut self.tasks
    }

    /// The project store.
    #[must_use]
    pub const fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    /// The project store, for mutation.
    pub fn projects_mut(&mut self) -> &mut ProjectStore {
        &mut self.projects
    }

    /// Both stores at once, for operations that read one and mutate the other.
    pub fn split_mut(&mut self) -> (&mut TaskStore, &mut ProjectStore) {
        (&mut self.tasks, &mut self.projects)
    }

    /// Install one observer for write failures of either store.
    pub fn on_failure(&mut self, observer: impl FnMut(&str, &Error) + 'static) {
        let shared = Rc::new(RefCell::new(observer));
        let for_tasks = shared.clone();
        self.tasks.persister_mut().on_failure(move |key, err| (*for_tasks.borrow_mut())(key, err));
        self.projects.persister_mut().on_failure(move |key, err| (*shared.borrow_mut())(key, err));
    }

    /// Total failed writes across both stores.
    #[must_use]
    pub const fn failure_count(&self) -> usize {
        self.tasks.persister().failure_count() + self.projects.persister().failure_count()
    }

    /// Whether either store has unwritten state.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.tasks.persister().has_pending() || self.projects.persister().has_pending()
    }

    /// Flush both stores.
    ///
    /// Both flushes are attempted even if the first fails.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    pub fn flush(&mut self) -> Result<()> {
        let tasks = self.tasks.flush();
        let projects = self.projects.flush();
        tasks?;
        projects?;
        Ok(())
    }
}
