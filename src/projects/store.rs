//! The project store: sole owner of the project collection.

use crate::error::Result;
use crate::persist::{FlushPolicy, Persister};
use crate::persist_logging::EventLog;
use crate::projects::models::{default_projects, Project, ProjectRejected};
use crate::storage::MemoryStore;
use crate::tasks::id::generate_project_id;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::rc::Rc;

/// Backend key holding the serialized project collection.
pub const PROJECTS_KEY: &str = "project-storage";

#[derive(Serialize)]
struct ProjectStateRef<'a> {
    projects: &'a [Project],
}

#[derive(Deserialize)]
struct ProjectState {
    projects: Vec<Project>,
}

/// In-memory project collection with write-behind persistence.
///
/// Projects are kept in creation order. Opening a store with nothing
/// persisted yields the default projects; nothing is written until the
/// first mutation.
#[derive(Debug)]
pub struct ProjectStore {
    projects: Vec<Project>,
    seen_ids: HashSet<String>,
    persister: Persister,
}

impl ProjectStore {
    /// Open the store, loading any collection persisted under [`PROJECTS_KEY`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails or the blob is corrupt.
    pub fn open(persister: Persister) -> Result<Self> {
        let projects = persister
            .load::<ProjectState>()?
            .map_or_else(default_projects, |s| s.projects);
        Ok(Self::from_parts(projects, persister))
    }

    /// A store with the default projects on a private in-memory backend.
    #[must_use]
    pub fn in_memory() -> Self {
        let persister = Persister::new(
            Rc::new(MemoryStore::new()),
            PROJECTS_KEY,
            FlushPolicy::Immediate,
            EventLog::disabled(),
        );
        Self::from_parts(default_projects(), persister)
    }

    pub(crate) fn from_parts(projects: Vec<Project>, persister: Persister) -> Self {
        let seen_ids = projects.iter().map(|p| p.id.clone()).collect();
        Self { projects, seen_ids, persister }
    }

    /// All projects, in creation order.
    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Number of projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Get a project by ID.
    #[must_use]
    pub fn get_project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Find a project by name, ignoring case.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name_matches(name))
    }

    /// Create a project and append it to the collection.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRejected::EmptyName`] for a blank name, or
    /// [`ProjectRejected::DuplicateName`] if a project with the same name
    /// (ignoring case) exists. The collection is unchanged in both cases.
    pub fn add_project(&mut self, name: &str) -> std::result::Result<Project, ProjectRejected> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectRejected::EmptyName);
        }
        if let Some(existing) = self.find_by_name(name) {
            return Err(ProjectRejected::DuplicateName { existing_id: existing.id.clone() });
        }

        let project = Project { id: self.fresh_id(name), name: name.to_string() };
        self.projects.push(project.clone());
        self.persist();
        Ok(project)
    }

    /// Delete a project by ID.
    ///
    /// Tasks referring to the project keep their `project_id`, which then
    /// dangles.
    ///
    /// # Returns
    ///
    /// `false` if no project had that ID; nothing is persisted in that case.
    pub fn delete_project(&mut self, id: &str) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return false;
        }
        self.persist();
        true
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
        self.persister.stage(&ProjectStateRef { projects: &self.projects });
    }

    fn fresh_id(&mut self, name: &str) -> String {
        loop {
            let id = generate_project_id(name);
            if self.seen_ids.insert(id.clone()) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockKvStore;

    fn create_test_store() -> (Rc<MockKvStore>, ProjectStore) {
        let kv = Rc::new(MockKvStore::new());
        let store = reopen(&kv);
        (kv, store)
    }

    fn reopen(kv: &Rc<MockKvStore>) -> ProjectStore {
        let persister =
            Persister::new(kv.clone(), PROJECTS_KEY, FlushPolicy::Immediate, EventLog::disabled());
        ProjectStore::open(persister).unwrap()
    }

    #[test]
    fn test_first_run_seeds_defaults_without_writing() {
        let (kv, store) = create_test_store();
        assert_eq!(store.len(), 4);
        assert_eq!(store.get_project("grocery").unwrap().name, "Grocery");
        assert_eq!(kv.write_count(), 0);
    }

    #[test]
    fn test_add_project_appends() {
        let (_kv, mut store) = create_test_store();
        let project = store.add_project("  Garden ").unwrap();

        assert_eq!(project.name, "Garden");
        assert!(project.id.starts_with("garden-"));
        assert_eq!(store.projects().last(), Some(&project));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_add_project_duplicate_ignores_case() {
        let (kv, mut store) = create_test_store();
        let result = store.add_project("work");
        assert_eq!(result, Err(ProjectRejected::DuplicateName { existing_id: "work".to_string() }));

        let result = store.add_project("WORK");
        assert!(matches!(result, Err(ProjectRejected::DuplicateName { .. })));

        assert_eq!(store.len(), 4);
        assert_eq!(kv.write_count(), 0);
    }

    #[test]
    fn test_add_project_rejects_blank() {
        let (_kv, mut store) = create_test_store();
        assert_eq!(store.add_project("   "), Err(ProjectRejected::EmptyName));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_delete_project_is_idempotent() {
        let (kv, mut store) = create_test_store();
        assert!(store.delete_project("work"));
        assert_eq!(store.len(), 3);
        assert_eq!(kv.write_count(), 1);

        assert!(!store.delete_project("work"));
        assert!(!store.delete_project("never-existed"));
        assert_eq!(kv.write_count(), 1);
    }

    #[test]
    fn test_builtin_projects_can_be_deleted_by_store() {
        let (_kv, mut store) = create_test_store();
        for id in ["personal", "work", "grocery", "assignments"] {
            assert!(store.delete_project(id));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_deleted_name_can_be_reused() {
        let (_kv, mut store) = create_test_store();
        store.delete_project("work");
        let project = store.add_project("Work").unwrap();
        assert_ne!(project.id, "work");
        assert!(!project.is_builtin());
    }

    #[test]
    fn test_roundtrip_through_backend() {
        let (kv, mut store) = create_test_store();
        store.add_project("Garden").unwrap();
        store.delete_project("grocery");

        let reopened = reopen(&kv);
        assert_eq!(reopened.projects(), store.projects());
        assert!(reopened.get_project("grocery").is_none());
    }

    #[test]
    fn test_empty_persisted_collection_is_not_reseeded() {
        let (kv, mut store) = create_test_store();
        for id in ["personal", "work", "grocery", "assignments"] {
            store.delete_project(id);
        }
        assert!(reopen(&kv).is_empty());
    }

    #[test]
    fn test_find_by_name() {
        let (_kv, store) = create_test_store();
        assert_eq!(store.find_by_name("assignments").unwrap().id, "assignments");
        assert!(store.find_by_name("chores").is_none());
    }

    #[test]
    fn test_open_read_failure_is_error() {
        let kv = Rc::new(MockKvStore::new());
        kv.set_fail_reads(true);
        let persister =
            Persister::new(kv, PROJECTS_KEY, FlushPolicy::Immediate, EventLog::disabled());
        assert!(ProjectStore::open(persister).is_err());
    }
}
