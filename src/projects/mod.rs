//! Project management.
//!
//! Projects are named groupings for tasks. The collection is seeded with
//! [`DEFAULT_PROJECTS`] on first run and names are unique ignoring case.
//! Tasks hold only a weak reference (`project_id`) to a project; deleting a
//! project leaves those references dangling.

pub mod models;
pub mod store;

pub use models::{default_projects, Project, ProjectRejected, DEFAULT_PROJECTS};
pub use store::{ProjectStore, PROJECTS_KEY};
