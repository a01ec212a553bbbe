//! # `gtd_core`
//!
//! Task and project stores for a Getting Things Done workflow.
//!
//! Tasks move from the inbox to next actions (tagged with a context and a
//! project) and on to done. Both collections live in memory and are written
//! behind to a key-value backend as JSON blobs. The [`views`] module holds
//! the derived filters a UI applies over that state.
//!
//! ```
//! use gtd_core::tasks::Status;
//! use gtd_core::views::{self, ProcessingDrafts};
//! use gtd_core::Workspace;
//!
//! let mut ws = Workspace::in_memory();
//! let task = ws.tasks_mut().add_task("Buy milk", None).unwrap();
//!
//! let mut drafts = ProcessingDrafts::new();
//! drafts.select_context(&task.id, "home");
//! drafts.select_project(&task.id, "personal");
//! let next = drafts.process(ws.tasks_mut(), &task.id).unwrap();
//! assert_eq!(next.status, Status::Next);
//!
//! views::mark_done(ws.tasks_mut(), &task.id);
//! assert_eq!(views::counts_by_status(ws.tasks().tasks()).done, 1);
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod paths;
pub mod persist;
pub mod persist_logging;
pub mod projects;
pub mod storage;
pub mod tasks;
pub mod testing;
pub mod traits;
pub mod views;
pub mod workspace;

pub use config::{Backend, GtdConfig};
pub use error::{Error, Result};
pub use persist::{FlushPolicy, Persister};
pub use projects::{Project, ProjectRejected, ProjectStore};
pub use tasks::{Status, Task, TaskRejected, TaskStore, TaskUpdate};
pub use traits::KeyValueStore;
pub use workspace::Workspace;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
