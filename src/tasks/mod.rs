//! Task management.
//!
//! This module provides the GTD task collection:
//! - Tasks with title, optional description, status, context and project
//! - A store that owns the collection and persists it after every mutation
//! - ID generation that never reuses an ID within a store's lifetime
//!
//! # Example
//!
//! ```
//! use gtd_core::tasks::{Status, TaskStore, TaskUpdate};
//!
//! let mut store = TaskStore::in_memory();
//! let task = store.add_task("Buy milk", None).unwrap();
//! assert_eq!(task.status, Status::Inbox);
//!
//! store
//!     .update_task(&task.id, TaskUpdate::status(Status::Next).with_context(Some("home".into())))
//!     .unwrap();
//! ```

pub mod id;
pub mod models;
pub mod store;

pub use models::{InvalidStatus, Status, Task, TaskRejected, TaskUpdate, DEFAULT_CONTEXTS};
pub use store::{TaskStore, TASKS_KEY};
