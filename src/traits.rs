//! Core traits for testability and abstraction.

use crate::error::Result;

/// Trait for the persistent key-value blob store.
///
/// This trait abstracts the storage medium behind the task and project
/// stores. Each key holds one opaque string (a whole serialized
/// collection); there is no per-entity granularity. Production code uses
/// a file- or `SQLite`-backed implementation, while tests use the
/// in-memory store or the doubles in [`crate::testing`].
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Returns
    ///
    /// `None` if nothing has been written under the key yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Short backend name, used in log lines.
    fn name(&self) -> &'static str;
}
