//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.

#![allow(dead_code)]

use crate::error::{Error, Result};
use crate::storage::MemoryStore;
use crate::traits::KeyValueStore;
use std::cell::{Cell, RefCell};

/// A mock key-value store for testing.
///
/// Records every successful write and can be switched into failing reads
/// or failing writes at any point.
#[derive(Debug, Default)]
pub struct MockKvStore {
    inner: MemoryStore,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    writes: RefCell<Vec<(String, String)>>,
    rejected_writes: Cell<usize>,
}

impl MockKvStore {
    /// Create a new, empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store already holding `value` under `key`.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        Self { inner: MemoryStore::with_entries([(key, value)]), ..Self::default() }
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// All successful writes, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.borrow().clone()
    }

    /// Number of successful writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }

    /// Number of writes refused while failing.
    #[must_use]
    pub fn rejected_write_count(&self) -> usize {
        self.rejected_writes.get()
    }

    /// Current value under `key`, bypassing failure injection.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.get(key).ok().flatten()
    }
}

impl KeyValueStore for MockKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.get() {
            return Err(Error::Storage(format!("injected read failure for '{key}'")));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.get() {
            self.rejected_writes.set(self.rejected_writes.get() + 1);
            return Err(Error::Storage(format!("injected write failure for '{key}'")));
        }
        self.writes.borrow_mut().push((key.to_string(), value.to_string()));
        self.inner.set(key, value)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
