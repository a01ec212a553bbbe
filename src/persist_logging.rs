//! Persistence event logging.
//!
//! When `debug_logging` is enabled in the config, every load, flush and
//! flush failure is appended as a JSONL line to `<data_dir>/persist-events.jsonl`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Log file name within the data directory.
const PERSIST_EVENTS_FILE: &str = "persist-events.jsonl";

/// Path of the event log for a data directory.
#[must_use]
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(PERSIST_EVENTS_FILE)
}

/// Kinds of persistence events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistEvent {
    /// State was read from the backend at startup.
    Load,
    /// A pending blob was written.
    Flush,
    /// Writing a pending blob failed.
    FlushFailed,
}

impl PersistEvent {
    /// Name written to the `event` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Flush => "flush",
            Self::FlushFailed => "flush_failed",
        }
    }
}

/// Append-only JSONL event log. Disabled logs drop every event.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    /// A log that records nothing.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { path: None }
    }

    /// A log appending to the given file.
    #[must_use]
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    /// Build from an optional path, as returned by the config.
    #[must_use]
    pub const fn from_path(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Whether events are written anywhere.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Record an event.
    ///
    /// Errors are silently ignored: logging never breaks a store operation.
    pub fn record(&self, event: PersistEvent, key: &str, detail: &str) {
        let Some(path) = &self.path else {
            return;
        };

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }

        let entry = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "event": event.as_str(),
            "key": key,
            "detail": detail,
        });

        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };

        let _ = writeln!(file, "{entry}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_log_lines(path: &Path) -> Vec<serde_json::Value> {
        if !path.exists() {
            return vec![];
        }
        let content = std::fs::read_to_string(path).unwrap();
        content
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_record_when_enabled() {
        let dir = TempDir::new().unwrap();
        let path = log_path(dir.path());
        let log = EventLog::to_file(&path);

        log.record(PersistEvent::Flush, "task-storage", "backend=memory bytes=42");

        let lines = read_log_lines(&path);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["event"], "flush");
        assert_eq!(lines[0]["key"], "task-storage");
        assert_eq!(lines[0]["detail"], "backend=memory bytes=42");
        assert!(lines[0]["timestamp"].is_string());
    }

    #[test]
    fn test_record_appends() {
        let dir = TempDir::new().unwrap();
        let path = log_path(dir.path());
        let log = EventLog::to_file(&path);

        log.record(PersistEvent::Load, "task-storage", "");
        log.record(PersistEvent::FlushFailed, "task-storage", "disk full");

        let lines = read_log_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["event"], "flush_failed");
    }

    #[test]
    fn test_disabled_records_nothing() {
        let log = EventLog::disabled();
        assert!(!log.is_enabled());
        log.record(PersistEvent::Flush, "k", "");
    }

    #[test]
    fn test_record_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/events.jsonl");
        EventLog::to_file(&path).record(PersistEvent::Load, "k", "");
        assert_eq!(read_log_lines(&path).len(), 1);
    }

    #[test]
    fn test_unwritable_path_is_ignored() {
        let dir = TempDir::new().unwrap();
        // The log path is a directory, so opening it for append fails.
        let path = dir.path().join("events.jsonl");
        std::fs::create_dir_all(&path).unwrap();
        EventLog::to_file(&path).record(PersistEvent::Flush, "k", "");
    }
}
