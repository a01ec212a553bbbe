//! Configuration management for gtd-core.
//!
//! This module handles the `config.yaml` file in the data directory, which
//! selects the storage backend, the flush policy and debug logging.

use crate::error::Result;
use crate::paths;
use crate::persist::FlushPolicy;
use crate::storage::{FileStore, MemoryStore, SqliteStore};
use crate::traits::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Which key-value backend holds persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Nothing survives the process.
    Memory,
    /// One JSON file per key under `<data_dir>/state/`.
    #[default]
    File,
    /// A `kv` table in `<data_dir>/gtd.sqlite3`.
    Sqlite,
}

/// Configuration for the stores.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GtdConfig {
    /// Storage backend.
    #[serde(default)]
    pub backend: Backend,

    /// Override for where backend files live.
    /// None means the directory the config was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// When persisted state is written.
    #[serde(default)]
    pub flush: FlushPolicy,

    /// Whether persistence events are appended to `persist-events.jsonl`.
    #[serde(default)]
    pub debug_logging: bool,
}

impl GtdConfig {
    /// Load config from a data directory, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(data_dir: &Path) -> Result<Option<Self>> {
        let config_path = paths::config_path(data_dir);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Load config from a data directory, falling back to defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(data_dir: &Path) -> Result<Self> {
        Ok(Self::load_from(data_dir)?.unwrap_or_default())
    }

    /// Save config to a data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, data_dir: &Path) -> Result<()> {
        let config_path = paths::config_path(data_dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// The directory backend files live in, given where the config came from.
    #[must_use]
    pub fn effective_data_dir(&self, config_dir: &Path) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| config_dir.to_path_buf())
    }

    /// Path of the persistence event log, if debug logging is enabled.
    #[must_use]
    pub fn event_log_path(&self, config_dir: &Path) -> Option<PathBuf> {
        self.debug_logging
            .then(|| crate::persist_logging::log_path(&self.effective_data_dir(config_dir)))
    }

    /// Open the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the `SQLite` database cannot be initialized.
    pub fn open_backend(&self, config_dir: &Path) -> Result<Rc<dyn KeyValueStore>> {
        let dir = self.effective_data_dir(config_dir);
        let backend: Rc<dyn KeyValueStore> = match self.backend {
            Backend::Memory => Rc::new(MemoryStore::new()),
            Backend::File => Rc::new(FileStore::new(paths::state_dir(&dir))),
            Backend::Sqlite => Rc::new(SqliteStore::in_data_dir(&dir)?),
        };
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(GtdConfig::load_from(dir.path()).unwrap(), None);
        assert_eq!(GtdConfig::load_or_default(dir.path()).unwrap(), GtdConfig::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let config = GtdConfig {
            backend: Backend::Sqlite,
            data_dir: None,
            flush: FlushPolicy::Deferred,
            debug_logging: true,
        };
        config.save_to(dir.path()).unwrap();

        let loaded = GtdConfig::load_from(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(paths::config_path(dir.path()), "backend: memory\n").unwrap();

        let loaded = GtdConfig::load_from(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.backend, Backend::Memory);
        assert_eq!(loaded.flush, FlushPolicy::Immediate);
        assert!(!loaded.debug_logging);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(paths::config_path(dir.path()), "backend: [unclosed\n").unwrap();
        assert!(GtdConfig::load_from(dir.path()).is_err());
    }

    #[test]
    fn test_unknown_backend_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(paths::config_path(dir.path()), "backend: floppy\n").unwrap();
        assert!(GtdConfig::load_from(dir.path()).is_err());
    }

    #[test]
    fn test_effective_data_dir_override() {
        let config =
            GtdConfig { data_dir: Some(PathBuf::from("/elsewhere")), ..Default::default() };
        assert_eq!(config.effective_data_dir(Path::new("/conf")), PathBuf::from("/elsewhere"));
        assert_eq!(
            GtdConfig::default().effective_data_dir(Path::new("/conf")),
            PathBuf::from("/conf")
        );
    }

    #[test]
    fn test_event_log_path_only_when_enabled() {
        let base = Path::new("/conf");
        assert_eq!(GtdConfig::default().event_log_path(base), None);

        let config = GtdConfig { debug_logging: true, ..Default::default() };
        assert_eq!(config.event_log_path(base), Some(PathBuf::from("/conf/persist-events.jsonl")));
    }

    #[test]
    fn test_open_backends() {
        let dir = TempDir::new().unwrap();
        for (backend, name) in
            [(Backend::Memory, "memory"), (Backend::File, "file"), (Backend::Sqlite, "sqlite")]
        {
            let config = GtdConfig { backend, ..Default::default() };
            let kv = config.open_backend(dir.path()).unwrap();
            assert_eq!(kv.name(), name);
        }
        assert!(dir.path().join(paths::DATABASE_FILENAME).exists());
    }
}
