//! Path utilities for determining data storage locations.
//!
//! Data is stored in `~/.gtd-core/` unless the `GTD_DATA_DIR` environment
//! variable or the config file points somewhere else.

use std::path::{Path, PathBuf};

/// The base directory name for gtd-core data.
const DATA_DIR_NAME: &str = ".gtd-core";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "GTD_DATA_DIR";

/// The database filename used by the `SQLite` backend.
pub const DATABASE_FILENAME: &str = "gtd.sqlite3";

/// The config filename inside the data directory.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Subdirectory holding one file per key for the file backend.
const STATE_DIR_NAME: &str = "state";

/// Get the base data directory.
///
/// Returns the value of `GTD_DATA_DIR` when set and non-empty, otherwise
/// `~/.gtd-core/`, or `None` if the home directory cannot be determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::home_dir().map(|home| home.join(DATA_DIR_NAME)),
    }
}

/// Get the config file path inside a data directory.
#[must_use]
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILENAME)
}

/// Get the directory used by the file backend.
#[must_use]
pub fn state_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(STATE_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_data_dir_returns_home_based_path() {
        std::env::remove_var(DATA_DIR_ENV);
        if let Some(home) = dirs::home_dir() {
            let data = data_dir().unwrap();
            assert_eq!(data, home.join(".gtd-core"));
        }
    }

    #[test]
    #[serial]
    fn test_data_dir_env_override() {
        std::env::set_var(DATA_DIR_ENV, "/tmp/gtd-override");
        assert_eq!(data_dir(), Some(PathBuf::from("/tmp/gtd-override")));
        std::env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    #[serial]
    fn test_data_dir_empty_env_is_ignored() {
        std::env::set_var(DATA_DIR_ENV, "");
        let dir = data_dir();
        std::env::remove_var(DATA_DIR_ENV);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(dir, Some(home.join(".gtd-core")));
        }
    }

    #[test]
    fn test_config_and_state_paths() {
        let base = PathBuf::from("/data");
        assert_eq!(config_path(&base), PathBuf::from("/data/config.yaml"));
        assert_eq!(state_dir(&base), PathBuf::from("/data/state"));
    }
}
