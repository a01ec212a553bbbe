//! Error types for `gtd_core`.

/// Errors that can occur while loading, persisting or configuring the stores.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing or serialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The key-value backend refused or failed an operation.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A persisted blob could not be decoded.
    #[error("Corrupt state under key '{key}': {source}")]
    CorruptState {
        /// The storage key holding the blob.
        key: String,
        /// The decoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// A persisted blob was written by an unknown format version.
    #[error("Unsupported state version {version} under key '{key}'")]
    UnsupportedVersion {
        /// The storage key holding the blob.
        key: String,
        /// The version found in the blob.
        version: u32,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
