//! Error types for the storage provider

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by a [`KeyValueStorage`](crate::KeyValueStorage) backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse group '{group}': {source}")]
    Parse {
        group: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode value for key '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;
