//! `culld` Error Types
//!
//! Centralized error handling using thiserror for type-safe errors.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a reconciliation pass
#[derive(Error, Debug)]
pub enum CullerError {
    #[error("Session directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Container runtime error: {0}")]
    Container(#[from] ContainerError),

    #[error("Record store error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from the session directory REST API
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The server answered with a non-2xx status.
    #[error("Request failed with HTTP status {status}")]
    Http { status: u16 },

    /// Connection, timeout, or body failures below the HTTP layer.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Container-existence probe errors
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("Failed to run container probe: {0}")]
    ProbeFailed(#[from] std::io::Error),

    #[error("Container probe exited with status {status}: {stderr}")]
    ProbeExited { status: i32, stderr: String },
}

/// Record store errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Record store not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

/// Result type alias for reconciliation passes
pub type Result<T> = std::result::Result<T, CullerError>;

/// Result type alias for directory operations
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

/// Result type alias for record store operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Result type alias for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DirectoryError::Http { status: 404 };
        assert_eq!(err.to_string(), "Request failed with HTTP status 404");
    }

    #[test]
    fn test_error_conversion() {
        let dir_err = DirectoryError::Transport("connection refused".to_string());
        let culler_err: CullerError = dir_err.into();
        assert!(matches!(culler_err, CullerError::Directory(_)));
    }
}
