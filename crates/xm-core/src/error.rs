//! Error types for xm-core

use thiserror::Error;

/// Core error type for Experimentum
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Malformed migration revision
    #[error("[E004] Invalid revision '{value}': {reason}")]
    InvalidRevision { value: String, reason: String },

    /// E005: Unknown dialect name
    #[error("[E005] Unknown dialect '{name}'. Expected one of: duckdb, postgres, mysql, mssql, sqlite")]
    UnknownDialect { name: String },

    /// E006: IO error
    #[error("[E006] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E007: IO error with file path context
    #[error("[E007] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
