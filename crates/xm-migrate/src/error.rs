//! Error types for xm-migrate

use crate::migration::Direction;
use thiserror::Error;
use xm_core::CoreError;
use xm_schema::SchemaError;

/// Migration discovery, ledger, and execution errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// M001: Migrations directory missing
    #[error("[M001] Migrations directory not found: {path}")]
    MigrationsDirNotFound { path: String },

    /// M002: Ledger could not be read
    #[error("[M002] Failed to read version ledger {path}: {source}")]
    LedgerRead {
        path: String,
        source: std::io::Error,
    },

    /// M003: Ledger holds something that is not a revision
    #[error("[M003] Version ledger {path} is corrupt: '{entry}' is not a revision")]
    LedgerCorrupt { path: String, entry: String },

    /// M004: Ledger could not be written
    #[error("[M004] Failed to write version ledger {path}: {source}")]
    LedgerWrite {
        path: String,
        source: std::io::Error,
    },

    /// M005: Migration file could not be parsed or does not describe valid operations
    #[error("[M005] Invalid migration file {path}: {message}")]
    InvalidMigrationFile { path: String, message: String },

    /// M006: A migration's up/down failed; the ledger was not changed
    #[error("[M006] Migration {id} failed while running {direction}: {source}")]
    MigrationFailed {
        id: String,
        direction: Direction,
        source: SchemaError,
    },

    /// M007: Selector matches no migration
    #[error("[M007] Unknown migration '{0}'. Run `xm migrate status` to list migrations")]
    UnknownMigration(String),

    /// M008: Name given to `make` has nothing usable in it
    #[error("[M008] Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// M009: `make` would overwrite a file
    #[error("[M009] Migration file already exists: {path}")]
    MigrationExists { path: String },

    /// M010: Template rendering failed
    #[error("[M010] Failed to render migration template: {0}")]
    Template(String),

    /// M011: Two migrations share an id
    #[error("[M011] Duplicate migration id '{id}'")]
    DuplicateMigration { id: String },

    /// M012: IO error with file path context
    #[error("[M012] Failed to access '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Core error (revisions, config)
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

impl From<minijinja::Error> for MigrateError {
    fn from(err: minijinja::Error) -> Self {
        MigrateError::Template(err.to_string())
    }
}
