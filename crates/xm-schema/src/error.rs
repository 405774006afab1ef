//! Error types for xm-schema

use crate::index::IndexKind;
use thiserror::Error;
use xm_db::DbError;

/// Schema building and DDL execution errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// S001: Table name rejected when constructing a blueprint
    #[error("[S001] Invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },

    /// S002: Foreign key used before `references(..)` / `on(..)` were set
    #[error("[S002] Foreign key '{name}' on {table}.{column} is missing its {missing}")]
    IncompleteForeignKey {
        table: String,
        column: String,
        name: String,
        missing: &'static str,
    },

    /// S003: Alter or drop-key against a table that does not exist
    #[error("[S003] Table '{0}' does not exist")]
    TableNotFound(String),

    /// S004: A recreate would leave the table without columns
    #[error("[S004] Altering '{0}' would leave the table without columns")]
    EmptyTable(String),

    /// S005: Unrecognised foreign key action
    #[error("[S005] Unknown referential action '{0}'. Expected cascade, restrict, set null, set default or no action")]
    InvalidReferentialAction(String),

    /// S006: A key names a column the table does not have
    #[error("[S006] {kind} '{name}' on {table} refers to missing column '{column}'")]
    KeyColumnNotFound {
        table: String,
        name: String,
        kind: IndexKind,
        column: String,
    },

    /// S007: A dropped key matches nothing on the live table
    #[error("[S007] Cannot drop {kind} '{name}' on {table}: no such key")]
    KeyNotFound {
        table: String,
        name: String,
        kind: IndexKind,
    },

    /// S008: A column parameter is out of range
    #[error("[S008] Invalid column {table}.{column}: {reason}")]
    InvalidColumn {
        table: String,
        column: String,
        reason: String,
    },

    /// S009: Underlying database failure
    #[error(transparent)]
    Database(#[from] DbError),
}

/// Result type alias for SchemaError
pub type SchemaResult<T> = Result<T, SchemaError>;
