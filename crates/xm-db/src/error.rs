//! Error types for xm-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {message}\n  statement: {sql}")]
    ExecutionError { message: String, sql: String },

    /// Table not found (D003)
    #[error("[D003] Table not found: {0}")]
    TableNotFound(String),

    /// Introspection query failed (D004)
    #[error("[D004] Failed to introspect '{table}': {message}")]
    IntrospectionError { table: String, message: String },

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Wrap a driver error raised while running `sql`.
    ///
    /// duckdb::Error does not expose structured variants, so missing-table
    /// failures are recognised by message.
    pub fn from_statement(err: duckdb::Error, sql: &str) -> Self {
        let message = err.to_string();
        if message.contains("Table with name")
            || (message.contains("Catalog Error")
                && message.contains("Table")
                && message.contains("does not exist"))
        {
            DbError::TableNotFound(message)
        } else {
            DbError::ExecutionError {
                message,
                sql: sql.to_string(),
            }
        }
    }
}
