//! Backend trait definition

use crate::error::DbResult;
use xm_core::Dialect;

/// Live column metadata as reported by the backing store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Native type exactly as the store reports it (e.g. `DECIMAL(8,2)`)
    pub data_type: String,
    /// Whether NULL values are accepted
    pub nullable: bool,
    /// Raw default expression, if any
    pub default: Option<String>,
}

/// Live foreign-key metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    /// Constraint name, when the store keeps one
    pub name: Option<String>,
    /// Referencing columns on the inspected table
    pub columns: Vec<String>,
    /// Referenced table
    pub ref_table: String,
    /// Referenced columns
    pub ref_columns: Vec<String>,
    /// ON DELETE action as reported, if any
    pub on_delete: Option<String>,
    /// ON UPDATE action as reported, if any
    pub on_update: Option<String>,
}

/// Live secondary index metadata (primary keys are reported separately)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    /// Index name
    pub name: String,
    /// Indexed columns, in key order
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness
    pub unique: bool,
}

/// The raw capabilities the schema engine needs from a backing store:
/// execute a statement, and introspect table metadata.
///
/// All calls are synchronous and block until the store answers.
pub trait Backend: Send {
    /// Execute a single statement, returning affected rows
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute a query returning its row count
    fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Names of the tables in the default schema, sorted
    fn table_names(&self) -> DbResult<Vec<String>>;

    /// Columns of `table` in ordinal order; empty if the table is missing
    fn columns(&self, table: &str) -> DbResult<Vec<ColumnInfo>>;

    /// Primary key columns of `table`, in key order
    fn primary_key(&self, table: &str) -> DbResult<Vec<String>>;

    /// Foreign keys declared on `table`
    fn foreign_keys(&self, table: &str) -> DbResult<Vec<ForeignKeyInfo>>;

    /// Secondary indexes declared on `table`
    fn indexes(&self, table: &str) -> DbResult<Vec<IndexInfo>>;

    /// Dialect of the statements this backend accepts
    fn dialect(&self) -> Dialect;

    /// Backend type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Whether `table` exists
    fn table_exists(&self, table: &str) -> DbResult<bool> {
        Ok(self.table_names()?.iter().any(|t| t == table))
    }

    /// Column names of `table` in ordinal order
    fn column_names(&self, table: &str) -> DbResult<Vec<String>> {
        Ok(self.columns(table)?.into_iter().map(|c| c.name).collect())
    }
}
