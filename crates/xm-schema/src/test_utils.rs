//! In-memory backend that records statements instead of running them

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use xm_core::Dialect;
use xm_db::{Backend, ColumnInfo, DbError, DbResult, ForeignKeyInfo, IndexInfo};

#[derive(Debug, Default)]
struct Recorded {
    statements: Vec<String>,
    tables: BTreeMap<String, Vec<ColumnInfo>>,
    fail_on: Option<String>,
}

/// Backend for tests of dialects without a bundled engine.
///
/// Clones share state, so a test can keep one handle and give the other to a
/// [`Store`](crate::Store).
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    dialect: Dialect,
    state: Arc<Mutex<Recorded>>,
}

impl RecordingBackend {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            state: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    /// Pretend `table` exists with the given `(name, type)` columns
    pub fn with_table(self, table: &str, columns: &[(&str, &str)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, data_type)| ColumnInfo {
                name: name.to_string(),
                data_type: data_type.to_string(),
                nullable: true,
                default: None,
            })
            .collect();
        self.state().tables.insert(table.to_string(), columns);
        self
    }

    /// Fail any statement containing `fragment`
    pub fn fail_on(self, fragment: &str) -> Self {
        self.state().fail_on = Some(fragment.to_string());
        self
    }

    /// Statements executed so far
    pub fn statements(&self) -> Vec<String> {
        self.state().statements.clone()
    }

    pub fn clear(&self) {
        self.state().statements.clear();
    }

    fn state(&self) -> MutexGuard<'_, Recorded> {
        // A panicking test poisons the lock; the data is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Backend for RecordingBackend {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        let mut state = self.state();
        if let Some(fragment) = &state.fail_on {
            if sql.contains(fragment.as_str()) {
                return Err(DbError::ExecutionError {
                    message: format!("refusing statement containing '{}'", fragment),
                    sql: sql.to_string(),
                });
            }
        }
        state.statements.push(sql.to_string());
        Ok(0)
    }

    fn query_count(&self, _sql: &str) -> DbResult<usize> {
        Ok(0)
    }

    fn table_names(&self) -> DbResult<Vec<String>> {
        Ok(self.state().tables.keys().cloned().collect())
    }

    fn columns(&self, table: &str) -> DbResult<Vec<ColumnInfo>> {
        Ok(self.state().tables.get(table).cloned().unwrap_or_default())
    }

    fn primary_key(&self, _table: &str) -> DbResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn foreign_keys(&self, _table: &str) -> DbResult<Vec<ForeignKeyInfo>> {
        Ok(Vec::new())
    }

    fn indexes(&self, _table: &str) -> DbResult<Vec<IndexInfo>> {
        Ok(Vec::new())
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn db_type(&self) -> &'static str {
        "recording"
    }
}
