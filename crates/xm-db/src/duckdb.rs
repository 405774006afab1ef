//! DuckDB backend implementation
//!
//! Introspection reads DuckDB's catalog table functions (`duckdb_tables()`,
//! `duckdb_columns()`, `duckdb_constraints()`, `duckdb_indexes()`) scoped to
//! the `main` schema of the current database.

use crate::error::{DbError, DbResult};
use crate::traits::{Backend, ColumnInfo, ForeignKeyInfo, IndexInfo};
use duckdb::Connection;
use regex::Regex;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};
use xm_core::Dialect;

const CATALOG_SCOPE: &str = "database_name = current_database() AND schema_name = 'main'";

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Open a second handle onto the same database.
    ///
    /// For in-memory databases this is the only way to observe the same data
    /// from another owner.
    pub fn try_clone(&self) -> DbResult<Self> {
        let conn = self
            .lock()?
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Run a single-column string query bound to `table`
    fn query_strings(&self, table: &str, sql: &str) -> DbResult<Vec<String>> {
        let conn = self.lock()?;
        let introspection = |e: duckdb::Error| DbError::IntrospectionError {
            table: table.to_string(),
            message: e.to_string(),
        };
        let mut stmt = conn.prepare(sql).map_err(introspection)?;
        let rows = stmt
            .query_map(duckdb::params![table], |row| row.get::<_, String>(0))
            .map_err(introspection)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(introspection)
    }
}

impl Backend for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::from_statement(e, sql))
    }

    fn query_count(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let wrapped = format!("SELECT COUNT(*) FROM ({})", sql);
        let count: i64 = conn
            .query_row(&wrapped, [], |row| row.get(0))
            .map_err(|e| DbError::from_statement(e, sql))?;
        Ok(count as usize)
    }

    fn table_names(&self) -> DbResult<Vec<String>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT table_name FROM duckdb_tables() WHERE {CATALOG_SCOPE} ORDER BY table_name"
        );
        let introspection = |e: duckdb::Error| DbError::IntrospectionError {
            table: "*".to_string(),
            message: e.to_string(),
        };
        let mut stmt = conn.prepare(&sql).map_err(introspection)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(introspection)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(introspection)
    }

    fn columns(&self, table: &str) -> DbResult<Vec<ColumnInfo>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT column_name, data_type, is_nullable, column_default \
             FROM duckdb_columns() WHERE {CATALOG_SCOPE} AND table_name = ? \
             ORDER BY column_index"
        );
        let introspection = |e: duckdb::Error| DbError::IntrospectionError {
            table: table.to_string(),
            message: e.to_string(),
        };
        let mut stmt = conn.prepare(&sql).map_err(introspection)?;
        let rows = stmt
            .query_map(duckdb::params![table], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    data_type: row.get(1)?,
                    nullable: row.get(2)?,
                    default: row.get(3)?,
                })
            })
            .map_err(introspection)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(introspection)
    }

    fn primary_key(&self, table: &str) -> DbResult<Vec<String>> {
        let sql = format!(
            "SELECT unnest(constraint_column_names) FROM duckdb_constraints() \
             WHERE {CATALOG_SCOPE} AND table_name = ? AND constraint_type = 'PRIMARY KEY'"
        );
        self.query_strings(table, &sql)
    }

    fn foreign_keys(&self, table: &str) -> DbResult<Vec<ForeignKeyInfo>> {
        let sql = format!(
            "SELECT constraint_text FROM duckdb_constraints() \
             WHERE {CATALOG_SCOPE} AND table_name = ? AND constraint_type = 'FOREIGN KEY' \
             ORDER BY constraint_index"
        );
        let texts = self.query_strings(table, &sql)?;
        Ok(texts
            .iter()
            .filter_map(|text| {
                let parsed = parse_foreign_key(text);
                if parsed.is_none() {
                    log::debug!("Skipping unrecognised constraint on {}: {}", table, text);
                }
                parsed
            })
            .collect())
    }

    fn indexes(&self, table: &str) -> DbResult<Vec<IndexInfo>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT index_name, is_unique, sql FROM duckdb_indexes() \
             WHERE {CATALOG_SCOPE} AND table_name = ? ORDER BY index_name"
        );
        let introspection = |e: duckdb::Error| DbError::IntrospectionError {
            table: table.to_string(),
            message: e.to_string(),
        };
        let mut stmt = conn.prepare(&sql).map_err(introspection)?;
        let rows = stmt
            .query_map(duckdb::params![table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })
            .map_err(introspection)?;

        let mut indexes = Vec::new();
        for row in rows {
            let (name, unique, ddl) = row.map_err(introspection)?;
            let columns = ddl.as_deref().map(index_columns).unwrap_or_default();
            if columns.is_empty() {
                log::warn!("Could not determine columns of index {} on {}", name, table);
                continue;
            }
            indexes.push(IndexInfo {
                name,
                columns,
                unique,
            });
        }
        Ok(indexes)
    }

    fn dialect(&self) -> Dialect {
        Dialect::DuckDb
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

fn foreign_key_regex() -> &'static Regex {
    static FOREIGN_KEY_RE: OnceLock<Regex> = OnceLock::new();
    FOREIGN_KEY_RE.get_or_init(|| {
        Regex::new(r"(?i)FOREIGN\s+KEY\s*\(([^)]*)\)\s*REFERENCES\s+([^\s(]+)\s*\(([^)]*)\)")
            .expect("valid regex")
    })
}

fn index_columns_regex() -> &'static Regex {
    static INDEX_COLUMNS_RE: OnceLock<Regex> = OnceLock::new();
    INDEX_COLUMNS_RE.get_or_init(|| Regex::new(r"\(([^()]*)\)\s*;?\s*$").expect("valid regex"))
}

fn unquote(ident: &str) -> String {
    ident
        .trim()
        .trim_matches('"')
        .replace("\"\"", "\"")
}

fn split_idents(list: &str) -> Vec<String> {
    list.split(',')
        .map(unquote)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse `FOREIGN KEY (a) REFERENCES t(b)` as rendered by `duckdb_constraints()`
fn parse_foreign_key(text: &str) -> Option<ForeignKeyInfo> {
    let caps = foreign_key_regex().captures(text)?;
    let columns = split_idents(caps.get(1)?.as_str());
    let qualified = caps.get(2)?.as_str();
    let ref_table = unquote(qualified.rsplit('.').next().unwrap_or(qualified));
    let ref_columns = split_idents(caps.get(3)?.as_str());
    if columns.is_empty() || ref_columns.is_empty() {
        return None;
    }
    Some(ForeignKeyInfo {
        name: None,
        columns,
        ref_table,
        ref_columns,
        on_delete: None,
        on_update: None,
    })
}

/// Extract the key columns from a `CREATE [UNIQUE] INDEX ... ON t (cols)` statement
fn index_columns(ddl: &str) -> Vec<String> {
    index_columns_regex()
        .captures(ddl)
        .and_then(|caps| caps.get(1))
        .map(|m| split_idents(m.as_str()))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
