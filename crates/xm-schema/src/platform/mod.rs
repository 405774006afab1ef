//! Dialect platforms: DDL statement generation
//!
//! A [`Platform`] is chosen once per [`Store`](crate::Store) from the backend's
//! dialect. The trait's provided methods produce ANSI-shaped statements; each
//! dialect overrides only where its syntax differs.

mod duckdb;
mod mssql;
mod mysql;
mod postgres;
mod sqlite;

pub use self::duckdb::DuckDbPlatform;
pub use self::mssql::MsSqlPlatform;
pub use self::mysql::MySqlPlatform;
pub use self::postgres::PostgresPlatform;
pub use self::sqlite::SqlitePlatform;

use crate::column::DefaultValue;
use crate::error::SchemaResult;
use crate::index::{IndexDescriptor, IndexKind};
use crate::typemap::{ColumnDef, ForeignKeyDef};
use xm_core::sql_utils::{quote_ident, quote_string};
use xm_core::Dialect;
use xm_db::ColumnInfo;

/// What a dialect can do in place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Keys can be added and dropped with ALTER TABLE; otherwise alters
    /// rebuild the table
    pub incremental_alter: bool,
    /// ON DELETE / ON UPDATE actions are accepted on foreign keys
    pub foreign_key_actions: bool,
    /// Constraint names are accepted and kept
    pub named_constraints: bool,
}

/// Select the platform for a dialect
pub fn platform_for(dialect: Dialect) -> Box<dyn Platform> {
    match dialect {
        Dialect::DuckDb => Box::new(DuckDbPlatform),
        Dialect::Postgres => Box::new(PostgresPlatform),
        Dialect::MySql => Box::new(MySqlPlatform),
        Dialect::MsSql => Box::new(MsSqlPlatform),
        Dialect::Sqlite => Box::new(SqlitePlatform),
    }
}

/// DDL generation for one dialect
pub trait Platform: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn capabilities(&self) -> Capabilities;

    /// Quote an identifier
    fn quote_ident(&self, ident: &str) -> String {
        quote_ident(ident)
    }

    fn quote_list(&self, idents: &[String]) -> String {
        idents
            .iter()
            .map(|i| self.quote_ident(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render a default value as a SQL literal or expression
    fn render_default(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Boolean(true) => "TRUE".to_string(),
            DefaultValue::Boolean(false) => "FALSE".to_string(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::Text(s) => quote_string(s),
            DefaultValue::Expression(sql) => sql.clone(),
        }
    }

    /// Column attribute that makes the store generate values, if the dialect
    /// does not already express it through the native type
    fn autoincrement_clause(&self, _table: &str, _column: &ColumnDef) -> Option<String> {
        None
    }

    /// Statements that must run before a table with these columns is created
    fn prelude_sql(&self, _table: &str, _columns: &[ColumnDef]) -> Vec<String> {
        Vec::new()
    }

    /// Column definition without key constraints:
    /// name, type, generation, nullability, default and enum check
    fn column_sql(&self, table: &str, column: &ColumnDef) -> String {
        let mut sql = format!("{} {}", self.quote_ident(&column.name), column.native.name);

        let generated = if column.autoincrement {
            self.autoincrement_clause(table, column)
        } else {
            None
        };
        let has_generation = generated.is_some();
        if let Some(clause) = generated {
            sql.push(' ');
            sql.push_str(&clause);
        }

        if !column.nullable {
            sql.push_str(" NOT NULL");
        }

        if let Some(default) = column.default.as_ref().filter(|_| !has_generation) {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.render_default(default));
        }

        if !column.native.allowed_values.is_empty() {
            let values = column
                .native
                .allowed_values
                .iter()
                .map(|v| quote_string(v))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(
                " CHECK ({} IN ({}))",
                self.quote_ident(&column.name),
                values
            ));
        }

        sql
    }

    /// Table-level PRIMARY KEY clause
    fn primary_key_clause(&self, name: Option<&str>, columns: &[String]) -> String {
        match name.filter(|_| self.capabilities().named_constraints) {
            Some(name) => format!(
                "CONSTRAINT {} PRIMARY KEY ({})",
                self.quote_ident(name),
                self.quote_list(columns)
            ),
            None => format!("PRIMARY KEY ({})", self.quote_list(columns)),
        }
    }

    /// Table-level FOREIGN KEY clause
    fn foreign_key_clause(&self, fk: &ForeignKeyDef) -> String {
        let caps = self.capabilities();
        let mut sql = String::new();
        if caps.named_constraints {
            sql.push_str(&format!("CONSTRAINT {} ", self.quote_ident(&fk.name)));
        }
        sql.push_str(&format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote_ident(&fk.column),
            self.quote_ident(&fk.ref_table),
            self.quote_ident(&fk.ref_column)
        ));

        if caps.foreign_key_actions {
            if let Some(action) = fk.on_delete {
                sql.push_str(&format!(" ON DELETE {}", action));
            }
            if let Some(action) = fk.on_update {
                sql.push_str(&format!(" ON UPDATE {}", action));
            }
        } else if fk.on_delete.is_some() || fk.on_update.is_some() {
            log::warn!(
                "{} does not support referential actions; ignoring them on foreign key {}",
                self.dialect(),
                fk.name
            );
        }
        sql
    }

    /// CREATE TABLE plus the statements it depends on and the secondary
    /// indexes that follow it
    fn create_table_sql(
        &self,
        table: &str,
        columns: &[ColumnDef],
        indexes: &[IndexDescriptor],
    ) -> Vec<String> {
        let mut statements = self.prelude_sql(table, columns);

        let mut defs: Vec<String> = columns.iter().map(|c| self.column_sql(table, c)).collect();

        let primary: Vec<String> = columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.clone())
            .collect();
        if !primary.is_empty() {
            let name = indexes
                .iter()
                .find(|idx| idx.kind() == IndexKind::Primary)
                .map(|idx| idx.name());
            defs.push(self.primary_key_clause(name, &primary));
        }

        for fk in columns.iter().flat_map(|c| c.foreign_keys.iter()) {
            defs.push(self.foreign_key_clause(fk));
        }

        statements.push(format!(
            "CREATE TABLE {} ({})",
            self.quote_ident(table),
            defs.join(", ")
        ));

        statements.extend(indexes.iter().filter_map(|idx| self.create_index_sql(table, idx)));
        statements
    }

    /// Add one column to an existing table
    fn add_column_sql(&self, table: &str, column: &ColumnDef) -> Vec<String> {
        let mut statements = self.prelude_sql(table, std::slice::from_ref(column));
        statements.push(format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote_ident(table),
            self.column_sql(table, column)
        ));
        statements
    }

    fn add_primary_key_sql(&self, table: &str, index: &IndexDescriptor) -> String {
        format!(
            "ALTER TABLE {} ADD {}",
            self.quote_ident(table),
            self.primary_key_clause(Some(index.name()), index.columns())
        )
    }

    fn add_foreign_key_sql(&self, table: &str, fk: &ForeignKeyDef) -> String {
        format!(
            "ALTER TABLE {} ADD {}",
            self.quote_ident(table),
            self.foreign_key_clause(fk)
        )
    }

    /// CREATE [UNIQUE] INDEX for unique and plain indexes; `None` for other kinds
    fn create_index_sql(&self, table: &str, index: &IndexDescriptor) -> Option<String> {
        let unique = match index.kind() {
            IndexKind::Unique => "UNIQUE ",
            IndexKind::Index => "",
            IndexKind::Primary | IndexKind::Foreign => return None,
        };
        Some(format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique,
            self.quote_ident(index.name()),
            self.quote_ident(table),
            self.quote_list(index.columns())
        ))
    }

    /// Drop a key or index. `column` is the live metadata of the key's first
    /// column, which some dialects need to rewrite before the drop.
    fn drop_key_sql(
        &self,
        table: &str,
        _column: Option<&ColumnInfo>,
        index: &IndexDescriptor,
    ) -> SchemaResult<Vec<String>> {
        let sql = match index.kind() {
            IndexKind::Primary | IndexKind::Foreign => format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                self.quote_ident(table),
                self.quote_ident(index.name())
            ),
            IndexKind::Unique | IndexKind::Index => {
                format!("DROP INDEX {}", self.quote_ident(index.name()))
            }
        };
        Ok(vec![sql])
    }

    fn rename_sql(&self, from: &str, to: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote_ident(from),
            self.quote_ident(to)
        )
    }

    /// One DROP COLUMN statement per column
    fn drop_columns_sql(&self, table: &str, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|c| {
                format!(
                    "ALTER TABLE {} DROP COLUMN {}",
                    self.quote_ident(table),
                    self.quote_ident(c)
                )
            })
            .collect()
    }

    fn drop_table_sql(&self, table: &str, if_exists: bool) -> String {
        if if_exists {
            format!("DROP TABLE IF EXISTS {}", self.quote_ident(table))
        } else {
            format!("DROP TABLE {}", self.quote_ident(table))
        }
    }
}

#[cfg(test)]
#[path = "platform_test.rs"]
mod tests;
