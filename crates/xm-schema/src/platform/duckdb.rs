//! DuckDB platform
//!
//! DuckDB cannot add or drop constraints on an existing table, so alters use
//! the recreate strategy. Auto-increment columns draw from a per-column
//! sequence. Constraint names are not kept by DuckDB and referential actions
//! are rejected, so neither is emitted.

use super::{Capabilities, Platform};
use crate::typemap::ColumnDef;
use xm_core::sql_utils::quote_string;
use xm_core::Dialect;

pub struct DuckDbPlatform;

impl DuckDbPlatform {
    /// Name of the sequence backing an auto-increment column
    pub fn sequence_name(table: &str, column: &str) -> String {
        format!("{}_{}_seq", table, column)
    }
}

impl Platform for DuckDbPlatform {
    fn dialect(&self) -> Dialect {
        Dialect::DuckDb
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            incremental_alter: false,
            foreign_key_actions: false,
            named_constraints: false,
        }
    }

    fn autoincrement_clause(&self, table: &str, column: &ColumnDef) -> Option<String> {
        Some(format!(
            "DEFAULT nextval({})",
            quote_string(&Self::sequence_name(table, &column.name))
        ))
    }

    fn prelude_sql(&self, table: &str, columns: &[ColumnDef]) -> Vec<String> {
        columns
            .iter()
            .filter(|c| c.autoincrement)
            .map(|c| {
                format!(
                    "CREATE SEQUENCE IF NOT EXISTS {}",
                    self.quote_ident(&Self::sequence_name(table, &c.name))
                )
            })
            .collect()
    }
}
