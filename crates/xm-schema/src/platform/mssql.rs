//! SQL Server platform

use super::{Capabilities, Platform};
use crate::column::DefaultValue;
use crate::error::SchemaResult;
use crate::index::{IndexDescriptor, IndexKind};
use crate::typemap::ColumnDef;
use xm_core::sql_utils::{quote_ident_with, quote_string};
use xm_core::Dialect;
use xm_db::ColumnInfo;

pub struct MsSqlPlatform;

impl Platform for MsSqlPlatform {
    fn dialect(&self) -> Dialect {
        Dialect::MsSql
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            incremental_alter: true,
            foreign_key_actions: true,
            named_constraints: true,
        }
    }

    fn quote_ident(&self, ident: &str) -> String {
        quote_ident_with(ident, '[', ']')
    }

    fn render_default(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Boolean(true) => "1".to_string(),
            DefaultValue::Boolean(false) => "0".to_string(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::Text(s) => format!("N{}", quote_string(s)),
            DefaultValue::Expression(sql) => sql.clone(),
        }
    }

    fn autoincrement_clause(&self, _table: &str, _column: &ColumnDef) -> Option<String> {
        Some("IDENTITY(1,1)".to_string())
    }

    fn add_column_sql(&self, table: &str, column: &ColumnDef) -> Vec<String> {
        vec![format!(
            "ALTER TABLE {} ADD {}",
            self.quote_ident(table),
            self.column_sql(table, column)
        )]
    }

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
            IndexKind::Unique | IndexKind::Index => format!(
                "DROP INDEX {} ON {}",
                self.quote_ident(index.name()),
                self.quote_ident(table)
            ),
        };
        Ok(vec![sql])
    }

    fn rename_sql(&self, from: &str, to: &str) -> String {
        format!("EXEC sp_rename {}, {}", quote_string(from), quote_string(to))
    }
}
