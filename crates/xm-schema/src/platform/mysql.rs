//! MySQL platform

use super::{Capabilities, Platform};
use crate::error::{SchemaError, SchemaResult};
use crate::index::{IndexDescriptor, IndexKind};
use crate::typemap::ColumnDef;
use xm_core::sql_utils::quote_ident_with;
use xm_core::Dialect;
use xm_db::ColumnInfo;

pub struct MySqlPlatform;

impl Platform for MySqlPlatform {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            incremental_alter: true,
            foreign_key_actions: true,
            named_constraints: true,
        }
    }

    fn quote_ident(&self, ident: &str) -> String {
        quote_ident_with(ident, '`', '`')
    }

    fn autoincrement_clause(&self, _table: &str, _column: &ColumnDef) -> Option<String> {
        Some("AUTO_INCREMENT".to_string())
    }

    // The primary key is always called PRIMARY; a CONSTRAINT name is ignored.
    fn primary_key_clause(&self, _name: Option<&str>, columns: &[String]) -> String {
        format!("PRIMARY KEY ({})", self.quote_list(columns))
    }

    fn rename_sql(&self, from: &str, to: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            self.quote_ident(from),
            self.quote_ident(to)
        )
    }

    /// A primary key on an AUTO_INCREMENT column cannot be dropped directly:
    /// the column is first redefined without it, then the key is dropped.
    fn drop_key_sql(
        &self,
        table: &str,
        column: Option<&ColumnInfo>,
        index: &IndexDescriptor,
    ) -> SchemaResult<Vec<String>> {
        let table_q = self.quote_ident(table);
        let statements = match index.kind() {
            IndexKind::Primary => {
                let column = column.ok_or_else(|| SchemaError::KeyColumnNotFound {
                    table: table.to_string(),
                    name: index.name().to_string(),
                    kind: IndexKind::Primary,
                    column: index.columns().first().cloned().unwrap_or_default(),
                })?;
                let col_q = self.quote_ident(&column.name);
                vec![
                    format!(
                        "ALTER TABLE {} CHANGE {} {} {} NOT NULL",
                        table_q, col_q, col_q, column.data_type
                    ),
                    format!("ALTER TABLE {} DROP PRIMARY KEY", table_q),
                ]
            }
            IndexKind::Foreign => vec![format!(
                "ALTER TABLE {} DROP FOREIGN KEY {}",
                table_q,
                self.quote_ident(index.name())
            )],
            IndexKind::Unique | IndexKind::Index => vec![format!(
                "ALTER TABLE {} DROP INDEX {}",
                table_q,
                self.quote_ident(index.name())
            )],
        };
        Ok(statements)
    }
}
