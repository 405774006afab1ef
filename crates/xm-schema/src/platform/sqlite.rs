//! SQLite platform
//!
//! SQLite only adds columns and renames tables in place, so every alter goes
//! through [`RecreateTablePlatform`](crate::RecreateTablePlatform). A
//! single-column INTEGER primary key already aliases the rowid, which makes
//! auto-increment implicit.

use super::{Capabilities, Platform};
use crate::column::DefaultValue;
use crate::typemap::ColumnDef;
use xm_core::sql_utils::quote_string;
use xm_core::Dialect;

pub struct SqlitePlatform;

impl Platform for SqlitePlatform {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            incremental_alter: false,
            foreign_key_actions: true,
            named_constraints: true,
        }
    }

    fn render_default(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Boolean(true) => "1".to_string(),
            DefaultValue::Boolean(false) => "0".to_string(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::Text(s) => quote_string(s),
            DefaultValue::Expression(sql) => format!("({})", sql),
        }
    }

    fn autoincrement_clause(&self, _table: &str, _column: &ColumnDef) -> Option<String> {
        None
    }
}
