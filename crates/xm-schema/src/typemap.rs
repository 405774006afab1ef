//! Mapping of abstract column types to native dialect types
//!
//! [`TypeMapper::resolve`] is total: every token maps to some native type,
//! and unknown tokens fall back to the dialect's generic text type.
//! [`TypeMapper::columns_and_indexes`] turns a [`Blueprint`] into resolved
//! column definitions plus the de-duplicated list of keys to create.

use crate::blueprint::Blueprint;
use crate::column::{Column, ColumnParams, DefaultValue, TypeToken};
use crate::error::{SchemaError, SchemaResult};
use crate::foreign_key::{ForeignKey, ReferentialAction};
use crate::index::{IndexDescriptor, IndexKind};
use std::collections::HashSet;
use xm_core::sql_utils::quote_string;
use xm_core::Dialect;

/// Deepest array nesting accepted for a column
pub const MAX_ARRAY_DIMENSIONS: u32 = 6;

/// A native column type for one dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    /// Type as written in DDL, e.g. `VARCHAR(255)` or `INT UNSIGNED`
    pub name: String,
    /// Values enforced with a CHECK constraint on dialects without an enum type
    pub allowed_values: Vec<String>,
}

impl NativeType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allowed_values: Vec::new(),
        }
    }
}

/// A fully specified foreign key constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub name: String,
    pub column: String,
    pub ref_table: String,
    pub ref_column: String,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

/// A resolved column, ready for DDL generation
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub native: NativeType,
    pub nullable: bool,
    pub default: Option<DefaultValue>,
    pub primary_key: bool,
    pub autoincrement: bool,
    pub foreign_keys: Vec<ForeignKeyDef>,
}

impl ColumnDef {
    /// A nullable column of the given native type, without keys
    pub fn plain(name: impl Into<String>, native: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native: NativeType::new(native),
            nullable: true,
            default: None,
            primary_key: false,
            autoincrement: false,
            foreign_keys: Vec::new(),
        }
    }
}

/// Output of [`TypeMapper::columns_and_indexes`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolved {
    /// Columns in blueprint declaration order
    pub columns: Vec<ColumnDef>,
    /// One descriptor per distinct key name (primary, unique, index)
    pub indexes: Vec<IndexDescriptor>,
    /// Foreign keys whose column is not declared in the blueprint
    pub foreign_keys: Vec<ForeignKeyDef>,
}

/// Resolves abstract column types for one dialect
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper {
    dialect: Dialect,
}

impl TypeMapper {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The dialect's generic text type, also used for unknown tokens
    pub fn fallback_text(&self) -> &'static str {
        match self.dialect {
            Dialect::DuckDb => "VARCHAR",
            Dialect::MsSql => "NVARCHAR(MAX)",
            Dialect::Postgres | Dialect::MySql | Dialect::Sqlite => "TEXT",
        }
    }

    /// Map a type token and its parameters to a native type
    pub fn resolve(&self, token: &TypeToken, params: &ColumnParams, unsigned: bool) -> NativeType {
        match token {
            TypeToken::Enum => return self.resolve_enum(&params.fields),
            TypeToken::Array => return self.resolve_array(params),
            TypeToken::Unknown(name) => {
                let fallback = self.fallback_text();
                log::warn!(
                    "Unknown column type '{}' for {}; falling back to {}",
                    name,
                    self.dialect,
                    fallback
                );
                return NativeType::new(fallback);
            }
            _ => {}
        }

        if token.is_integer() {
            return NativeType::new(self.integer_type(token, params.autoincrement, unsigned));
        }

        let name = match self.dialect {
            Dialect::DuckDb => duckdb_type(token, params),
            Dialect::Postgres => postgres_type(token, params),
            Dialect::MySql => mysql_type(token, params),
            Dialect::MsSql => mssql_type(token, params),
            Dialect::Sqlite => sqlite_type(token, params),
        };
        NativeType::new(name)
    }

    fn integer_type(&self, token: &TypeToken, autoincrement: bool, unsigned: bool) -> String {
        let base = match (self.dialect, token) {
            (Dialect::Sqlite, _) => "INTEGER",
            (_, TypeToken::BigInteger) => "BIGINT",
            (Dialect::MySql, TypeToken::MediumInteger) => "MEDIUMINT",
            (Dialect::MySql | Dialect::MsSql, TypeToken::Integer | TypeToken::MediumInteger) => {
                "INT"
            }
            (_, TypeToken::SmallInteger) => "SMALLINT",
            _ => "INTEGER",
        };

        match self.dialect {
            Dialect::Postgres if autoincrement => match base {
                "BIGINT" => "BIGSERIAL".to_string(),
                "SMALLINT" => "SMALLSERIAL".to_string(),
                _ => "SERIAL".to_string(),
            },
            // Auto-increment keys are always unsigned on MySQL
            Dialect::MySql if unsigned || autoincrement => format!("{} UNSIGNED", base),
            Dialect::DuckDb if unsigned => format!("U{}", base),
            _ => base.to_string(),
        }
    }

    fn resolve_enum(&self, fields: &[String]) -> NativeType {
        let quoted = fields
            .iter()
            .map(|f| quote_string(f))
            .collect::<Vec<_>>()
            .join(", ");
        match self.dialect {
            Dialect::DuckDb | Dialect::MySql if !fields.is_empty() => NativeType {
                name: format!("ENUM({})", quoted),
                allowed_values: Vec::new(),
            },
            Dialect::MsSql => NativeType {
                name: "NVARCHAR(255)".to_string(),
                allowed_values: fields.to_vec(),
            },
            _ => NativeType {
                name: "VARCHAR(255)".to_string(),
                allowed_values: fields.to_vec(),
            },
        }
    }

    fn resolve_array(&self, params: &ColumnParams) -> NativeType {
        let dims = params
            .dimensions
            .unwrap_or(1)
            .clamp(1, MAX_ARRAY_DIMENSIONS) as usize;
        match self.dialect {
            Dialect::DuckDb | Dialect::Postgres => {
                let element = params
                    .element
                    .as_deref()
                    .cloned()
                    .unwrap_or(TypeToken::Text);
                let inner = if element == TypeToken::Array {
                    self.fallback_text().to_string()
                } else {
                    self.resolve(&element, &ColumnParams::default(), false).name
                };
                NativeType::new(format!("{}{}", inner, "[]".repeat(dims)))
            }
            _ => {
                let stored = match self.dialect {
                    Dialect::MySql => "JSON",
                    _ => self.fallback_text(),
                };
                log::warn!(
                    "{} has no array type; storing array column as {}",
                    self.dialect,
                    stored
                );
                NativeType::new(stored)
            }
        }
    }

    /// Resolve a single declared column (without key information)
    pub fn column_def(&self, column: &Column) -> ColumnDef {
        ColumnDef {
            name: column.name().to_string(),
            native: self.resolve(column.token(), column.params(), column.is_unsigned()),
            nullable: column.is_nullable(),
            default: column.default_value().cloned(),
            primary_key: false,
            autoincrement: column.params().autoincrement,
            foreign_keys: Vec::new(),
        }
    }

    /// Convert a blueprint into resolved columns and keys.
    ///
    /// Columns keep declaration order. A key spanning several columns is
    /// emitted once, at its first column; keys on columns the blueprint does
    /// not declare follow in declaration order.
    pub fn columns_and_indexes(&self, blueprint: &Blueprint) -> SchemaResult<Resolved> {
        let table = blueprint.table();
        let mut used: HashSet<&str> = HashSet::new();
        let mut resolved = Resolved::default();

        for column in blueprint.columns() {
            if let Some(dims) = column.params().dimensions {
                if dims > MAX_ARRAY_DIMENSIONS {
                    return Err(SchemaError::InvalidColumn {
                        table: table.to_string(),
                        column: column.name().to_string(),
                        reason: format!(
                            "{} array dimensions requested, at most {} are supported",
                            dims, MAX_ARRAY_DIMENSIONS
                        ),
                    });
                }
            }
            let mut def = self.column_def(column);

            for idx in blueprint.indexes().iter().filter(|i| i.covers(column.name())) {
                if idx.kind() == IndexKind::Primary {
                    def.primary_key = true;
                }
                if used.insert(idx.name()) {
                    resolved.indexes.push(idx.clone());
                }
            }

            for fk in blueprint
                .foreign_keys()
                .iter()
                .filter(|fk| fk.column() == column.name())
            {
                def.foreign_keys.push(foreign_key_def(table, fk)?);
            }

            resolved.columns.push(def);
        }

        for idx in blueprint.indexes() {
            if used.insert(idx.name()) {
                resolved.indexes.push(idx.clone());
            }
        }

        for fk in blueprint.foreign_keys() {
            let declared = blueprint.columns().iter().any(|c| c.name() == fk.column());
            if !declared {
                resolved.foreign_keys.push(foreign_key_def(table, fk)?);
            }
        }

        Ok(resolved)
    }
}

fn foreign_key_def(table: &str, fk: &ForeignKey) -> SchemaResult<ForeignKeyDef> {
    let incomplete = |missing| SchemaError::IncompleteForeignKey {
        table: table.to_string(),
        column: fk.column().to_string(),
        name: fk.name().to_string(),
        missing,
    };
    let ref_table = fk
        .ref_table()
        .ok_or_else(|| incomplete("referenced table (on)"))?;
    let ref_column = fk
        .ref_column()
        .ok_or_else(|| incomplete("referenced column (references)"))?;
    Ok(ForeignKeyDef {
        name: fk.name().to_string(),
        column: fk.column().to_string(),
        ref_table: ref_table.to_string(),
        ref_column: ref_column.to_string(),
        on_delete: fk.delete_action(),
        on_update: fk.update_action(),
    })
}

fn sized(base: &str, length: Option<u32>) -> String {
    match length {
        Some(len) => format!("{}({})", base, len),
        None => base.to_string(),
    }
}

fn numeric(base: &str, params: &ColumnParams) -> String {
    match (params.precision, params.scale) {
        (Some(p), Some(s)) => format!("{}({},{})", base, p, s),
        (Some(p), None) => format!("{}({})", base, p),
        _ => base.to_string(),
    }
}

fn duckdb_type(token: &TypeToken, params: &ColumnParams) -> String {
    match token {
        TypeToken::Decimal => numeric("DECIMAL", params),
        TypeToken::Double => "DOUBLE".to_string(),
        TypeToken::Float => "FLOAT".to_string(),
        TypeToken::Char | TypeToken::String => sized("VARCHAR", params.length),
        TypeToken::Date => "DATE".to_string(),
        TypeToken::DateTime | TypeToken::Timestamp => "TIMESTAMP".to_string(),
        TypeToken::Time => "TIME".to_string(),
        TypeToken::Binary => "BLOB".to_string(),
        TypeToken::Boolean => "BOOLEAN".to_string(),
        _ => "VARCHAR".to_string(),
    }
}

fn postgres_type(token: &TypeToken, params: &ColumnParams) -> String {
    match token {
        TypeToken::Decimal => numeric("NUMERIC", params),
        TypeToken::Double => "DOUBLE PRECISION".to_string(),
        TypeToken::Float => "REAL".to_string(),
        TypeToken::Char => sized("CHAR", params.length),
        TypeToken::String => sized("VARCHAR", params.length),
        TypeToken::Date => "DATE".to_string(),
        TypeToken::DateTime | TypeToken::Timestamp => "TIMESTAMP".to_string(),
        TypeToken::Time => "TIME".to_string(),
        TypeToken::Binary => "BYTEA".to_string(),
        TypeToken::Boolean => "BOOLEAN".to_string(),
        TypeToken::Json => "JSONB".to_string(),
        _ => "TEXT".to_string(),
    }
}

fn mysql_type(token: &TypeToken, params: &ColumnParams) -> String {
    match token {
        TypeToken::Decimal => numeric("DECIMAL", params),
        TypeToken::Double => numeric("DOUBLE", params),
        TypeToken::Float => "FLOAT".to_string(),
        TypeToken::Char => sized("CHAR", params.length),
        TypeToken::String => sized("VARCHAR", Some(params.length.unwrap_or(255))),
        TypeToken::MediumText => "MEDIUMTEXT".to_string(),
        TypeToken::LongText => "LONGTEXT".to_string(),
        TypeToken::Date => "DATE".to_string(),
        TypeToken::DateTime => "DATETIME".to_string(),
        TypeToken::Timestamp => "TIMESTAMP".to_string(),
        TypeToken::Time => "TIME".to_string(),
        TypeToken::Binary => "BLOB".to_string(),
        TypeToken::Boolean => "BOOLEAN".to_string(),
        TypeToken::Json => "JSON".to_string(),
        _ => "TEXT".to_string(),
    }
}

fn mssql_type(token: &TypeToken, params: &ColumnParams) -> String {
    match token {
        TypeToken::Decimal => numeric("DECIMAL", params),
        TypeToken::Double => "FLOAT".to_string(),
        TypeToken::Float => "REAL".to_string(),
        TypeToken::Char => sized("NCHAR", params.length),
        TypeToken::String => sized("NVARCHAR", Some(params.length.unwrap_or(255))),
        TypeToken::Date => "DATE".to_string(),
        // TIMESTAMP is a row version on SQL Server, not a point in time
        TypeToken::DateTime | TypeToken::Timestamp => "DATETIME2".to_string(),
        TypeToken::Time => "TIME".to_string(),
        TypeToken::Binary => "VARBINARY(MAX)".to_string(),
        TypeToken::Boolean => "BIT".to_string(),
        _ => "NVARCHAR(MAX)".to_string(),
    }
}

fn sqlite_type(token: &TypeToken, params: &ColumnParams) -> String {
    match token {
        TypeToken::Decimal => numeric("NUMERIC", params),
        TypeToken::Double | TypeToken::Float => "REAL".to_string(),
        TypeToken::Char => sized("CHAR", params.length),
        TypeToken::String => sized("VARCHAR", params.length),
        TypeToken::Date => "DATE".to_string(),
        TypeToken::DateTime => "DATETIME".to_string(),
        TypeToken::Timestamp => "TIMESTAMP".to_string(),
        TypeToken::Time => "TIME".to_string(),
        TypeToken::Binary => "BLOB".to_string(),
        TypeToken::Boolean => "BOOLEAN".to_string(),
        _ => "TEXT".to_string(),
    }
}

#[cfg(test)]
#[path = "typemap_test.rs"]
mod tests;
