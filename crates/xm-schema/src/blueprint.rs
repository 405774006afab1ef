//! Table blueprints
//!
//! A [`Blueprint`] accumulates the columns, keys, foreign keys and drops
//! requested for one table. It never touches the backing store; the
//! [`Store`](crate::Store) consumes it.

use crate::column::{Column, ColumnParams, TypeToken};
use crate::error::{SchemaError, SchemaResult};
use crate::foreign_key::ForeignKey;
use crate::index::{default_index_name, IndexDescriptor, IndexKind, IntoColumns};

/// Prefix reserved for the temporary tables of the recreate strategy
pub const TEMP_TABLE_PREFIX: &str = "__tmp__";

/// Whether the blueprint creates a new table or alters an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlueprintAction {
    Create,
    #[default]
    Alter,
}

/// Columns and keys scheduled for removal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dropped {
    pub columns: Vec<String>,
    pub indexes: Vec<IndexDescriptor>,
}

impl Dropped {
    /// Names of dropped keys of the given kind
    pub fn index_names(&self, kind: IndexKind) -> impl Iterator<Item = &str> {
        self.indexes
            .iter()
            .filter(move |idx| idx.kind() == kind)
            .map(|idx| idx.name())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.indexes.is_empty()
    }
}

/// Declarations for one table operation
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    table: String,
    action: BlueprintAction,
    columns: Vec<Column>,
    indexes: Vec<IndexDescriptor>,
    foreign_keys: Vec<ForeignKey>,
    dropped: Dropped,
}

impl Blueprint {
    /// Start an (alter) blueprint for `table`
    pub fn new(table: &str) -> SchemaResult<Self> {
        validate_table_name(table)?;
        Ok(Self {
            table: table.to_string(),
            action: BlueprintAction::Alter,
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            dropped: Dropped::default(),
        })
    }

    /// Mark this blueprint as creating the table
    pub fn create(&mut self) -> &mut Self {
        self.action = BlueprintAction::Create;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn action(&self) -> BlueprintAction {
        self.action
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn indexes(&self) -> &[IndexDescriptor] {
        &self.indexes
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub fn dropped(&self) -> &Dropped {
        &self.dropped
    }

    /// Whether nothing at all was declared
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
            && self.indexes.is_empty()
            && self.foreign_keys.is_empty()
            && self.dropped.is_empty()
    }

    /// Append a column of any type
    pub fn column(
        &mut self,
        name: impl Into<String>,
        token: TypeToken,
        params: ColumnParams,
    ) -> &mut Column {
        let pos = self.columns.len();
        self.columns.push(Column::new(name, token, params));
        &mut self.columns[pos]
    }

    // Column types

    /// Auto-incrementing integer, typically the primary key
    pub fn increments(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::Integer, ColumnParams::autoincrement())
    }

    /// Auto-incrementing big integer
    pub fn big_increments(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::BigInteger, ColumnParams::autoincrement())
    }

    pub fn integer(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::Integer, ColumnParams::default())
    }

    pub fn big_integer(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::BigInteger, ColumnParams::default())
    }

    pub fn medium_integer(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::MediumInteger, ColumnParams::default())
    }

    pub fn small_integer(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::SmallInteger, ColumnParams::default())
    }

    /// Fixed-point number with `precision` total and `scale` fractional digits
    pub fn decimal(&mut self, name: impl Into<String>, precision: u32, scale: u32) -> &mut Column {
        self.column(
            name,
            TypeToken::Decimal,
            ColumnParams::with_precision(precision, scale),
        )
    }

    pub fn double(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::Double, ColumnParams::default())
    }

    pub fn float(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::Float, ColumnParams::default())
    }

    pub fn char(&mut self, name: impl Into<String>, length: u32) -> &mut Column {
        self.column(name, TypeToken::Char, ColumnParams::with_length(Some(length)))
    }

    /// Variable-length string; `None` uses the dialect's default length
    pub fn string(&mut self, name: impl Into<String>, length: impl Into<Option<u32>>) -> &mut Column {
        self.column(
            name,
            TypeToken::String,
            ColumnParams::with_length(length.into()),
        )
    }

    pub fn text(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::Text, ColumnParams::default())
    }

    pub fn medium_text(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::MediumText, ColumnParams::default())
    }

    pub fn long_text(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::LongText, ColumnParams::default())
    }

    pub fn json(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::Json, ColumnParams::default())
    }

    pub fn date(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::Date, ColumnParams::default())
    }

    pub fn datetime(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::DateTime, ColumnParams::default())
    }

    pub fn time(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::Time, ColumnParams::default())
    }

    pub fn timestamp(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::Timestamp, ColumnParams::default())
    }

    pub fn binary(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::Binary, ColumnParams::default())
    }

    pub fn boolean(&mut self, name: impl Into<String>) -> &mut Column {
        self.column(name, TypeToken::Boolean, ColumnParams::default())
    }

    /// Column restricted to a fixed set of string values
    pub fn enumeration(&mut self, name: impl Into<String>, fields: &[&str]) -> &mut Column {
        let params = ColumnParams {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            ..ColumnParams::default()
        };
        self.column(name, TypeToken::Enum, params)
    }

    /// Array of `element`, with `dimensions` levels of nesting (default one)
    pub fn array(
        &mut self,
        name: impl Into<String>,
        element: TypeToken,
        dimensions: impl Into<Option<u32>>,
    ) -> &mut Column {
        let params = ColumnParams {
            element: Some(Box::new(element)),
            dimensions: dimensions.into(),
            ..ColumnParams::default()
        };
        self.column(name, TypeToken::Array, params)
    }

    // Keys

    pub fn primary(&mut self, columns: impl IntoColumns) -> &mut IndexDescriptor {
        Self::push_index(&self.table, &mut self.indexes, columns, IndexKind::Primary)
    }

    pub fn unique(&mut self, columns: impl IntoColumns) -> &mut IndexDescriptor {
        Self::push_index(&self.table, &mut self.indexes, columns, IndexKind::Unique)
    }

    pub fn index(&mut self, columns: impl IntoColumns) -> &mut IndexDescriptor {
        Self::push_index(&self.table, &mut self.indexes, columns, IndexKind::Index)
    }

    /// Declare a foreign key on `column`, pre-named `{table}_{column}_foreign`
    pub fn foreign(&mut self, column: impl Into<String>) -> &mut ForeignKey {
        let column = column.into();
        let name = default_index_name(&self.table, std::slice::from_ref(&column), IndexKind::Foreign);
        let pos = self.foreign_keys.len();
        self.foreign_keys.push(ForeignKey::new(column, name));
        &mut self.foreign_keys[pos]
    }

    // Drops

    pub fn drop_column(&mut self, name: impl Into<String>) -> &mut Self {
        self.dropped.columns.push(name.into());
        self
    }

    pub fn drop_columns(&mut self, names: impl IntoColumns) -> &mut Self {
        self.dropped.columns.extend(names.into_columns());
        self
    }

    pub fn drop_primary(&mut self, columns: impl IntoColumns) -> &mut IndexDescriptor {
        Self::push_index(&self.table, &mut self.dropped.indexes, columns, IndexKind::Primary)
    }

    pub fn drop_unique(&mut self, columns: impl IntoColumns) -> &mut IndexDescriptor {
        Self::push_index(&self.table, &mut self.dropped.indexes, columns, IndexKind::Unique)
    }

    pub fn drop_index(&mut self, columns: impl IntoColumns) -> &mut IndexDescriptor {
        Self::push_index(&self.table, &mut self.dropped.indexes, columns, IndexKind::Index)
    }

    pub fn drop_foreign(&mut self, column: impl Into<String>) -> &mut IndexDescriptor {
        let column: String = column.into();
        Self::push_index(&self.table, &mut self.dropped.indexes, column, IndexKind::Foreign)
    }

    fn push_index<'a>(
        table: &str,
        list: &'a mut Vec<IndexDescriptor>,
        columns: impl IntoColumns,
        kind: IndexKind,
    ) -> &'a mut IndexDescriptor {
        let columns = columns.into_columns();
        let name = default_index_name(table, &columns, kind);
        let pos = list.len();
        list.push(IndexDescriptor::new(name, columns, kind));
        &mut list[pos]
    }
}

fn validate_table_name(table: &str) -> SchemaResult<()> {
    let reason = if table.trim().is_empty() {
        Some("table name cannot be empty")
    } else if table.chars().any(|c| c.is_control()) {
        Some("table name cannot contain control characters")
    } else if table.starts_with(TEMP_TABLE_PREFIX) {
        Some("the __tmp__ prefix is reserved for table rebuilds")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(SchemaError::InvalidTableName {
            name: table.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "blueprint_test.rs"]
mod tests;
