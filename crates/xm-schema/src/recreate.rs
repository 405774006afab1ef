//! Alter-by-recreate for engines without in-place constraint changes
//!
//! The live table is copied into `__tmp__{table}`, dropped, created again
//! with the merged definition, and refilled from the copy. Only columns that
//! survive the alter are copied; new columns take their defaults.

use crate::blueprint::{Dropped, TEMP_TABLE_PREFIX};
use crate::column::DefaultValue;
use crate::error::{SchemaError, SchemaResult};
use crate::foreign_key::ReferentialAction;
use crate::index::{default_index_name, IndexDescriptor, IndexKind};
use crate::platform::Platform;
use crate::typemap::{ColumnDef, ForeignKeyDef, NativeType, Resolved};
use std::collections::HashSet;
use xm_db::Backend;

/// Definition of a live table as read back from the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSnapshot {
    /// Columns in ordinal order, with primary and foreign keys attached
    pub columns: Vec<ColumnDef>,
    /// Primary key descriptor (if any) followed by secondary indexes
    pub indexes: Vec<IndexDescriptor>,
}

impl TableSnapshot {
    /// Introspect `table` through the backend
    pub fn load(backend: &dyn Backend, table: &str) -> SchemaResult<Self> {
        let primary = backend.primary_key(table)?;
        let foreign_keys = backend.foreign_keys(table)?;

        let mut columns: Vec<ColumnDef> = backend
            .columns(table)?
            .into_iter()
            .map(|info| ColumnDef {
                primary_key: primary.contains(&info.name),
                name: info.name,
                native: NativeType::new(info.data_type),
                nullable: info.nullable,
                default: info.default.map(DefaultValue::Expression),
                autoincrement: false,
                foreign_keys: Vec::new(),
            })
            .collect();

        for fk in foreign_keys {
            if fk.columns.len() != 1 || fk.ref_columns.len() != 1 {
                log::warn!(
                    "Composite foreign key on {}({}) cannot be carried through a table rebuild; skipping it",
                    table,
                    fk.columns.join(", ")
                );
                continue;
            }
            let column = fk.columns[0].clone();
            let def = ForeignKeyDef {
                name: fk
                    .name
                    .unwrap_or_else(|| default_index_name(table, &fk.columns, IndexKind::Foreign)),
                column: column.clone(),
                ref_table: fk.ref_table,
                ref_column: fk.ref_columns[0].clone(),
                on_delete: fk.on_delete.and_then(|a| a.parse::<ReferentialAction>().ok()),
                on_update: fk.on_update.and_then(|a| a.parse::<ReferentialAction>().ok()),
            };
            if let Some(col) = columns.iter_mut().find(|c| c.name == column) {
                col.foreign_keys.push(def);
            }
        }

        let mut indexes = Vec::new();
        if !primary.is_empty() {
            indexes.push(IndexDescriptor::new(
                default_index_name(table, &primary, IndexKind::Primary),
                primary,
                IndexKind::Primary,
            ));
        }
        for idx in backend.indexes(table)? {
            let kind = if idx.unique {
                IndexKind::Unique
            } else {
                IndexKind::Index
            };
            indexes.push(IndexDescriptor::new(idx.name, idx.columns, kind));
        }

        Ok(Self { columns, indexes })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Plans the statement sequence that rebuilds a table
pub struct RecreateTablePlatform<'a> {
    platform: &'a dyn Platform,
}

impl<'a> RecreateTablePlatform<'a> {
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform }
    }

    /// Name of the data copy kept while `table` is rebuilt
    pub fn temp_table_name(table: &str) -> String {
        format!("{}{}", TEMP_TABLE_PREFIX, table)
    }

    /// Statements that rebuild `table` from its live definition with the
    /// blueprint's additions and drops applied.
    pub fn plan(
        &self,
        table: &str,
        snapshot: &TableSnapshot,
        resolved: &Resolved,
        dropped: &Dropped,
    ) -> SchemaResult<Vec<String>> {
        let (mut columns, mut indexes) = Self::kept(table, snapshot, dropped)?;
        let copied: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();

        for def in &resolved.columns {
            if columns.iter().any(|c| c.name == def.name) {
                log::info!("Column {}.{} already exists; keeping it", table, def.name);
                continue;
            }
            columns.push(def.clone());
        }

        for idx in &resolved.indexes {
            for col in idx.columns() {
                if !columns.iter().any(|c| &c.name == col) {
                    return Err(key_column_not_found(table, idx.name(), idx.kind(), col));
                }
            }
            if idx.kind() == IndexKind::Primary {
                if columns.iter().any(|c| c.primary_key) {
                    log::warn!(
                        "Replacing the primary key of {} with {}",
                        table,
                        idx.name()
                    );
                }
                indexes.retain(|i| i.kind() != IndexKind::Primary);
                for col in columns.iter_mut() {
                    col.primary_key = idx.covers(&col.name);
                }
            }
            if !indexes.iter().any(|i| i.name() == idx.name()) {
                indexes.push(idx.clone());
            }
        }

        for fk in &resolved.foreign_keys {
            let col = columns
                .iter_mut()
                .find(|c| c.name == fk.column)
                .ok_or_else(|| key_column_not_found(table, &fk.name, IndexKind::Foreign, &fk.column))?;
            col.foreign_keys.retain(|existing| existing.name != fk.name);
            col.foreign_keys.push(fk.clone());
        }

        if columns.is_empty() {
            return Err(SchemaError::EmptyTable(table.to_string()));
        }

        let p = self.platform;
        let tmp = Self::temp_table_name(table);
        let data_columns: Vec<ColumnDef> = snapshot
            .columns
            .iter()
            .filter(|c| copied.contains(&c.name))
            .map(|c| ColumnDef::plain(c.name.clone(), c.native.name.clone()))
            .collect();

        let mut statements = Vec::new();
        if !copied.is_empty() {
            statements.extend(p.create_table_sql(&tmp, &data_columns, &[]));
            statements.push(copy_sql(p, &copied, table, &tmp));
        }
        statements.push(p.drop_table_sql(table, false));
        statements.extend(p.create_table_sql(table, &columns, &indexes));
        if !copied.is_empty() {
            statements.push(copy_sql(p, &copied, &tmp, table));
            statements.push(p.drop_table_sql(&tmp, false));
        }
        Ok(statements)
    }

    /// Live columns and indexes that survive the drops.
    ///
    /// Dropped foreign keys match by name or by column, since some engines
    /// do not report constraint names. A drop that matches no live key is an
    /// error.
    fn kept(
        table: &str,
        snapshot: &TableSnapshot,
        dropped: &Dropped,
    ) -> SchemaResult<(Vec<ColumnDef>, Vec<IndexDescriptor>)> {
        for drop in &dropped.indexes {
            if !Self::matches_live_key(snapshot, drop) {
                return Err(SchemaError::KeyNotFound {
                    table: table.to_string(),
                    name: drop.name().to_string(),
                    kind: drop.kind(),
                });
            }
        }

        let dropped_fks: Vec<&IndexDescriptor> = dropped
            .indexes
            .iter()
            .filter(|i| i.kind() == IndexKind::Foreign)
            .collect();
        let dropped_names: HashSet<&str> = dropped.indexes.iter().map(|i| i.name()).collect();
        let unset_primary: HashSet<&str> = dropped
            .indexes
            .iter()
            .filter(|i| i.kind() == IndexKind::Primary)
            .flat_map(|i| i.columns().iter().map(|c| c.as_str()))
            .collect();

        let columns = snapshot
            .columns
            .iter()
            .filter(|c| !dropped.columns.contains(&c.name))
            .map(|c| {
                let mut col = c.clone();
                col.foreign_keys
                    .retain(|fk| !dropped_fks.iter().any(|d| foreign_key_matches(fk, d)));
                if unset_primary.contains(col.name.as_str()) {
                    col.primary_key = false;
                }
                col
            })
            .collect::<Vec<_>>();

        let indexes = snapshot
            .indexes
            .iter()
            .filter(|idx| {
                let dropped_key = dropped_names.contains(idx.name())
                    || (idx.kind() == IndexKind::Primary
                        && idx.columns().iter().any(|c| unset_primary.contains(c.as_str())));
                let touches_dropped = idx.columns().iter().any(|c| dropped.columns.contains(c));
                !dropped_key && !touches_dropped
            })
            .cloned()
            .collect();

        Ok((columns, indexes))
    }

    fn matches_live_key(snapshot: &TableSnapshot, drop: &IndexDescriptor) -> bool {
        match drop.kind() {
            IndexKind::Foreign => snapshot
                .columns
                .iter()
                .flat_map(|c| c.foreign_keys.iter())
                .any(|fk| foreign_key_matches(fk, drop)),
            IndexKind::Primary => {
                snapshot.columns.iter().any(|c| c.primary_key)
                    || snapshot.indexes.iter().any(|i| i.kind() == IndexKind::Primary)
            }
            IndexKind::Unique | IndexKind::Index => snapshot.indexes.iter().any(|i| {
                i.name() == drop.name() || (i.kind() == drop.kind() && i.columns() == drop.columns())
            }),
        }
    }
}

fn foreign_key_matches(fk: &ForeignKeyDef, drop: &IndexDescriptor) -> bool {
    fk.name == drop.name() || drop.columns() == std::slice::from_ref(&fk.column)
}

fn copy_sql(platform: &dyn Platform, columns: &[String], from: &str, to: &str) -> String {
    let list = platform.quote_list(columns);
    format!(
        "INSERT INTO {} ({}) SELECT {} FROM {}",
        platform.quote_ident(to),
        list,
        list,
        platform.quote_ident(from)
    )
}

fn key_column_not_found(table: &str, name: &str, kind: IndexKind, column: &str) -> SchemaError {
    SchemaError::KeyColumnNotFound {
        table: table.to_string(),
        name: name.to_string(),
        kind,
        column: column.to_string(),
    }
}

#[cfg(test)]
#[path = "recreate_test.rs"]
mod tests;
