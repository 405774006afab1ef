//! Store: executes blueprints against a backend

use crate::blueprint::{Blueprint, BlueprintAction};
use crate::error::{SchemaError, SchemaResult};
use crate::index::IndexKind;
use crate::platform::{platform_for, Platform};
use crate::recreate::{RecreateTablePlatform, TableSnapshot};
use crate::typemap::{Resolved, TypeMapper};
use xm_core::Dialect;
use xm_db::Backend;

/// A backend paired with the platform that writes its DDL
pub struct Store {
    backend: Box<dyn Backend>,
    platform: Box<dyn Platform>,
    mapper: TypeMapper,
}

impl Store {
    /// Wrap a backend, choosing the platform from its dialect
    pub fn new(backend: Box<dyn Backend>) -> Self {
        let dialect = backend.dialect();
        Self::with_dialect(backend, dialect)
    }

    /// Wrap a backend but generate DDL for another dialect
    pub fn with_dialect(backend: Box<dyn Backend>, dialect: Dialect) -> Self {
        Self {
            backend,
            platform: platform_for(dialect),
            mapper: TypeMapper::new(dialect),
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn dialect(&self) -> Dialect {
        self.platform.dialect()
    }

    pub fn has_table(&self, table: &str) -> SchemaResult<bool> {
        Ok(self.backend.table_exists(table)?)
    }

    pub fn has_column(&self, table: &str, column: &str) -> SchemaResult<bool> {
        Ok(self
            .backend
            .column_names(table)?
            .iter()
            .any(|c| c == column))
    }

    /// Apply a blueprint according to its action
    pub fn apply(&self, blueprint: &Blueprint) -> SchemaResult<()> {
        match blueprint.action() {
            BlueprintAction::Create => self.create(blueprint),
            BlueprintAction::Alter => self.alter(blueprint),
        }
    }

    /// Create the blueprint's table. An existing table is left untouched.
    pub fn create(&self, blueprint: &Blueprint) -> SchemaResult<()> {
        let table = blueprint.table();
        if self.has_table(table)? {
            log::info!("Table {} already exists; skipping create", table);
            return Ok(());
        }

        let resolved = self.mapper.columns_and_indexes(blueprint)?;
        if resolved.columns.is_empty() {
            return Err(SchemaError::EmptyTable(table.to_string()));
        }

        let mut statements =
            self.platform
                .create_table_sql(table, &resolved.columns, &resolved.indexes);
        for idx in resolved
            .indexes
            .iter()
            .filter(|idx| idx.kind() == IndexKind::Primary)
            .filter(|idx| !resolved.columns.iter().any(|c| idx.covers(&c.name)))
        {
            statements.push(self.platform.add_primary_key_sql(table, idx));
        }
        for fk in &resolved.foreign_keys {
            log::warn!(
                "Foreign key {} is on column {} which {} does not declare; adding it after the table",
                fk.name,
                fk.column,
                table
            );
            statements.push(self.platform.add_foreign_key_sql(table, fk));
        }

        log::info!("Creating table {}", table);
        self.execute_all(&statements)
    }

    /// Alter an existing table: add columns and keys, then drop what the
    /// blueprint drops
    pub fn alter(&self, blueprint: &Blueprint) -> SchemaResult<()> {
        let table = blueprint.table();
        if !self.has_table(table)? {
            return Err(SchemaError::TableNotFound(table.to_string()));
        }
        if blueprint.is_empty() {
            log::debug!("Nothing to alter on {}", table);
            return Ok(());
        }

        let resolved = self.mapper.columns_and_indexes(blueprint)?;
        let statements = if self.platform.capabilities().incremental_alter {
            self.incremental_alter_sql(blueprint, &resolved)?
        } else {
            let snapshot = TableSnapshot::load(self.backend.as_ref(), table)?;
            RecreateTablePlatform::new(self.platform.as_ref()).plan(
                table,
                &snapshot,
                &resolved,
                blueprint.dropped(),
            )?
        };

        log::info!("Altering table {}", table);
        self.execute_all(&statements)
    }

    fn incremental_alter_sql(
        &self,
        blueprint: &Blueprint,
        resolved: &Resolved,
    ) -> SchemaResult<Vec<String>> {
        let table = blueprint.table();
        let live = self.backend.columns(table)?;
        let p = self.platform.as_ref();
        let mut statements = Vec::new();

        for column in &resolved.columns {
            if live.iter().any(|c| c.name == column.name) {
                log::info!("Column {}.{} already exists; skipping", table, column.name);
            } else {
                statements.extend(p.add_column_sql(table, column));
            }
            for fk in &column.foreign_keys {
                statements.push(p.add_foreign_key_sql(table, fk));
            }
        }

        for idx in &resolved.indexes {
            match idx.kind() {
                IndexKind::Primary => statements.push(p.add_primary_key_sql(table, idx)),
                _ => statements.extend(p.create_index_sql(table, idx)),
            }
        }

        for fk in &resolved.foreign_keys {
            statements.push(p.add_foreign_key_sql(table, fk));
        }

        let dropped = blueprint.dropped();
        for idx in &dropped.indexes {
            let first = idx.columns().first();
            let info = live.iter().find(|c| Some(&c.name) == first);
            statements.extend(p.drop_key_sql(table, info, idx)?);
        }

        let drop_columns: Vec<String> = dropped
            .columns
            .iter()
            .filter(|name| {
                let exists = live.iter().any(|c| &c.name == *name);
                if !exists {
                    log::warn!("Column {}.{} does not exist; not dropping it", table, name);
                }
                exists
            })
            .cloned()
            .collect();
        statements.extend(p.drop_columns_sql(table, &drop_columns));

        Ok(statements)
    }

    pub fn rename(&self, from: &str, to: &str) -> SchemaResult<()> {
        log::info!("Renaming table {} to {}", from, to);
        self.execute(&self.platform.rename_sql(from, to))
    }

    pub fn drop(&self, table: &str) -> SchemaResult<()> {
        log::info!("Dropping table {}", table);
        self.execute(&self.platform.drop_table_sql(table, false))
    }

    pub fn drop_if_exists(&self, table: &str) -> SchemaResult<()> {
        log::info!("Dropping table {} if it exists", table);
        self.execute(&self.platform.drop_table_sql(table, true))
    }

    /// Execute one statement, logging it first
    pub fn execute(&self, sql: &str) -> SchemaResult<()> {
        log::debug!("{}", sql);
        self.backend.execute(sql)?;
        Ok(())
    }

    fn execute_all(&self, statements: &[String]) -> SchemaResult<()> {
        for sql in statements {
            self.execute(sql)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
