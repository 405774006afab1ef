//! Schema facade handed to migrations

use crate::blueprint::Blueprint;
use crate::error::SchemaResult;
use crate::store::Store;

/// Entry point migrations use to describe table changes.
///
/// ```no_run
/// # use xm_schema::{Schema, Store};
/// # fn run(store: &Store) -> xm_schema::SchemaResult<()> {
/// let schema = Schema::new(store);
/// schema.create("experiments", |table| {
///     table.increments("id");
///     table.primary("id");
///     table.string("name", None);
/// })?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy)]
pub struct Schema<'a> {
    store: &'a Store,
}

impl<'a> Schema<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a Store {
        self.store
    }

    /// Create `table` with the columns and keys declared in `build`
    pub fn create<F>(&self, table: &str, build: F) -> SchemaResult<()>
    where
        F: FnOnce(&mut Blueprint),
    {
        let mut blueprint = self.begin_create(table)?;
        build(&mut blueprint);
        self.apply(blueprint)
    }

    /// Alter `table` with the changes declared in `build`
    pub fn table<F>(&self, table: &str, build: F) -> SchemaResult<()>
    where
        F: FnOnce(&mut Blueprint),
    {
        let mut blueprint = self.begin_alter(table)?;
        build(&mut blueprint);
        self.apply(blueprint)
    }

    /// Start a create blueprint to fill in and pass to [`Schema::apply`]
    pub fn begin_create(&self, table: &str) -> SchemaResult<Blueprint> {
        let mut blueprint = Blueprint::new(table)?;
        blueprint.create();
        Ok(blueprint)
    }

    /// Start an alter blueprint to fill in and pass to [`Schema::apply`]
    pub fn begin_alter(&self, table: &str) -> SchemaResult<Blueprint> {
        Blueprint::new(table)
    }

    /// Execute a finished blueprint
    pub fn apply(&self, blueprint: Blueprint) -> SchemaResult<()> {
        self.store.apply(&blueprint)
    }

    pub fn rename(&self, from: &str, to: &str) -> SchemaResult<()> {
        self.store.rename(from, to)
    }

    pub fn drop(&self, table: &str) -> SchemaResult<()> {
        self.store.drop(table)
    }

    pub fn drop_if_exists(&self, table: &str) -> SchemaResult<()> {
        self.store.drop_if_exists(table)
    }

    pub fn has_table(&self, table: &str) -> SchemaResult<bool> {
        self.store.has_table(table)
    }

    pub fn has_column(&self, table: &str, column: &str) -> SchemaResult<bool> {
        self.store.has_column(table, column)
    }
}
