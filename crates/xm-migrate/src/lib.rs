//! xm-migrate - Migration runner for Experimentum
//!
//! Migrations live as YAML files named `<revision>_<name>.yml` in the
//! migrations directory, or are registered from code through the
//! [`Migration`] trait. The [`Migrator`] orders them by revision, records the
//! applied set in the [`Ledger`] (`.version`), and runs them against a
//! [`Schema`](xm_schema::Schema).

pub mod error;
pub mod file;
pub mod ledger;
pub mod migration;
pub mod migrator;
pub mod template;

pub use error::{MigrateError, MigrateResult};
pub use file::FileMigration;
pub use ledger::{Ledger, LEDGER_FILE};
pub use migration::{Direction, Migration};
pub use migrator::{
    DownOutcome, MigrationState, MigrationStatus, Migrator, RefreshReport, UpOutcome,
};
