//! xm-core - Core library for Experimentum migrations
//!
//! This crate provides configuration parsing, the migration revision type,
//! the dialect selector, and the small naming and SQL helpers shared by the
//! schema engine, the migrator, and the CLI.

pub mod config;
pub mod dialect;
pub mod error;
pub mod naming;
pub mod revision;
pub mod sql_utils;

pub use config::{Config, DatabaseConfig, DbType, MigrationsConfig, TargetConfig};
pub use dialect::Dialect;
pub use error::{CoreError, CoreResult};
pub use revision::Revision;
