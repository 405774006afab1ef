//! xm-db - Backing-store abstraction for Experimentum migrations
//!
//! This crate provides the `Backend` trait (raw statement execution plus
//! schema introspection) and its DuckDB implementation. The schema engine
//! depends only on the trait.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Backend, ColumnInfo, ForeignKeyInfo, IndexInfo};
