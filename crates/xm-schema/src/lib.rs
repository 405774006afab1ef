//! xm-schema - Schema builder and DDL generation for Experimentum
//!
//! Migration authors describe a table change with a [`Blueprint`] through the
//! [`Schema`] facade. The [`Store`] resolves the blueprint into native column
//! definitions with the [`TypeMapper`] and turns them into DDL through the
//! dialect's [`Platform`], or through [`RecreateTablePlatform`] when the
//! engine cannot alter constraints in place.

pub mod blueprint;
pub mod column;
pub mod error;
pub mod foreign_key;
pub mod index;
pub mod platform;
pub mod recreate;
pub mod schema;
pub mod store;
pub mod typemap;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use blueprint::{Blueprint, BlueprintAction, Dropped};
pub use column::{Column, ColumnParams, DefaultValue, TypeToken};
pub use error::{SchemaError, SchemaResult};
pub use foreign_key::{ForeignKey, ReferentialAction};
pub use index::{default_index_name, IndexDescriptor, IndexKind, IntoColumns};
pub use platform::{platform_for, Capabilities, Platform};
pub use recreate::{RecreateTablePlatform, TableSnapshot};
pub use schema::Schema;
pub use store::Store;
pub use typemap::{ColumnDef, ForeignKeyDef, NativeType, Resolved, TypeMapper, MAX_ARRAY_DIMENSIONS};
