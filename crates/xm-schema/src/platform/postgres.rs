//! PostgreSQL platform
//!
//! Uses the provided ANSI statements unchanged: auto-increment is expressed by
//! the `SERIAL` family of native types, and every constraint is named.

use super::{Capabilities, Platform};
use xm_core::Dialect;

pub struct PostgresPlatform;

impl Platform for PostgresPlatform {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            incremental_alter: true,
            foreign_key_actions: true,
            named_constraints: true,
        }
    }
}
