//! The migration trait

use std::fmt;
use xm_core::Revision;
use xm_schema::{Schema, SchemaResult};

/// Which half of a migration runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
        })
    }
}

/// One revision-identified unit of schema change.
///
/// Both directions default to a no-op that logs a warning, so a migration
/// may implement only the half it needs.
pub trait Migration {
    /// Revision used for ordering and ledger membership
    fn revision(&self) -> &Revision;

    /// snake_case name, as in the file name
    fn name(&self) -> &str;

    /// `<revision>_<name>`, the file stem
    fn id(&self) -> String {
        format!("{}_{}", self.revision(), self.name())
    }

    fn up(&self, _schema: &Schema<'_>) -> SchemaResult<()> {
        log::warn!("Migration {} does not implement up", self.id());
        Ok(())
    }

    fn down(&self, _schema: &Schema<'_>) -> SchemaResult<()> {
        log::warn!("Migration {} does not implement down", self.id());
        Ok(())
    }

    /// Run one direction
    fn run(&self, direction: Direction, schema: &Schema<'_>) -> SchemaResult<()> {
        match direction {
            Direction::Up => self.up(schema),
            Direction::Down => self.down(schema),
        }
    }
}
