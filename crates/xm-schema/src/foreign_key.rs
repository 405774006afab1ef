//! Foreign key declarations

use crate::error::SchemaError;
use std::fmt;
use std::str::FromStr;

/// Action taken on the referencing rows when the referenced row changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferentialAction {
    Cascade,
    Restrict,
    SetNull,
    SetDefault,
    NoAction,
}

impl ReferentialAction {
    /// SQL keyword form
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ReferentialAction {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace('_', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "cascade" => Ok(ReferentialAction::Cascade),
            "restrict" => Ok(ReferentialAction::Restrict),
            "set null" => Ok(ReferentialAction::SetNull),
            "set default" => Ok(ReferentialAction::SetDefault),
            "no action" => Ok(ReferentialAction::NoAction),
            _ => Err(SchemaError::InvalidReferentialAction(s.to_string())),
        }
    }
}

/// A foreign key from one column of the blueprint's table.
///
/// Built by chaining: `foreign("experiment_id").references("id").on("experiments")`.
/// The referenced table and column are checked when the blueprint is resolved,
/// not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    column: String,
    name: String,
    ref_table: Option<String>,
    ref_column: Option<String>,
    on_delete: Option<ReferentialAction>,
    on_update: Option<ReferentialAction>,
}

impl ForeignKey {
    pub fn new(column: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            name: name.into(),
            ref_table: None,
            ref_column: None,
            on_delete: None,
            on_update: None,
        }
    }

    /// Set the referenced column
    pub fn references(&mut self, column: impl Into<String>) -> &mut Self {
        self.ref_column = Some(column.into());
        self
    }

    /// Set the referenced table
    pub fn on(&mut self, table: impl Into<String>) -> &mut Self {
        self.ref_table = Some(table.into());
        self
    }

    pub fn on_delete(&mut self, action: ReferentialAction) -> &mut Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(&mut self, action: ReferentialAction) -> &mut Self {
        self.on_update = Some(action);
        self
    }

    /// Override the synthesized constraint name
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ref_table(&self) -> Option<&str> {
        self.ref_table.as_deref()
    }

    pub fn ref_column(&self) -> Option<&str> {
        self.ref_column.as_deref()
    }

    pub fn delete_action(&self) -> Option<ReferentialAction> {
        self.on_delete
    }

    pub fn update_action(&self) -> Option<ReferentialAction> {
        self.on_update
    }
}
