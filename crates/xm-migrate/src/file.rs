//! YAML migration files
//!
//! ```yaml
//! migration: CreateTestcasesTable
//! revision: 20180102000000
//! up:
//!   - op: create
//!     table: testcases
//!     columns:
//!       - { name: id, type: increments }
//!       - { name: experiment_id, type: integer }
//!     primary: id
//!     foreign:
//!       - { column: experiment_id, references: id, on: experiments, on_delete: cascade }
//! down:
//!   - op: drop_if_exists
//!     table: testcases
//! ```

use crate::error::{MigrateError, MigrateResult};
use crate::migration::Migration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use xm_core::naming::to_pascal_case;
use xm_core::Revision;
use xm_schema::{
    Blueprint, ColumnParams, DefaultValue, IndexDescriptor, ReferentialAction, Schema,
    SchemaResult, TypeToken,
};

fn stem_regex() -> &'static regex::Regex {
    static STEM_RE: OnceLock<regex::Regex> = OnceLock::new();
    STEM_RE.get_or_init(|| regex::Regex::new(r"^([0-9]+)_(.+)$").expect("valid regex"))
}

/// Split a file stem into revision and name, if it follows `<digits>_<name>`
pub fn split_stem(stem: &str) -> Option<(&str, &str)> {
    let caps = stem_regex().captures(stem)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Raw file content
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct MigrationDoc {
    migration: String,
    #[serde(default)]
    revision: Option<RevisionSpec>,
    #[serde(default)]
    up: Vec<Operation>,
    #[serde(default)]
    down: Vec<Operation>,
}

/// `revision: 20180101000000` reads as a YAML number unless quoted
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RevisionSpec {
    Number(u64),
    Text(String),
}

impl RevisionSpec {
    fn as_string(&self) -> String {
        match self {
            RevisionSpec::Number(n) => n.to_string(),
            RevisionSpec::Text(s) => s.clone(),
        }
    }

    /// Unquoted numbers lose leading zeros, so they compare by value
    fn matches(&self, revision: &Revision) -> bool {
        match self {
            RevisionSpec::Number(n) => revision.as_str().parse::<u64>().ok() == Some(*n),
            RevisionSpec::Text(s) => s == revision.as_str(),
        }
    }
}

/// One schema operation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Create(TableSpec),
    Table(TableSpec),
    Rename { from: String, to: String },
    Drop { table: String },
    DropIfExists { table: String },
}

/// Columns, keys and drops for one `create` / `table` operation
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    pub table: String,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub primary: Option<IndexSpec>,
    #[serde(default)]
    pub unique: Vec<IndexSpec>,
    #[serde(default)]
    pub index: Vec<IndexSpec>,
    #[serde(default)]
    pub foreign: Vec<ForeignSpec>,
    #[serde(default)]
    pub drop_columns: Vec<String>,
    #[serde(default)]
    pub drop_primary: Option<IndexSpec>,
    #[serde(default)]
    pub drop_unique: Vec<IndexSpec>,
    #[serde(default)]
    pub drop_index: Vec<IndexSpec>,
    #[serde(default)]
    pub drop_foreign: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    /// Allowed values of an enum column
    #[serde(default)]
    pub values: Vec<String>,
    /// Element type of an array column
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub dimensions: Option<u32>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default)]
    pub default: Option<DefaultSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefaultSpec {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Expression { expression: String },
}

impl From<&DefaultSpec> for DefaultValue {
    fn from(spec: &DefaultSpec) -> Self {
        match spec {
            DefaultSpec::Boolean(b) => DefaultValue::Boolean(*b),
            DefaultSpec::Integer(i) => DefaultValue::Integer(*i),
            DefaultSpec::Float(f) => DefaultValue::Float(*f),
            DefaultSpec::Text(s) => DefaultValue::Text(s.clone()),
            DefaultSpec::Expression { expression } => DefaultValue::expression(expression),
        }
    }
}

/// Key columns, either bare (`email`, `[first, last]`) or with an explicit name
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IndexSpec {
    Columns(OneOrMany),
    Named { columns: OneOrMany, name: String },
}

impl IndexSpec {
    fn apply(&self, key: &mut IndexDescriptor) {
        if let IndexSpec::Named { name, .. } = self {
            key.named(name.clone());
        }
    }

    fn columns(&self) -> Vec<String> {
        match self {
            IndexSpec::Columns(cols) | IndexSpec::Named { columns: cols, .. } => cols.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s.clone()],
            OneOrMany::Many(v) => v.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForeignSpec {
    pub column: String,
    pub references: String,
    pub on: String,
    #[serde(default)]
    pub on_delete: Option<String>,
    #[serde(default)]
    pub on_update: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl TableSpec {
    /// Build the blueprint this table entry describes
    pub fn blueprint(&self, create: bool) -> SchemaResult<Blueprint> {
        let mut bp = Blueprint::new(&self.table)?;
        if create {
            bp.create();
        }

        for col in &self.columns {
            col.declare(&mut bp);
        }

        if let Some(spec) = &self.primary {
            spec.apply(bp.primary(spec.columns()));
        }
        for spec in &self.unique {
            spec.apply(bp.unique(spec.columns()));
        }
        for spec in &self.index {
            spec.apply(bp.index(spec.columns()));
        }

        for spec in &self.foreign {
            let on_delete = spec
                .on_delete
                .as_deref()
                .map(str::parse::<ReferentialAction>)
                .transpose()?;
            let on_update = spec
                .on_update
                .as_deref()
                .map(str::parse::<ReferentialAction>)
                .transpose()?;

            let fk = bp.foreign(spec.column.clone());
            fk.references(spec.references.clone()).on(spec.on.clone());
            if let Some(action) = on_delete {
                fk.on_delete(action);
            }
            if let Some(action) = on_update {
                fk.on_update(action);
            }
            if let Some(name) = &spec.name {
                fk.named(name.clone());
            }
        }

        if !self.drop_columns.is_empty() {
            bp.drop_columns(self.drop_columns.clone());
        }
        if let Some(spec) = &self.drop_primary {
            spec.apply(bp.drop_primary(spec.columns()));
        }
        for spec in &self.drop_unique {
            spec.apply(bp.drop_unique(spec.columns()));
        }
        for spec in &self.drop_index {
            spec.apply(bp.drop_index(spec.columns()));
        }
        for column in &self.drop_foreign {
            bp.drop_foreign(column.clone());
        }

        Ok(bp)
    }
}

impl ColumnSpec {
    fn declare(&self, bp: &mut Blueprint) {
        let key: String = self
            .column_type
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        let (token, autoincrement) = match key.as_str() {
            "increments" => (TypeToken::Integer, true),
            "bigincrements" => (TypeToken::BigInteger, true),
            _ => (TypeToken::parse(&self.column_type), false),
        };

        let params = ColumnParams {
            length: self.length,
            precision: self.precision,
            scale: self.scale,
            fields: self.values.clone(),
            element: self.element.as_deref().map(|e| Box::new(TypeToken::parse(e))),
            dimensions: self.dimensions,
            autoincrement,
        };

        let column = bp.column(self.name.clone(), token, params);
        if self.nullable {
            column.nullable();
        }
        if self.unsigned {
            column.unsigned();
        }
        if let Some(default) = &self.default {
            column.default(DefaultValue::from(default));
        }
    }
}

impl Operation {
    /// Execute against a schema
    pub fn run(&self, schema: &Schema<'_>) -> SchemaResult<()> {
        match self {
            Operation::Create(spec) => schema.apply(spec.blueprint(true)?),
            Operation::Table(spec) => schema.apply(spec.blueprint(false)?),
            Operation::Rename { from, to } => schema.rename(from, to),
            Operation::Drop { table } => schema.drop(table),
            Operation::DropIfExists { table } => schema.drop_if_exists(table),
        }
    }

    /// Check that the operation describes a buildable blueprint
    fn validate(&self) -> SchemaResult<()> {
        match self {
            Operation::Create(spec) | Operation::Table(spec) => spec.blueprint(false).map(|_| ()),
            _ => Ok(()),
        }
    }
}

/// A migration loaded from a YAML file
#[derive(Debug, Clone)]
pub struct FileMigration {
    revision: Revision,
    name: String,
    entity: String,
    path: PathBuf,
    up: Vec<Operation>,
    down: Vec<Operation>,
}

impl FileMigration {
    /// Parse and validate a migration file
    pub fn load(path: &Path) -> MigrateResult<Self> {
        let invalid = |message: String| MigrateError::InvalidMigrationFile {
            path: path.display().to_string(),
            message,
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| invalid("file name is not valid UTF-8".to_string()))?;
        let (revision, name) = split_stem(stem)
            .ok_or_else(|| invalid("file name must look like <revision>_<name>.yml".to_string()))?;
        let revision = Revision::parse(revision).map_err(|e| invalid(e.to_string()))?;

        let content = std::fs::read_to_string(path).map_err(|source| MigrateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let doc: MigrationDoc =
            serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?;

        if let Some(declared) = &doc.revision {
            if !declared.matches(&revision) {
                return Err(invalid(format!(
                    "declared revision {} does not match the file name revision {}",
                    declared.as_string(),
                    revision
                )));
            }
        }

        let expected = to_pascal_case(name);
        if doc.migration != expected {
            log::warn!(
                "Migration {} declares entity '{}', expected '{}'",
                stem,
                doc.migration,
                expected
            );
        }

        for op in doc.up.iter().chain(doc.down.iter()) {
            op.validate().map_err(|e| invalid(e.to_string()))?;
        }

        Ok(Self {
            revision,
            name: name.to_string(),
            entity: doc.migration,
            path: path.to_path_buf(),
            up: doc.up,
            down: doc.down,
        })
    }

    /// PascalCase entity name declared in the file
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn up_operations(&self) -> &[Operation] {
        &self.up
    }

    pub fn down_operations(&self) -> &[Operation] {
        &self.down
    }

    fn run_all(&self, ops: &[Operation], schema: &Schema<'_>) -> SchemaResult<()> {
        for op in ops {
            op.run(schema)?;
        }
        Ok(())
    }
}

impl Migration for FileMigration {
    fn revision(&self) -> &Revision {
        &self.revision
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn up(&self, schema: &Schema<'_>) -> SchemaResult<()> {
        if self.up.is_empty() {
            log::info!("Migration {} has no up operations", self.id());
        }
        self.run_all(&self.up, schema)
    }

    fn down(&self, schema: &Schema<'_>) -> SchemaResult<()> {
        if self.down.is_empty() {
            log::info!("Migration {} has no down operations", self.id());
        }
        self.run_all(&self.down, schema)
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
