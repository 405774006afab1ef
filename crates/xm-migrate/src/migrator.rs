//! The migrator: discovery, status, up/down/refresh, and make
//!
//! Per-migration state is never stored; it is derived on every call from
//! ledger membership. Migrations run in ascending id order, which is
//! ascending file name and, for generated revisions, creation order.

use crate::error::{MigrateError, MigrateResult};
use crate::file::{split_stem, FileMigration};
use crate::ledger::Ledger;
use crate::migration::{Direction, Migration};
use crate::template;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use xm_core::naming::sanitize_migration_name;
use xm_core::Revision;
use xm_schema::Schema;

/// Whether a migration's revision is in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    Applied,
    Pending,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MigrationState::Applied => "Applied",
            MigrationState::Pending => "Pending",
        })
    }
}

/// One row of `status()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub id: String,
    pub revision: Revision,
    pub name: String,
    pub state: MigrationState,
    /// Creation time, when the revision is a generated timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpOutcome {
    Migrated(String),
    /// No pending migration was left
    UpToDate,
    /// The selected migration is already applied
    AlreadyApplied(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownOutcome {
    Reverted(String),
    /// No applied migration was left
    NothingToRevert,
    /// The selected migration is not applied
    NotApplied(String),
}

/// Ids touched by `refresh()`, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub reverted: Vec<String>,
    pub migrated: Vec<String>,
}

/// Ordered migration registry plus the ledger it is checked against
pub struct Migrator {
    dir: PathBuf,
    ledger: Ledger,
    migrations: Vec<Box<dyn Migration>>,
}

impl Migrator {
    /// Open the migrations directory: load every migration file and the
    /// ledger (created empty if missing)
    pub fn open(dir: &Path) -> MigrateResult<Self> {
        if !dir.is_dir() {
            return Err(MigrateError::MigrationsDirNotFound {
                path: dir.display().to_string(),
            });
        }

        let ledger = Ledger::open(dir)?;
        let mut migrator = Self {
            dir: dir.to_path_buf(),
            ledger,
            migrations: Vec::new(),
        };
        for migration in discover(dir)? {
            migrator.register(Box::new(migration))?;
        }

        let orphaned = migrator.orphaned();
        if !orphaned.is_empty() {
            log::warn!(
                "Ledger lists revisions with no migration: {}",
                orphaned
                    .iter()
                    .map(Revision::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Ok(migrator)
    }

    /// Add a migration to the ordered registry
    pub fn register(&mut self, migration: Box<dyn Migration>) -> MigrateResult<()> {
        let id = migration.id();
        if self.migrations.iter().any(|m| m.id() == id) {
            return Err(MigrateError::DuplicateMigration { id });
        }
        if let Some(other) = self
            .migrations
            .iter()
            .find(|m| m.revision() == migration.revision())
        {
            log::warn!(
                "Migrations {} and {} share revision {}; the ledger cannot tell them apart",
                other.id(),
                id,
                migration.revision()
            );
        }

        let pos = self.migrations.partition_point(|m| m.id() < id);
        self.migrations.insert(pos, migration);
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Registered ids in execution order
    pub fn ids(&self) -> Vec<String> {
        self.migrations.iter().map(|m| m.id()).collect()
    }

    /// Applied/Pending for every migration, in ascending order
    pub fn status(&mut self) -> MigrateResult<Vec<MigrationStatus>> {
        self.ledger.reload()?;
        Ok(self
            .migrations
            .iter()
            .map(|m| MigrationStatus {
                id: m.id(),
                revision: m.revision().clone(),
                name: m.name().to_string(),
                state: self.state_of(m.as_ref()),
                created: m.revision().timestamp(),
            })
            .collect())
    }

    /// Ledger revisions that no registered migration carries
    pub fn orphaned(&self) -> Vec<Revision> {
        self.ledger
            .applied()
            .iter()
            .filter(|rev| !self.migrations.iter().any(|m| m.revision() == *rev))
            .cloned()
            .collect()
    }

    /// Apply the selected migration, or the first pending one
    pub fn up(&mut self, schema: &Schema<'_>, selector: Option<&str>) -> MigrateResult<UpOutcome> {
        self.ledger.reload()?;
        let index = match selector {
            Some(selector) => {
                let index = self.find(selector)?;
                if self.is_applied(index) {
                    let id = self.migrations[index].id();
                    log::info!("Migration {} is already applied", id);
                    return Ok(UpOutcome::AlreadyApplied(id));
                }
                index
            }
            None => match (0..self.migrations.len()).find(|&i| !self.is_applied(i)) {
                Some(index) => index,
                None => return Ok(UpOutcome::UpToDate),
            },
        };

        let id = self.run(index, Direction::Up, schema)?;
        let revision = self.migrations[index].revision().clone();
        self.ledger.insert(&revision)?;
        log::info!("Migrated {}", id);
        Ok(UpOutcome::Migrated(id))
    }

    /// Revert the selected migration, or the last applied one
    pub fn down(
        &mut self,
        schema: &Schema<'_>,
        selector: Option<&str>,
    ) -> MigrateResult<DownOutcome> {
        self.ledger.reload()?;
        let index = match selector {
            Some(selector) => {
                let index = self.find(selector)?;
                if !self.is_applied(index) {
                    let id = self.migrations[index].id();
                    log::info!("Migration {} is not applied", id);
                    return Ok(DownOutcome::NotApplied(id));
                }
                index
            }
            None => match (0..self.migrations.len()).rev().find(|&i| self.is_applied(i)) {
                Some(index) => index,
                None => return Ok(DownOutcome::NothingToRevert),
            },
        };

        let id = self.run(index, Direction::Down, schema)?;
        let revision = self.migrations[index].revision().clone();
        self.ledger.remove(&revision)?;
        log::info!("Reverted {}", id);
        Ok(DownOutcome::Reverted(id))
    }

    /// Revert every applied migration (newest first), then apply every
    /// migration (oldest first)
    pub fn refresh(&mut self, schema: &Schema<'_>) -> MigrateResult<RefreshReport> {
        self.refresh_with(schema, |_, _| {})
    }

    /// [`refresh`](Self::refresh), calling `on_step` after each migration
    /// completes so progress survives a failure partway through
    pub fn refresh_with<F>(&mut self, schema: &Schema<'_>, mut on_step: F) -> MigrateResult<RefreshReport>
    where
        F: FnMut(Direction, &str),
    {
        let mut report = RefreshReport::default();

        while let DownOutcome::Reverted(id) = self.down(schema, None)? {
            log::info!("Refresh: reverted {}", id);
            on_step(Direction::Down, &id);
            report.reverted.push(id);
        }
        while let UpOutcome::Migrated(id) = self.up(schema, None)? {
            log::info!("Refresh: migrated {}", id);
            on_step(Direction::Up, &id);
            report.migrated.push(id);
        }

        Ok(report)
    }

    /// Create a migration file named after `name` at the current time
    pub fn make(&mut self, name: &str) -> MigrateResult<PathBuf> {
        self.make_at(name, Revision::now())
    }

    /// Create a migration file for an explicit revision and register it
    pub fn make_at(&mut self, name: &str, revision: Revision) -> MigrateResult<PathBuf> {
        let sanitized = sanitize_migration_name(name);
        if sanitized.is_empty() {
            return Err(MigrateError::InvalidMigrationName {
                name: name.to_string(),
                reason: "name must contain at least one letter".to_string(),
            });
        }

        if self.migrations.iter().any(|m| m.revision() == &revision) {
            log::warn!(
                "Revision {} is already used by another migration; ordering between them falls back to the name",
                revision
            );
        }

        let path = template::write(&self.dir, &revision, &sanitized)?;
        self.register(Box::new(FileMigration::load(&path)?))?;
        Ok(path)
    }

    fn state_of(&self, migration: &dyn Migration) -> MigrationState {
        if self.ledger.contains(migration.revision()) {
            MigrationState::Applied
        } else {
            MigrationState::Pending
        }
    }

    fn is_applied(&self, index: usize) -> bool {
        self.ledger.contains(self.migrations[index].revision())
    }

    /// Index of the migration whose id or revision is `selector`
    fn find(&self, selector: &str) -> MigrateResult<usize> {
        self.migrations
            .iter()
            .position(|m| m.id() == selector)
            .or_else(|| {
                self.migrations
                    .iter()
                    .position(|m| m.revision().as_str() == selector)
            })
            .ok_or_else(|| MigrateError::UnknownMigration(selector.to_string()))
    }

    fn run(&self, index: usize, direction: Direction, schema: &Schema<'_>) -> MigrateResult<String> {
        let migration = &self.migrations[index];
        let id = migration.id();
        log::debug!("Running {} {}", direction, id);
        migration
            .run(direction, schema)
            .map_err(|source| MigrateError::MigrationFailed {
                id: id.clone(),
                direction,
                source,
            })?;
        Ok(id)
    }
}

/// Load every `<digits>_<name>.yml` / `.yaml` file in `dir`, sorted by file name.
///
/// Files whose stem does not follow the naming rule are skipped with a
/// debug log.
pub fn discover(dir: &Path) -> MigrateResult<Vec<FileMigration>> {
    let base = glob::Pattern::escape(&dir.display().to_string());
    let mut paths: Vec<PathBuf> = Vec::new();

    for ext in ["yml", "yaml"] {
        let pattern = format!("{}/*.{}", base, ext);
        let entries = glob::glob(&pattern).map_err(|e| MigrateError::Io {
            path: dir.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
        })?;
        for entry in entries {
            let path = entry.map_err(|e| MigrateError::Io {
                path: e.path().display().to_string(),
                source: e.into_error(),
            })?;
            paths.push(path);
        }
    }

    paths.retain(|path| {
        let matches = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(split_stem)
            .is_some();
        if !matches {
            log::debug!("Skipping {}: not a migration file name", path.display());
        }
        matches
    });
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    paths.iter().map(|path| FileMigration::load(path)).collect()
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
