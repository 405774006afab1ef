//! The `.version` ledger of applied revisions
//!
//! One line, `rev|rev|...`, in the order the revisions were applied. The
//! whole file is read before and rewritten after every change.

use crate::error::{MigrateError, MigrateResult};
use std::fs;
use std::path::{Path, PathBuf};
use xm_core::Revision;

/// Ledger file name inside the migrations directory
pub const LEDGER_FILE: &str = ".version";

const DELIMITER: char = '|';

/// Ordered set of applied revisions, persisted next to the migrations
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
    applied: Vec<Revision>,
}

impl Ledger {
    /// Open the ledger in `dir`, creating an empty one if missing
    pub fn open(dir: &Path) -> MigrateResult<Self> {
        let path = dir.join(LEDGER_FILE);
        if !path.exists() {
            fs::write(&path, "").map_err(|source| MigrateError::LedgerWrite {
                path: path.display().to_string(),
                source,
            })?;
            log::debug!("Created empty ledger {}", path.display());
        }
        let mut ledger = Self {
            path,
            applied: Vec::new(),
        };
        ledger.reload()?;
        Ok(ledger)
    }

    /// Re-read the ledger from disk
    pub fn reload(&mut self) -> MigrateResult<()> {
        let content = fs::read_to_string(&self.path).map_err(|source| MigrateError::LedgerRead {
            path: self.path.display().to_string(),
            source,
        })?;
        self.applied = parse(&content).map_err(|entry| MigrateError::LedgerCorrupt {
            path: self.path.display().to_string(),
            entry,
        })?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applied revisions in application order
    pub fn applied(&self) -> &[Revision] {
        &self.applied
    }

    pub fn contains(&self, revision: &Revision) -> bool {
        self.applied.contains(revision)
    }

    /// Record `revision` as applied; a no-op if it already is
    pub fn insert(&mut self, revision: &Revision) -> MigrateResult<()> {
        self.reload()?;
        if self.contains(revision) {
            return Ok(());
        }
        self.applied.push(revision.clone());
        self.persist()
    }

    /// Forget `revision`; a no-op if it is not recorded
    pub fn remove(&mut self, revision: &Revision) -> MigrateResult<()> {
        self.reload()?;
        let before = self.applied.len();
        self.applied.retain(|r| r != revision);
        if self.applied.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// Ledger content as written to disk
    pub fn render(&self) -> String {
        self.applied
            .iter()
            .map(Revision::as_str)
            .collect::<Vec<_>>()
            .join(&DELIMITER.to_string())
    }

    /// Write to a sibling temp file, then rename over the ledger
    fn persist(&self) -> MigrateResult<()> {
        let content = self.render();
        let tmp = self.path.with_extension("tmp");
        let write_err = |source| MigrateError::LedgerWrite {
            path: self.path.display().to_string(),
            source,
        };
        fs::write(&tmp, &content).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        log::debug!("Wrote ledger {}: {}", self.path.display(), content);
        Ok(())
    }
}

/// Parse ledger content. Empty segments (including a legacy leading `|`)
/// are skipped; the first non-revision entry is returned as the error.
fn parse(content: &str) -> Result<Vec<Revision>, String> {
    let mut applied: Vec<Revision> = Vec::new();
    for entry in content.trim().split(DELIMITER) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let revision = Revision::parse(entry).map_err(|_| entry.to_string())?;
        if !applied.contains(&revision) {
            applied.push(revision);
        }
    }
    Ok(applied)
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
