//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use xm_core::Config;
use xm_db::DuckDbBackend;
use xm_migrate::Migrator;
use xm_schema::Store;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main() turns it into the exit status.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A loaded project: its root directory and configuration
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

impl Project {
    pub(crate) fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path_absolute(&self.root)
    }
}

/// Load the project from the directory (or config file) in the global args
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project")?;
    Ok(Project { root, config })
}

/// Open the migrator over the project's migrations directory
pub(crate) fn open_migrator(project: &Project) -> Result<Migrator> {
    let dir = project.migrations_dir();
    Migrator::open(&dir)
        .with_context(|| format!("Failed to open migrations in {}", dir.display()))
}

/// Connect to the database for the resolved target and wrap it in a store.
///
/// Resolves the target via `Config::resolve_target` and selects the
/// platform from the configured database type.
pub(crate) fn create_store(project: &Project, target: Option<&str>) -> Result<Store> {
    let resolved_target = Config::resolve_target(target);
    let db_config = project
        .config
        .database_for_target(resolved_target.as_deref())
        .context("Failed to get database configuration")?;
    let path = db_config.path_absolute(&project.root);
    log::debug!("Connecting to {} database at {}", db_config.db_type.dialect(), path);

    let backend = DuckDbBackend::new(&path).context("Failed to connect to database")?;
    Ok(Store::with_dialect(
        Box::new(backend),
        db_config.db_type.dialect(),
    ))
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}
