//! Template for new migration files

use crate::error::{MigrateError, MigrateResult};
use minijinja::{context, Environment};
use std::path::{Path, PathBuf};
use xm_core::naming::to_pascal_case;
use xm_core::Revision;

const MIGRATION_TEMPLATE: &str = r#"# {{ revision }}_{{ name }}
migration: {{ migration }}
revision: "{{ revision }}"

up: []
  # - op: create
  #   table: {{ name }}
  #   columns:
  #     - { name: id, type: increments }
  #   primary: id

down: []
  # - op: drop_if_exists
  #   table: {{ name }}
"#;

/// Render the body of a new migration file
pub fn render(revision: &Revision, name: &str) -> MigrateResult<String> {
    let env = Environment::new();
    let rendered = env.render_str(
        MIGRATION_TEMPLATE,
        context! {
            revision => revision.as_str(),
            name => name,
            migration => to_pascal_case(name),
        },
    )?;
    Ok(rendered)
}

/// Write a new migration into `dir`; never overwrites an existing file
pub fn write(dir: &Path, revision: &Revision, name: &str) -> MigrateResult<PathBuf> {
    let path = dir.join(format!("{}_{}.yml", revision, name));
    if path.exists() {
        return Err(MigrateError::MigrationExists {
            path: path.display().to_string(),
        });
    }

    let content = render(revision, name)?;
    std::fs::write(&path, content).map_err(|source| MigrateError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::debug!("Wrote migration template {}", path.display());
    Ok(path)
}
