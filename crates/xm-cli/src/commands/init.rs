//! Init command implementation - scaffolds a new Experimentum project

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use xm_migrate::LEDGER_FILE;

use crate::cli::InitArgs;

/// Execute the init command
pub(crate) fn execute(args: &InitArgs) -> Result<()> {
    // Reject names that could cause path traversal or confusing directory names
    if args.name.contains('/')
        || args.name.contains('\\')
        || args.name.contains("..")
        || args.name.starts_with('.')
        || args.name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not contain '/', '\\', '..', or start with '.' or '-'",
            args.name
        );
    }

    let project_dir = Path::new(&args.name);

    if project_dir.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Choose a different project name.",
            args.name
        );
    }

    println!("Creating new Experimentum project: {}\n", args.name);

    let migrations_dir = project_dir.join("migrations");
    fs::create_dir_all(&migrations_dir)
        .with_context(|| format!("Failed to create directory: {}", migrations_dir.display()))?;

    // Escape YAML special characters in interpolated values
    let safe_name = args.name.replace('"', "\\\"");
    let safe_db_path = args.database_path.replace('"', "\\\"");
    let config_content = format!(
        r#"name: "{name}"

migrations:
  path: migrations

database:
  type: duckdb
  path: "{db_path}"

# targets:
#   test:
#     database:
#       type: duckdb
#       path: ":memory:"
"#,
        name = safe_name,
        db_path = safe_db_path,
    );
    fs::write(project_dir.join("experimentum.yml"), config_content)
        .context("Failed to write experimentum.yml")?;

    fs::write(migrations_dir.join(LEDGER_FILE), "")
        .with_context(|| format!("Failed to write migrations/{}", LEDGER_FILE))?;

    let gitignore = format!("{}\n{}.wal\n", args.database_path, args.database_path);
    fs::write(project_dir.join(".gitignore"), gitignore).context("Failed to write .gitignore")?;

    println!("  experimentum.yml");
    println!("  migrations/");
    println!("  .gitignore");
    println!("\nNext steps:");
    println!("  cd {}", args.name);
    println!("  xm migrate make create_experiments_table");
    println!("  xm migrate up");

    Ok(())
}
