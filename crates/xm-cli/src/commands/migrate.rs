//! Migrate command implementation - status, up, down, refresh and make

use anyhow::{Context, Result};
use serde::Serialize;
use xm_migrate::{Direction, DownOutcome, MigrationState, MigrationStatus, UpOutcome};
use xm_schema::Schema;

use crate::cli::{
    GlobalArgs, MakeArgs, MigrateArgs, MigrateCommands, StatusArgs, StatusOutput, StepArgs,
};
use crate::commands::common::{self, create_store, load_project, open_migrator, ExitCode};

/// Execute the migrate command
pub(crate) fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    match &args.command {
        MigrateCommands::Status(sub) => status(sub, global),
        MigrateCommands::Up(sub) => up(sub, global),
        MigrateCommands::Down(sub) => down(sub, global),
        MigrateCommands::Refresh => refresh(global),
        MigrateCommands::Make(sub) => make(sub, global),
    }
}

/// JSON shape of `migrate status -o json`
#[derive(Serialize)]
struct StatusReport<'a> {
    migrations: &'a [MigrationStatus],
    orphaned: Vec<&'a str>,
}

fn status(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut migrator = open_migrator(&project)?;
    let statuses = migrator.status()?;
    let orphaned = migrator.orphaned();

    match args.output {
        StatusOutput::Json => {
            let report = StatusReport {
                migrations: &statuses,
                orphaned: orphaned.iter().map(|r| r.as_str()).collect(),
            };
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize status")?;
            println!("{}", json);
        }
        StatusOutput::Table => {
            if statuses.is_empty() {
                println!("No migrations found in {}", migrator.dir().display());
            } else {
                let rows: Vec<Vec<String>> = statuses
                    .iter()
                    .map(|s| {
                        vec![
                            s.id.clone(),
                            s.created
                                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                                .unwrap_or_else(|| "-".to_string()),
                            s.state.to_string(),
                        ]
                    })
                    .collect();
                common::print_table(&["MIGRATION", "CREATED", "STATUS"], &rows);
            }
            for revision in &orphaned {
                println!(
                    "Warning: revision {} is recorded as applied but has no migration file",
                    revision
                );
            }
        }
    }

    let pending = statuses
        .iter()
        .filter(|s| s.state == MigrationState::Pending)
        .count();
    if args.check && pending > 0 {
        if args.output == StatusOutput::Table {
            println!("\n{} pending migration(s)", pending);
        }
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn up(args: &StepArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut migrator = open_migrator(&project)?;
    let store = create_store(&project, global.target.as_deref())?;
    let schema = Schema::new(&store);

    match migrator.up(&schema, args.migration.as_deref())? {
        UpOutcome::Migrated(id) => println!("Migrated {}", id),
        UpOutcome::UpToDate => println!("Migrations are all up to date."),
        UpOutcome::AlreadyApplied(id) => println!("Migration {} is already applied.", id),
    }
    Ok(())
}

fn down(args: &StepArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut migrator = open_migrator(&project)?;
    let store = create_store(&project, global.target.as_deref())?;
    let schema = Schema::new(&store);

    match migrator.down(&schema, args.migration.as_deref())? {
        DownOutcome::Reverted(id) => println!("Reverted {}", id),
        DownOutcome::NothingToRevert => println!("There are no migrations to downgrade."),
        DownOutcome::NotApplied(id) => println!("Migration {} is not applied.", id),
    }
    Ok(())
}

fn refresh(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut migrator = open_migrator(&project)?;
    let store = create_store(&project, global.target.as_deref())?;
    let schema = Schema::new(&store);

    println!("--- Downgrading Migrations ---");
    let mut upgrading = false;
    migrator.refresh_with(&schema, |direction, id| match direction {
        Direction::Down => println!("Reverted {}", id),
        Direction::Up => {
            if !upgrading {
                println!("\n--- Upgrading Migrations ---");
                upgrading = true;
            }
            println!("Migrated {}", id);
        }
    })?;
    if !upgrading {
        println!("\n--- Upgrading Migrations ---");
        println!("Migrations are all up to date.");
    }
    Ok(())
}

fn make(args: &MakeArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut migrator = open_migrator(&project)?;

    let path = migrator.make(&args.name)?;
    println!("Migration created successfully!");
    println!("  {}", path.display());
    Ok(())
}
