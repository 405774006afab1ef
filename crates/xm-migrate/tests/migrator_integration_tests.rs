//! Migration files from tests/fixtures run against a real DuckDB

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use xm_db::{Backend, DuckDbBackend};
use xm_migrate::{
    DownOutcome, MigrateError, MigrationState, Migrator, UpOutcome, LEDGER_FILE,
};
use xm_schema::{Schema, Store};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/migrations");

/// Copy the fixture migrations into a scratch directory so the ledger
/// never lands in the source tree
fn scratch(ledger: Option<&str>) -> TempDir {
    let dir = TempDir::new().unwrap();
    for entry in fs::read_dir(FIXTURES).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, dir.path().join(path.file_name().unwrap())).unwrap();
    }
    if let Some(content) = ledger {
        fs::write(dir.path().join(LEDGER_FILE), content).unwrap();
    }
    dir
}

fn ledger(dir: &Path) -> String {
    fs::read_to_string(dir.join(LEDGER_FILE)).unwrap()
}

fn states(migrator: &mut Migrator) -> Vec<(String, MigrationState)> {
    migrator
        .status()
        .unwrap()
        .into_iter()
        .map(|s| (s.id, s.state))
        .collect()
}

fn tables(store: &Store) -> Vec<String> {
    let mut names = store.backend().table_names().unwrap();
    names.sort();
    names
}

#[test]
fn test_status_reads_legacy_ledger() {
    let dir = scratch(Some("|20180101000000|20180102000000"));
    let mut migrator = Migrator::open(dir.path()).unwrap();

    assert_eq!(
        states(&mut migrator),
        vec![
            (
                "20180101000000_create_experiments_table".to_string(),
                MigrationState::Applied
            ),
            (
                "20180102000000_create_testcases_table".to_string(),
                MigrationState::Applied
            ),
            (
                "20180103000000_add_notes_to_testcases".to_string(),
                MigrationState::Pending
            ),
        ]
    );
}

#[test]
fn test_up_applies_one_migration_at_a_time() {
    let dir = scratch(None);
    let mut migrator = Migrator::open(dir.path()).unwrap();
    let store = Store::new(Box::new(DuckDbBackend::in_memory().unwrap()));
    let schema = Schema::new(&store);

    assert_eq!(
        migrator.up(&schema, None).unwrap(),
        UpOutcome::Migrated("20180101000000_create_experiments_table".to_string())
    );
    assert_eq!(tables(&store), vec!["experiments"]);
    assert_eq!(ledger(dir.path()), "20180101000000");

    migrator.up(&schema, None).unwrap();
    migrator.up(&schema, None).unwrap();
    assert_eq!(migrator.up(&schema, None).unwrap(), UpOutcome::UpToDate);

    assert_eq!(tables(&store), vec!["experiments", "testcases"]);
    assert!(store.has_column("testcases", "notes").unwrap());
    assert_eq!(
        ledger(dir.path()),
        "20180101000000|20180102000000|20180103000000"
    );
}

#[test]
fn test_alter_migration_keeps_rows() {
    let dir = scratch(None);
    let mut migrator = Migrator::open(dir.path()).unwrap();
    let store = Store::new(Box::new(DuckDbBackend::in_memory().unwrap()));
    let schema = Schema::new(&store);

    migrator.up(&schema, Some("20180101000000")).unwrap();
    migrator.up(&schema, Some("20180102000000")).unwrap();
    store
        .execute("INSERT INTO experiments (name) VALUES ('fib'), ('sort')")
        .unwrap();
    store
        .execute("INSERT INTO testcases (experiment_id, passed) VALUES (1, true), (2, false), (2, true)")
        .unwrap();

    migrator.up(&schema, None).unwrap();
    let backend = store.backend();
    assert_eq!(backend.query_count("SELECT * FROM testcases").unwrap(), 3);
    assert_eq!(
        backend
            .query_count("SELECT * FROM testcases WHERE notes IS NULL AND attempts = 0")
            .unwrap(),
        3
    );
    assert_eq!(
        backend
            .query_count("SELECT * FROM testcases WHERE experiment_id = 2 AND passed")
            .unwrap(),
        1
    );

    assert_eq!(
        migrator.down(&schema, None).unwrap(),
        DownOutcome::Reverted("20180103000000_add_notes_to_testcases".to_string())
    );
    assert!(!store.has_column("testcases", "notes").unwrap());
    assert!(!store.has_column("testcases", "attempts").unwrap());
    assert_eq!(backend.query_count("SELECT * FROM testcases").unwrap(), 3);
}

#[test]
fn test_refresh_twice_gives_same_shape() {
    let dir = scratch(None);
    let mut migrator = Migrator::open(dir.path()).unwrap();
    let store = Store::new(Box::new(DuckDbBackend::in_memory().unwrap()));
    let schema = Schema::new(&store);

    let first = migrator.refresh(&schema).unwrap();
    assert!(first.reverted.is_empty());
    assert_eq!(first.migrated.len(), 3);
    let ledger_after_first = ledger(dir.path());
    let columns_after_first = store.backend().column_names("testcases").unwrap();

    let second = migrator.refresh(&schema).unwrap();
    assert_eq!(
        second.reverted,
        vec![
            "20180103000000_add_notes_to_testcases",
            "20180102000000_create_testcases_table",
            "20180101000000_create_experiments_table",
        ]
    );
    assert_eq!(second.migrated, first.migrated);
    assert_eq!(ledger(dir.path()), ledger_after_first);
    assert_eq!(
        store.backend().column_names("testcases").unwrap(),
        columns_after_first
    );
    assert_eq!(tables(&store), vec!["experiments", "testcases"]);
}

#[test]
fn test_make_then_status_up_down() {
    let dir = scratch(Some("20180101000000|20180102000000|20180103000000"));
    let mut migrator = Migrator::open(dir.path()).unwrap();
    let store = Store::new(Box::new(DuckDbBackend::in_memory().unwrap()));
    let schema = Schema::new(&store);

    let path = migrator.make("create results table").unwrap();
    let stem = path.file_stem().unwrap().to_str().unwrap().to_string();
    assert!(stem.ends_with("_create_results_table"));

    let state = |migrator: &mut Migrator| {
        states(migrator)
            .into_iter()
            .find(|(id, _)| *id == stem)
            .map(|(_, state)| state)
    };
    assert_eq!(state(&mut migrator), Some(MigrationState::Pending));

    assert_eq!(
        migrator.up(&schema, None).unwrap(),
        UpOutcome::Migrated(stem.clone())
    );
    assert_eq!(state(&mut migrator), Some(MigrationState::Applied));

    assert_eq!(
        migrator.down(&schema, None).unwrap(),
        DownOutcome::Reverted(stem.clone())
    );
    assert_eq!(state(&mut migrator), Some(MigrationState::Pending));

    // a fresh migrator discovers the generated file
    let mut reopened = Migrator::open(dir.path()).unwrap();
    assert_eq!(state(&mut reopened), Some(MigrationState::Pending));
}

#[test]
fn test_failed_migration_names_the_migration() {
    let dir = scratch(None);
    let mut migrator = Migrator::open(dir.path()).unwrap();
    let store = Store::new(Box::new(DuckDbBackend::in_memory().unwrap()));
    let schema = Schema::new(&store);

    // the alter targets a table that was never created
    let err = migrator
        .up(&schema, Some("20180103000000"))
        .unwrap_err();
    assert!(matches!(err, MigrateError::MigrationFailed { .. }));
    let message = err.to_string();
    assert!(message.contains("20180103000000_add_notes_to_testcases"));
    assert!(message.contains("testcases"));
    assert_eq!(ledger(dir.path()), "");
}

#[test]
fn test_malformed_file_fails_open() {
    let dir = scratch(None);
    fs::write(
        dir.path().join("20180104000000_broken.yml"),
        "migration: Broken\nup: not-a-list\n",
    )
    .unwrap();

    let err = Migrator::open(dir.path()).err().unwrap();
    assert!(matches!(err, MigrateError::InvalidMigrationFile { .. }));
    assert!(err.to_string().contains("20180104000000_broken.yml"));
}
