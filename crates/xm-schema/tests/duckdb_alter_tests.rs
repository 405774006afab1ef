//! Schema changes against a real in-memory DuckDB

use tempfile::TempDir;
use xm_db::{Backend, DuckDbBackend};
use xm_schema::{IndexKind, ReferentialAction, Schema, SchemaError, Store};

fn store() -> Store {
    Store::new(Box::new(DuckDbBackend::in_memory().unwrap()))
}

fn count(store: &Store, sql: &str) -> usize {
    store.backend().query_count(sql).unwrap()
}

fn create_experiments_and_testcases(schema: &Schema) {
    schema
        .create("experiments", |t| {
            t.increments("id");
            t.primary("id");
            t.string("name", Some(120));
        })
        .unwrap();
    schema
        .create("testcases", |t| {
            t.increments("id");
            t.primary("id");
            t.integer("experiment_id");
            t.foreign("experiment_id")
                .references("id")
                .on("experiments")
                .on_delete(ReferentialAction::Cascade);
        })
        .unwrap();
}

#[test]
fn test_testcases_foreign_key_is_enforced() {
    let store = store();
    let schema = Schema::new(&store);
    create_experiments_and_testcases(&schema);

    store
        .execute("INSERT INTO experiments (name) VALUES ('fib')")
        .unwrap();
    store
        .execute("INSERT INTO testcases (experiment_id) VALUES (1)")
        .unwrap();
    assert!(store
        .execute("INSERT INTO testcases (experiment_id) VALUES (42)")
        .is_err());

    let fks = store.backend().foreign_keys("testcases").unwrap();
    assert_eq!(fks.len(), 1);
    assert_eq!(fks[0].ref_table, "experiments");
}

#[test]
fn test_recreate_keeps_rows_when_adding_columns() {
    let store = store();
    let schema = Schema::new(&store);
    create_experiments_and_testcases(&schema);
    store
        .execute("INSERT INTO experiments (name) VALUES ('a'), ('b')")
        .unwrap();
    store
        .execute("INSERT INTO testcases (experiment_id) VALUES (1), (2), (2)")
        .unwrap();

    schema
        .table("testcases", |t| {
            t.integer("attempts").default(0);
            t.text("notes").nullable();
        })
        .unwrap();

    assert!(schema.has_column("testcases", "attempts").unwrap());
    assert!(schema.has_column("testcases", "notes").unwrap());
    assert!(!schema.has_table("__tmp__testcases").unwrap());
    assert_eq!(count(&store, "SELECT * FROM testcases WHERE attempts = 0"), 3);
    assert_eq!(count(&store, "SELECT * FROM testcases WHERE experiment_id = 2"), 2);

    // keys and the id sequence survive the rebuild
    assert_eq!(store.backend().primary_key("testcases").unwrap(), vec!["id"]);
    assert_eq!(store.backend().foreign_keys("testcases").unwrap().len(), 1);
    store
        .execute("INSERT INTO testcases (experiment_id) VALUES (1)")
        .unwrap();
    assert_eq!(count(&store, "SELECT DISTINCT id FROM testcases"), 4);
}

#[test]
fn test_recreate_drops_columns_and_their_indexes() {
    let store = store();
    let schema = Schema::new(&store);
    schema
        .create("runs", |t| {
            t.integer("seed");
            t.string("host", None);
            t.string("legacy", None).nullable();
            t.index("legacy");
            t.unique("seed");
        })
        .unwrap();
    store
        .execute("INSERT INTO runs (seed, host) VALUES (1, 'a'), (2, 'b')")
        .unwrap();

    schema.table("runs", |t| {
        t.drop_column("legacy");
    })
    .unwrap();

    let columns = store.backend().column_names("runs").unwrap();
    assert_eq!(columns, vec!["seed", "host"]);
    let indexes = store.backend().indexes("runs").unwrap();
    let names: Vec<&str> = indexes.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["runs_seed_unique"]);
    assert_eq!(count(&store, "SELECT * FROM runs"), 2);
}

#[test]
fn test_add_and_drop_index() {
    let store = store();
    let schema = Schema::new(&store);
    schema
        .create("runs", |t| {
            t.integer("seed");
            t.string("host", None);
        })
        .unwrap();

    schema.table("runs", |t| {
        t.index(["host", "seed"]);
    })
    .unwrap();
    let indexes = store.backend().indexes("runs").unwrap();
    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0].name, "runs_host_seed_index");
    assert_eq!(indexes[0].columns, vec!["host", "seed"]);

    schema.table("runs", |t| {
        t.drop_index(["host", "seed"]);
    })
    .unwrap();
    assert!(store.backend().indexes("runs").unwrap().is_empty());
}

#[test]
fn test_rename_and_drop_tables() {
    let store = store();
    let schema = Schema::new(&store);
    schema
        .create("drafts", |t| {
            t.integer("id");
        })
        .unwrap();

    schema.rename("drafts", "posts").unwrap();
    assert!(schema.has_table("posts").unwrap());
    assert!(!schema.has_table("drafts").unwrap());

    schema.drop("posts").unwrap();
    assert!(!schema.has_table("posts").unwrap());
    schema.drop_if_exists("posts").unwrap();

    let err = schema.drop("posts").unwrap_err();
    assert!(matches!(err, SchemaError::Database(_)));
}

#[test]
fn test_alter_unknown_table() {
    let store = store();
    let err = Schema::new(&store)
        .table("nowhere", |t| {
            t.integer("x");
        })
        .unwrap_err();
    assert!(matches!(err, SchemaError::TableNotFound(_)));
}

#[test]
fn test_drop_foreign_key_by_default_name() {
    let store = store();
    let schema = Schema::new(&store);
    create_experiments_and_testcases(&schema);
    assert!(store
        .execute("INSERT INTO testcases (experiment_id) VALUES (7)")
        .is_err());

    schema
        .table("testcases", |t| {
            t.drop_foreign("experiment_id");
        })
        .unwrap();

    assert!(store.backend().foreign_keys("testcases").unwrap().is_empty());
    assert_eq!(store.backend().primary_key("testcases").unwrap(), vec!["id"]);
    // no longer enforced
    store
        .execute("INSERT INTO testcases (experiment_id) VALUES (7)")
        .unwrap();
}

#[test]
fn test_drop_foreign_key_by_custom_name() {
    let store = store();
    let schema = Schema::new(&store);
    schema
        .create("experiments", |t| {
            t.increments("id");
            t.primary("id");
        })
        .unwrap();
    schema
        .create("testcases", |t| {
            t.increments("id");
            t.integer("experiment_id");
            t.foreign("experiment_id")
                .named("fk_testcase_experiment")
                .references("id")
                .on("experiments");
        })
        .unwrap();
    assert_eq!(store.backend().foreign_keys("testcases").unwrap().len(), 1);

    schema
        .table("testcases", |t| {
            t.drop_foreign("experiment_id").named("fk_testcase_experiment");
        })
        .unwrap();

    assert!(store.backend().foreign_keys("testcases").unwrap().is_empty());
    assert!(schema.has_column("testcases", "experiment_id").unwrap());
}

#[test]
fn test_drop_missing_foreign_key_is_an_error() {
    let store = store();
    let schema = Schema::new(&store);
    create_experiments_and_testcases(&schema);

    let err = schema
        .table("testcases", |t| {
            t.drop_foreign("id");
        })
        .unwrap_err();
    match err {
        SchemaError::KeyNotFound { table, kind, .. } => {
            assert_eq!(table, "testcases");
            assert_eq!(kind, IndexKind::Foreign);
        }
        other => panic!("unexpected error: {other}"),
    }
    // the table was left alone
    assert_eq!(store.backend().foreign_keys("testcases").unwrap().len(), 1);
}

#[test]
fn test_drop_primary_key() {
    let store = store();
    let schema = Schema::new(&store);
    create_experiments_and_testcases(&schema);
    store
        .execute("INSERT INTO experiments (name) VALUES ('a')")
        .unwrap();
    store
        .execute("INSERT INTO testcases (experiment_id) VALUES (1)")
        .unwrap();

    schema
        .table("testcases", |t| {
            t.drop_primary("id");
        })
        .unwrap();

    assert!(store.backend().primary_key("testcases").unwrap().is_empty());
    assert_eq!(store.backend().foreign_keys("testcases").unwrap().len(), 1);
    // duplicate ids are accepted once the key is gone
    store
        .execute("INSERT INTO testcases (id, experiment_id) VALUES (1, 1)")
        .unwrap();
    assert_eq!(count(&store, "SELECT * FROM testcases WHERE id = 1"), 2);

    let err = schema
        .table("testcases", |t| {
            t.drop_primary("id");
        })
        .unwrap_err();
    assert!(matches!(err, SchemaError::KeyNotFound { kind: IndexKind::Primary, .. }));
}

#[test]
fn test_schema_survives_reopening_the_database() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("experiments.duckdb");

    {
        let store = Store::new(Box::new(DuckDbBackend::from_path(&path).unwrap()));
        let schema = Schema::new(&store);
        create_experiments_and_testcases(&schema);
        store
            .execute("INSERT INTO experiments (name) VALUES ('fib')")
            .unwrap();
        schema
            .table("testcases", |t| {
                t.text("notes").nullable();
            })
            .unwrap();
    }

    let store = Store::new(Box::new(DuckDbBackend::from_path(&path).unwrap()));
    let schema = Schema::new(&store);
    assert_eq!(
        store.backend().column_names("testcases").unwrap(),
        vec!["id", "experiment_id", "notes"]
    );
    assert_eq!(store.backend().primary_key("testcases").unwrap(), vec!["id"]);
    assert_eq!(store.backend().foreign_keys("testcases").unwrap().len(), 1);
    assert_eq!(count(&store, "SELECT * FROM experiments"), 1);
    assert!(!schema.has_table("__tmp__testcases").unwrap());

    // the id sequence is still there
    store
        .execute("INSERT INTO experiments (name) VALUES ('sort')")
        .unwrap();
    assert_eq!(count(&store, "SELECT DISTINCT id FROM experiments"), 2);
}
