use super::*;
use tempfile::TempDir;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: lab\n").unwrap();
    assert_eq!(config.name, "lab");
    assert_eq!(config.migrations.path, "migrations");
    assert_eq!(config.database.db_type, DbType::DuckDb);
    assert_eq!(config.database.path, "experimentum.duckdb");

    let root = PathBuf::from("/tmp/lab");
    assert_eq!(
        config.migrations_path_absolute(&root),
        root.join("migrations")
    );
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: benchmarks
migrations:
  path: db/migrations
database:
  type: duckdb
  path: ./results.duckdb
targets:
  test:
    database:
      type: duckdb
      path: ":memory:"
  ci: {}
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.migrations.path, "db/migrations");
    assert_eq!(config.available_targets(), vec!["ci", "test"]);

    let test_db = config.database_for_target(Some("test")).unwrap();
    assert!(test_db.is_in_memory());

    // A target without a database block falls back to the base config
    let ci_db = config.database_for_target(Some("ci")).unwrap();
    assert_eq!(ci_db.path, "./results.duckdb");

    let base = config.database_for_target(None).unwrap();
    assert_eq!(base.db_type.dialect(), Dialect::DuckDb);
}

#[test]
fn test_unknown_target_lists_available() {
    let yaml = "name: lab\ntargets:\n  dev: {}\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let err = config.database_for_target(Some("prod")).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("[E003]"));
    assert!(msg.contains("'prod'"));
    assert!(msg.contains("dev"));
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: lab\nstorage: {}\n");
    assert!(result.is_err());
}

#[test]
fn test_path_absolute() {
    let root = Path::new("/srv/lab");
    let relative = DatabaseConfig {
        db_type: DbType::DuckDb,
        path: "data/lab.duckdb".to_string(),
    };
    assert_eq!(relative.path_absolute(root), "/srv/lab/data/lab.duckdb");

    let memory = DatabaseConfig {
        db_type: DbType::DuckDb,
        path: ":memory:".to_string(),
    };
    assert_eq!(memory.path_absolute(root), ":memory:");
}

#[test]
fn test_load_from_dir_prefers_yml() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("experimentum.yml"), "name: first\n").unwrap();
    std::fs::write(dir.path().join("experimentum.yaml"), "name: second\n").unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "first");
}

#[test]
fn test_load_from_dir_yaml_fallback() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("experimentum.yaml"), "name: second\n").unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "second");
}

#[test]
fn test_load_from_dir_missing() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_rejects_empty_name() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("experimentum.yml");
    std::fs::write(&path, "name: \"  \"\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_load_reports_parse_errors_with_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("experimentum.yml");
    std::fs::write(&path, "name: [unclosed\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("[E002]"));
    assert!(msg.contains("experimentum.yml"));
}

#[test]
fn test_resolve_target_prefers_cli_flag() {
    assert_eq!(
        Config::resolve_target(Some("test")),
        Some("test".to_string())
    );
}
