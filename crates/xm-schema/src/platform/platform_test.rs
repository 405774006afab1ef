use super::*;
use crate::blueprint::Blueprint;
use crate::foreign_key::ReferentialAction;
use crate::typemap::{Resolved, TypeMapper};
use sqlparser::dialect::{DuckDbDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

fn testcases() -> Blueprint {
    let mut bp = Blueprint::new("testcases").unwrap();
    bp.create();
    bp.increments("id");
    bp.primary("id");
    bp.integer("experiment_id");
    bp.foreign("experiment_id")
        .references("id")
        .on("experiments")
        .on_delete(ReferentialAction::Cascade);
    bp
}

fn resolve(dialect: Dialect, bp: &Blueprint) -> Resolved {
    TypeMapper::new(dialect).columns_and_indexes(bp).unwrap()
}

fn create_sql(dialect: Dialect, bp: &Blueprint) -> Vec<String> {
    let resolved = resolve(dialect, bp);
    platform_for(dialect).create_table_sql(bp.table(), &resolved.columns, &resolved.indexes)
}

fn assert_parses(dialect: &dyn sqlparser::dialect::Dialect, statements: &[String]) {
    for sql in statements {
        if let Err(e) = Parser::parse_sql(dialect, sql) {
            panic!("failed to parse {sql}: {e}");
        }
    }
}

#[test]
fn test_platform_for_matches_dialect() {
    for dialect in Dialect::ALL {
        assert_eq!(platform_for(dialect).dialect(), dialect);
    }
}

#[test]
fn test_recreate_dialects_have_no_incremental_alter() {
    assert!(!platform_for(Dialect::DuckDb).capabilities().incremental_alter);
    assert!(!platform_for(Dialect::Sqlite).capabilities().incremental_alter);
    assert!(platform_for(Dialect::Postgres).capabilities().incremental_alter);
    assert!(platform_for(Dialect::MySql).capabilities().incremental_alter);
    assert!(platform_for(Dialect::MsSql).capabilities().incremental_alter);
}

#[test]
fn test_postgres_create_table() {
    let sql = create_sql(Dialect::Postgres, &testcases());
    assert_eq!(
        sql,
        vec![
            "CREATE TABLE \"testcases\" (\"id\" SERIAL NOT NULL, \"experiment_id\" INTEGER NOT NULL, \
             CONSTRAINT \"testcases_id_primary\" PRIMARY KEY (\"id\"), \
             CONSTRAINT \"testcases_experiment_id_foreign\" FOREIGN KEY (\"experiment_id\") \
             REFERENCES \"experiments\" (\"id\") ON DELETE CASCADE)"
                .to_string()
        ]
    );
    assert_parses(&PostgreSqlDialect {}, &sql);
}

#[test]
fn test_mysql_create_table() {
    let sql = create_sql(Dialect::MySql, &testcases());
    assert_eq!(sql.len(), 1);
    assert!(sql[0].starts_with("CREATE TABLE `testcases` (`id` INT UNSIGNED AUTO_INCREMENT NOT NULL"));
    assert!(sql[0].contains(", PRIMARY KEY (`id`)"));
    assert!(sql[0].contains(
        "CONSTRAINT `testcases_experiment_id_foreign` FOREIGN KEY (`experiment_id`) REFERENCES `experiments` (`id`) ON DELETE CASCADE"
    ));
    assert_parses(&MySqlDialect {}, &sql);
}

#[test]
fn test_mssql_create_table() {
    let sql = create_sql(Dialect::MsSql, &testcases());
    assert!(sql[0].starts_with("CREATE TABLE [testcases] ([id] INT IDENTITY(1,1) NOT NULL"));
    assert!(sql[0].contains("CONSTRAINT [testcases_id_primary] PRIMARY KEY ([id])"));
}

#[test]
fn test_duckdb_create_table_uses_sequence_and_drops_names() {
    let sql = create_sql(Dialect::DuckDb, &testcases());
    assert_eq!(
        sql,
        vec![
            "CREATE SEQUENCE IF NOT EXISTS \"testcases_id_seq\"".to_string(),
            "CREATE TABLE \"testcases\" (\"id\" INTEGER DEFAULT nextval('testcases_id_seq') NOT NULL, \
             \"experiment_id\" INTEGER NOT NULL, PRIMARY KEY (\"id\"), \
             FOREIGN KEY (\"experiment_id\") REFERENCES \"experiments\" (\"id\"))"
                .to_string(),
        ]
    );
    assert_parses(&DuckDbDialect {}, &sql);
}

#[test]
fn test_sqlite_create_table() {
    let sql = create_sql(Dialect::Sqlite, &testcases());
    assert_eq!(sql.len(), 1);
    assert!(sql[0].contains("\"id\" INTEGER NOT NULL"));
    assert!(sql[0].contains("ON DELETE CASCADE"));
    assert_parses(&SQLiteDialect {}, &sql);
}

#[test]
fn test_secondary_indexes_follow_create() {
    let mut bp = Blueprint::new("users").unwrap();
    bp.create();
    bp.string("email", None);
    bp.string("first", Some(40));
    bp.string("last", Some(40));
    bp.unique("email");
    bp.index(["first", "last"]);

    let sql = create_sql(Dialect::Postgres, &bp);
    assert_eq!(sql.len(), 3);
    assert_eq!(
        sql[1],
        "CREATE UNIQUE INDEX \"users_email_unique\" ON \"users\" (\"email\")"
    );
    assert_eq!(
        sql[2],
        "CREATE INDEX \"users_first_last_index\" ON \"users\" (\"first\", \"last\")"
    );
    assert_parses(&PostgreSqlDialect {}, &sql);
}

#[test]
fn test_defaults_and_enum_checks() {
    let mut bp = Blueprint::new("jobs").unwrap();
    bp.create();
    bp.boolean("active").default(true);
    bp.string("label", Some(20)).nullable().default("it's");
    bp.enumeration("state", &["queued", "done"]);

    let pg = create_sql(Dialect::Postgres, &bp);
    assert!(pg[0].contains("\"active\" BOOLEAN NOT NULL DEFAULT TRUE"));
    assert!(pg[0].contains("\"label\" VARCHAR(20) DEFAULT 'it''s'"));
    assert!(pg[0].contains("\"state\" VARCHAR(255) NOT NULL CHECK (\"state\" IN ('queued', 'done'))"));
    assert_parses(&PostgreSqlDialect {}, &pg);

    let mssql = create_sql(Dialect::MsSql, &bp);
    assert!(mssql[0].contains("[active] BIT NOT NULL DEFAULT 1"));
    assert!(mssql[0].contains("[label] NVARCHAR(20) DEFAULT N'it''s'"));

    let duck = create_sql(Dialect::DuckDb, &bp);
    assert!(duck[0].contains("\"state\" ENUM('queued', 'done') NOT NULL)"));
    assert!(!duck[0].contains("CHECK"));
}

#[test]
fn test_add_column_per_dialect() {
    let column = ColumnDef::plain("notes", "TEXT");
    assert_eq!(
        platform_for(Dialect::Postgres).add_column_sql("runs", &column),
        vec!["ALTER TABLE \"runs\" ADD COLUMN \"notes\" TEXT"]
    );
    assert_eq!(
        platform_for(Dialect::MsSql).add_column_sql("runs", &column),
        vec!["ALTER TABLE [runs] ADD [notes] TEXT"]
    );
    assert_eq!(
        platform_for(Dialect::MySql).add_column_sql("runs", &column),
        vec!["ALTER TABLE `runs` ADD COLUMN `notes` TEXT"]
    );
}

#[test]
fn test_add_keys() {
    let primary = IndexDescriptor::new("runs_id_primary", vec!["id".to_string()], IndexKind::Primary);
    assert_eq!(
        platform_for(Dialect::Postgres).add_primary_key_sql("runs", &primary),
        "ALTER TABLE \"runs\" ADD CONSTRAINT \"runs_id_primary\" PRIMARY KEY (\"id\")"
    );
    assert_eq!(
        platform_for(Dialect::MySql).add_primary_key_sql("runs", &primary),
        "ALTER TABLE `runs` ADD PRIMARY KEY (`id`)"
    );

    let fk = ForeignKeyDef {
        name: "runs_experiment_id_foreign".to_string(),
        column: "experiment_id".to_string(),
        ref_table: "experiments".to_string(),
        ref_column: "id".to_string(),
        on_delete: None,
        on_update: Some(ReferentialAction::SetNull),
    };
    assert_eq!(
        platform_for(Dialect::Postgres).add_foreign_key_sql("runs", &fk),
        "ALTER TABLE \"runs\" ADD CONSTRAINT \"runs_experiment_id_foreign\" \
         FOREIGN KEY (\"experiment_id\") REFERENCES \"experiments\" (\"id\") ON UPDATE SET NULL"
    );
}

#[test]
fn test_drop_keys_per_dialect() {
    let unique = IndexDescriptor::new("users_email_unique", vec!["email".to_string()], IndexKind::Unique);
    let foreign = IndexDescriptor::new("users_team_id_foreign", vec!["team_id".to_string()], IndexKind::Foreign);

    let pg = platform_for(Dialect::Postgres);
    assert_eq!(
        pg.drop_key_sql("users", None, &unique).unwrap(),
        vec!["DROP INDEX \"users_email_unique\""]
    );
    assert_eq!(
        pg.drop_key_sql("users", None, &foreign).unwrap(),
        vec!["ALTER TABLE \"users\" DROP CONSTRAINT \"users_team_id_foreign\""]
    );

    let mysql = platform_for(Dialect::MySql);
    assert_eq!(
        mysql.drop_key_sql("users", None, &unique).unwrap(),
        vec!["ALTER TABLE `users` DROP INDEX `users_email_unique`"]
    );
    assert_eq!(
        mysql.drop_key_sql("users", None, &foreign).unwrap(),
        vec!["ALTER TABLE `users` DROP FOREIGN KEY `users_team_id_foreign`"]
    );

    let mssql = platform_for(Dialect::MsSql);
    assert_eq!(
        mssql.drop_key_sql("users", None, &unique).unwrap(),
        vec!["DROP INDEX [users_email_unique] ON [users]"]
    );
}

#[test]
fn test_mysql_drop_primary_rewrites_column_first() {
    let primary = IndexDescriptor::new("users_id_primary", vec!["id".to_string()], IndexKind::Primary);
    let live = ColumnInfo {
        name: "id".to_string(),
        data_type: "int unsigned".to_string(),
        nullable: false,
        default: None,
    };
    let sql = platform_for(Dialect::MySql)
        .drop_key_sql("users", Some(&live), &primary)
        .unwrap();
    assert_eq!(
        sql,
        vec![
            "ALTER TABLE `users` CHANGE `id` `id` int unsigned NOT NULL",
            "ALTER TABLE `users` DROP PRIMARY KEY",
        ]
    );
}

#[test]
fn test_mysql_drop_primary_requires_live_column() {
    let primary = IndexDescriptor::new("users_id_primary", vec!["id".to_string()], IndexKind::Primary);
    let err = platform_for(Dialect::MySql)
        .drop_key_sql("users", None, &primary)
        .unwrap_err();
    assert!(matches!(err, crate::SchemaError::KeyColumnNotFound { .. }));
}

#[test]
fn test_rename_and_drop_table() {
    assert_eq!(
        platform_for(Dialect::Postgres).rename_sql("a", "b"),
        "ALTER TABLE \"a\" RENAME TO \"b\""
    );
    assert_eq!(
        platform_for(Dialect::MySql).rename_sql("a", "b"),
        "RENAME TABLE `a` TO `b`"
    );
    assert_eq!(
        platform_for(Dialect::MsSql).rename_sql("a", "b"),
        "EXEC sp_rename 'a', 'b'"
    );
    assert_eq!(
        platform_for(Dialect::DuckDb).drop_table_sql("a", true),
        "DROP TABLE IF EXISTS \"a\""
    );
    assert_eq!(
        platform_for(Dialect::Sqlite).drop_table_sql("a", false),
        "DROP TABLE \"a\""
    );
}

#[test]
fn test_quoting_escapes_delimiters() {
    assert_eq!(platform_for(Dialect::Postgres).quote_ident("a\"b"), "\"a\"\"b\"");
    assert_eq!(platform_for(Dialect::MySql).quote_ident("a`b"), "`a``b`");
    assert_eq!(platform_for(Dialect::MsSql).quote_ident("a]b"), "[a]]b]");
}

#[test]
fn test_drop_columns_one_statement_each() {
    let sql = platform_for(Dialect::Postgres)
        .drop_columns_sql("runs", &["a".to_string(), "b".to_string()]);
    assert_eq!(
        sql,
        vec![
            "ALTER TABLE \"runs\" DROP COLUMN \"a\"",
            "ALTER TABLE \"runs\" DROP COLUMN \"b\"",
        ]
    );
}

#[test]
fn test_render_default_expression_passthrough() {
    let expr = DefaultValue::expression("CURRENT_TIMESTAMP");
    assert_eq!(platform_for(Dialect::Postgres).render_default(&expr), "CURRENT_TIMESTAMP");
    assert_eq!(platform_for(Dialect::Sqlite).render_default(&expr), "(CURRENT_TIMESTAMP)");
}
