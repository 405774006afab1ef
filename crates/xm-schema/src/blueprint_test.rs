use super::*;
use crate::column::DefaultValue;
use crate::foreign_key::ReferentialAction;

#[test]
fn test_new_defaults_to_alter() {
    let bp = Blueprint::new("users").unwrap();
    assert_eq!(bp.table(), "users");
    assert_eq!(bp.action(), BlueprintAction::Alter);
    assert!(bp.is_empty());
}

#[test]
fn test_create_sets_action() {
    let mut bp = Blueprint::new("users").unwrap();
    bp.create();
    assert_eq!(bp.action(), BlueprintAction::Create);
}

#[test]
fn test_rejects_bad_table_names() {
    for name in ["", "   ", "bad\nname", "__tmp__users"] {
        let err = Blueprint::new(name).unwrap_err();
        assert!(
            matches!(err, SchemaError::InvalidTableName { .. }),
            "{name:?}"
        );
    }
}

#[test]
fn test_columns_keep_declaration_order_and_modifiers() {
    let mut bp = Blueprint::new("experiments").unwrap();
    bp.increments("id");
    bp.string("name", Some(120)).default("unnamed");
    bp.decimal("budget", 8, 2).nullable();
    bp.integer("runs").unsigned();

    let names: Vec<&str> = bp.columns().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["id", "name", "budget", "runs"]);

    let id = &bp.columns()[0];
    assert_eq!(id.token(), &TypeToken::Integer);
    assert!(id.params().autoincrement);

    let name = &bp.columns()[1];
    assert_eq!(name.params().length, Some(120));
    assert_eq!(
        name.default_value(),
        Some(&DefaultValue::Text("unnamed".to_string()))
    );

    let budget = &bp.columns()[2];
    assert_eq!(budget.params().precision, Some(8));
    assert_eq!(budget.params().scale, Some(2));
    assert!(budget.is_nullable());

    assert!(bp.columns()[3].is_unsigned());
}

#[test]
fn test_string_without_length() {
    let mut bp = Blueprint::new("t").unwrap();
    bp.string("label", None);
    assert_eq!(bp.columns()[0].params().length, None);
}

#[test]
fn test_enum_and_array_params() {
    let mut bp = Blueprint::new("t").unwrap();
    bp.enumeration("state", &["queued", "done"]);
    bp.array("samples", TypeToken::Double, Some(2));

    assert_eq!(bp.columns()[0].params().fields, vec!["queued", "done"]);
    let arr = bp.columns()[1].params();
    assert_eq!(arr.element.as_deref(), Some(&TypeToken::Double));
    assert_eq!(arr.dimensions, Some(2));
}

#[test]
fn test_index_default_names() {
    let mut bp = Blueprint::new("users").unwrap();
    bp.primary("id");
    bp.unique("email");
    bp.index(["first", "last"]);

    let names: Vec<&str> = bp.indexes().iter().map(|i| i.name()).collect();
    assert_eq!(
        names,
        vec!["users_id_primary", "users_email_unique", "users_first_last_index"]
    );
    assert_eq!(bp.indexes()[2].columns(), &["first", "last"]);
}

#[test]
fn test_index_custom_name() {
    let mut bp = Blueprint::new("users").unwrap();
    bp.index("email").named("by_email");
    assert_eq!(bp.indexes()[0].name(), "by_email");
}

#[test]
fn test_foreign_is_pre_named() {
    let mut bp = Blueprint::new("testcases").unwrap();
    bp.foreign("experiment_id")
        .references("id")
        .on("experiments")
        .on_delete(ReferentialAction::Cascade);

    let fk = &bp.foreign_keys()[0];
    assert_eq!(fk.name(), "testcases_experiment_id_foreign");
    assert_eq!(fk.ref_table(), Some("experiments"));
}

#[test]
fn test_drops_use_the_same_naming_rule() {
    let mut create = Blueprint::new("users").unwrap();
    create.unique("email");
    create.foreign("team_id");

    let mut alter = Blueprint::new("users").unwrap();
    alter.drop_unique("email");
    alter.drop_foreign("team_id");
    alter.drop_column("legacy").drop_columns(["a", "b"]);

    assert_eq!(alter.dropped().indexes[0].name(), create.indexes()[0].name());
    assert_eq!(
        alter.dropped().indexes[1].name(),
        create.foreign_keys()[0].name()
    );
    assert_eq!(alter.dropped().columns, vec!["legacy", "a", "b"]);
    assert_eq!(
        alter.dropped().index_names(IndexKind::Foreign).collect::<Vec<_>>(),
        vec!["users_team_id_foreign"]
    );
}
