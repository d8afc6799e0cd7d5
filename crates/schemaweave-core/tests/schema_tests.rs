// Integration tests for the schema model, validation and translation
mod common;

use pretty_assertions::assert_eq;
use schemaweave_core::error::Endpoint;
use schemaweave_core::schema::{
    validate, Column, Field, Schema, SchemaSource, SqlSchemaBuilder, Table,
};
use schemaweave_core::{SqlDialect, ValidationError, ValueType};

use common::blog_schema;

fn with_field(table: &str, column: &str, field: Field) -> Schema {
    let mut schema = blog_schema();
    schema
        .tables
        .get_mut(table)
        .unwrap()
        .columns
        .insert(column.to_string(), field.into());
    schema
}

#[test]
fn test_blog_schema_is_valid() {
    assert_eq!(validate(&blog_schema()), Ok(()));
}

#[test]
fn test_each_broken_condition_fails() {
    // missing endpoint table
    let schema = with_field("Post", "tags", Field::relation_many("Post.id", "Tag.postId"));
    assert!(matches!(
        validate(&schema),
        Err(ValidationError::RelationTableNotFound { .. })
    ));

    // missing endpoint column
    let schema = with_field("Post", "editor", Field::relation_one("Post.editorId", "User.id"));
    assert!(matches!(
        validate(&schema),
        Err(ValidationError::RelationColumnNotFound {
            endpoint: Endpoint::Source,
            ..
        })
    ));

    // endpoint is not an atom
    let schema = with_field("Post", "poster", Field::relation_one("Post.id", "User.posts"));
    assert!(matches!(
        validate(&schema),
        Err(ValidationError::RelationEndpointNotAtom {
            endpoint: Endpoint::Destination,
            ..
        })
    ));

    // endpoint types differ
    let schema = with_field("Post", "named", Field::relation_one("Post.text", "User.id"));
    let err = validate(&schema).unwrap_err();
    assert_eq!(
        err.to_string(),
        "in relation Post.named, source column Post.text (TEXT) and referenced column User.id (INTEGER) must have the same type"
    );

    // dangling alias
    let schema = with_field("User", "nickname", Field::alias("handle"));
    assert_eq!(
        validate(&schema),
        Err(ValidationError::DanglingAlias {
            table: "User".to_string(),
            column: "nickname".to_string(),
            target: "handle".to_string(),
        })
    );
}

#[test]
fn test_first_violation_wins() {
    let schema = Schema::new()
        .table(
            "Post",
            Table::new().column("writer", Field::alias("missing")),
        )
        .table("bad-name", Table::new());

    assert!(matches!(
        validate(&schema),
        Err(ValidationError::DanglingAlias { .. })
    ));
}

#[test]
fn test_json_layout() {
    let schema = Schema::new().table(
        "User",
        Table::new()
            .column("id", Field::integer("PRIMARY KEY"))
            .column("handle", Column::renamed("nick", Field::alias("id")))
            .renamed_from("Person"),
    );

    let value: serde_json::Value = serde_json::from_str(&schema.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "User": {
                "columns": {
                    "id": {
                        "kind": "atom",
                        "sqlType": "INTEGER",
                        "valueType": "number",
                        "constraints": "PRIMARY KEY"
                    },
                    "handle": {
                        "kind": "alias",
                        "target": "id",
                        "renamedFrom": "nick"
                    }
                },
                "renamedFrom": "Person"
            }
        })
    );
}

#[test]
fn test_canonical_schema_round_trips() {
    let schema = blog_schema();
    let json = schema.to_json().unwrap();
    let loaded = Schema::from_json(&json).unwrap();
    assert_eq!(loaded, schema);
    assert!(loaded.is_canonical());
}

#[test]
fn test_relation_endpoints_serialize_as_dotted_names() {
    let json = blog_schema().to_json().unwrap();
    assert!(json.contains("\"source\": \"Post.authorId\""));
    assert!(json.contains("\"destination\": \"User.id\""));
}

#[test]
fn test_translated_schema_validates() {
    let ddl = r#"
        CREATE TABLE User (
            id INTEGER PRIMARY KEY,
            name TEXT,
            active BOOLEAN NOT NULL,
            settings JSON
        );
        CREATE TABLE Post (
            id INTEGER PRIMARY KEY,
            authorId INTEGER NOT NULL
        );
    "#;
    let mut schema = SqlSchemaBuilder::with_dialect(SqlDialect::SQLite)
        .to_schema(ddl)
        .unwrap();
    schema.tables.get_mut("Post").unwrap().columns.insert(
        "author".to_string(),
        Field::relation_one("Post.authorId", "User.id").into(),
    );

    assert_eq!(validate(&schema), Ok(()));
    let user = schema.get_table("User").unwrap();
    assert!(matches!(
        user.get_field("active"),
        Some(Field::Atom(atom)) if atom.value_type == ValueType::Boolean
    ));
    assert!(matches!(
        user.get_field("settings"),
        Some(Field::Atom(atom)) if atom.value_type == ValueType::Json
    ));
}
