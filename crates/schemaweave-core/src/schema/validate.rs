//! Schema validation - identifier, relation and alias checks

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Endpoint, ValidationError};
use crate::schema::{Alias, Field, Relation, Schema, Table};

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[A-Za-z_]+$").expect("identifier pattern is valid"))
}

/// Check a schema, stopping at the first violation
///
/// Tables and then their columns are visited in declaration order. For each
/// column the name is checked first, then the relation or alias it declares.
/// Index and constraint definitions are opaque and never inspected.
pub fn validate(schema: &Schema) -> Result<(), ValidationError> {
    for (table_name, table) in &schema.tables {
        validate_name(table_name)?;
        for (column_name, column) in &table.columns {
            validate_name(column_name)?;
            match &column.field {
                Field::Relation(relation) => {
                    validate_relation(schema, table_name, column_name, relation)?
                }
                Field::Alias(alias) => validate_alias(table, table_name, column_name, alias)?,
                Field::Atom(_) | Field::Index(_) | Field::Constraint(_) => {}
            }
        }
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if identifier_pattern().is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

fn validate_relation(
    schema: &Schema,
    table_name: &str,
    column_name: &str,
    relation: &Relation,
) -> Result<(), ValidationError> {
    if relation.source.table != table_name {
        return Err(ValidationError::RelationSourceMismatch {
            table: table_name.to_string(),
            column: column_name.to_string(),
            source_table: relation.source.table.clone(),
        });
    }

    let mut endpoint_types = Vec::with_capacity(2);
    for (endpoint, target) in [
        (Endpoint::Source, &relation.source),
        (Endpoint::Destination, &relation.destination),
    ] {
        let Some(target_table) = schema.get_table(&target.table) else {
            return Err(ValidationError::RelationTableNotFound {
                table: table_name.to_string(),
                column: column_name.to_string(),
                endpoint,
                target_table: target.table.clone(),
            });
        };
        let Some(field) = target_table.get_field(&target.column) else {
            return Err(ValidationError::RelationColumnNotFound {
                table: table_name.to_string(),
                column: column_name.to_string(),
                endpoint,
                target: target.clone(),
            });
        };
        let Field::Atom(atom) = field else {
            return Err(ValidationError::RelationEndpointNotAtom {
                table: table_name.to_string(),
                column: column_name.to_string(),
                endpoint,
                target: target.clone(),
                kind: field.kind().to_string(),
            });
        };
        endpoint_types.push(atom.sql_type.as_str());
    }

    if endpoint_types[0] != endpoint_types[1] {
        return Err(ValidationError::RelationTypeMismatch {
            table: table_name.to_string(),
            column: column_name.to_string(),
            source_column: relation.source.clone(),
            source_type: endpoint_types[0].to_string(),
            destination_column: relation.destination.clone(),
            destination_type: endpoint_types[1].to_string(),
        });
    }

    Ok(())
}

fn validate_alias(
    table: &Table,
    table_name: &str,
    column_name: &str,
    alias: &Alias,
) -> Result<(), ValidationError> {
    if table.column_exists(&alias.target) {
        Ok(())
    } else {
        Err(ValidationError::DanglingAlias {
            table: table_name.to_string(),
            column: column_name.to_string(),
            target: alias.target.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Cardinality;

    fn blog_schema() -> Schema {
        Schema::new()
            .table(
                "User",
                Table::new()
                    .column("id", Field::integer("PRIMARY KEY"))
                    .column("name", Field::text(""))
                    .column("username", Field::alias("name"))
                    .column("posts", Field::relation_many("User.id", "Post.authorId")),
            )
            .table(
                "Post",
                Table::new()
                    .column("id", Field::integer("PRIMARY KEY"))
                    .column("authorId", Field::integer("NOT NULL"))
                    .column("author", Field::relation_one("Post.authorId", "User.id")),
            )
    }

    fn with_post_column(name: &str, field: Field) -> Schema {
        let mut schema = blog_schema();
        schema
            .tables
            .get_mut("Post")
            .unwrap()
            .columns
            .insert(name.to_string(), field.into());
        schema
    }

    #[test]
    fn test_valid_schema() {
        assert_eq!(validate(&blog_schema()), Ok(()));
    }

    #[test]
    fn test_invalid_identifier() {
        let schema = Schema::new().table("user-accounts", Table::new());
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::InvalidIdentifier { name }) if name == "user-accounts"
        ));

        let schema = with_post_column("title2", Field::text(""));
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::InvalidIdentifier { name }) if name == "title2"
        ));
    }

    #[test]
    fn test_relation_source_must_be_owning_table() {
        let schema = with_post_column("writer", Field::relation_one("User.id", "User.id"));
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::RelationSourceMismatch { source_table, .. }) if source_table == "User"
        ));
    }

    #[test]
    fn test_relation_destination_table_missing() {
        let schema = with_post_column("tags", Field::relation_many("Post.id", "Tag.postId"));
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::RelationTableNotFound {
                endpoint: Endpoint::Destination,
                target_table,
                ..
            }) if target_table == "Tag"
        ));
    }

    #[test]
    fn test_relation_column_missing() {
        let schema = with_post_column("editor", Field::relation_one("Post.editorId", "User.id"));
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::RelationColumnNotFound {
                endpoint: Endpoint::Source,
                ..
            })
        ));
    }

    #[test]
    fn test_relation_endpoint_must_be_atom() {
        let schema = with_post_column("authorPosts", Field::relation_many("Post.author", "User.id"));
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::RelationEndpointNotAtom { kind, .. }) if kind == "relation"
        ));
    }

    #[test]
    fn test_relation_types_must_match() {
        let mut schema = with_post_column("title", Field::text(""));
        schema.tables.get_mut("Post").unwrap().columns.insert(
            "titled".to_string(),
            Field::Relation(Relation::new(Cardinality::One, "Post.title", "User.id")).into(),
        );
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::RelationTypeMismatch { source_type, destination_type, .. })
                if source_type == "TEXT" && destination_type == "INTEGER"
        ));
    }

    #[test]
    fn test_alias_must_resolve() {
        let schema = with_post_column("body", Field::alias("text"));
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::DanglingAlias { target, .. }) if target == "text"
        ));
    }

    #[test]
    fn test_open_ended_definitions_are_not_checked() {
        let schema = with_post_column("idx_author", Field::index("this is not sql"));
        assert_eq!(validate(&schema), Ok(()));
    }
}
