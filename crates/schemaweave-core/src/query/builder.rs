//! Query builder - projections over a schema

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::QueryConfig;
use crate::error::QueryError;
use crate::schema::{Cardinality, Field, Schema, Table};

use super::ast::{Leaf, Projection, QueryNode, RelationNode};
use super::expr::Expr;

/// Hands out correlation aliases, never repeating one
#[derive(Debug)]
pub struct AliasAllocator {
    prefix: String,
    counter: AtomicU64,
}

impl AliasAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    pub fn allocate(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }
}

impl Default for AliasAllocator {
    fn default() -> Self {
        Self::new(QueryConfig::default().alias_prefix)
    }
}

/// Builds query ASTs against one schema
///
/// Every table instance gets a fresh alias from the builder's allocator, so
/// all queries built by the same builder use distinct aliases.
#[derive(Debug)]
pub struct QueryBuilder<'s> {
    schema: &'s Schema,
    aliases: AliasAllocator,
}

impl<'s> QueryBuilder<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            aliases: AliasAllocator::default(),
        }
    }

    pub fn with_config(schema: &'s Schema, config: &QueryConfig) -> Self {
        Self {
            schema,
            aliases: AliasAllocator::new(config.alias_prefix.clone()),
        }
    }

    /// Build a projection rooted at `table`
    pub fn build<'b, F>(&'b self, table: &str, project: F) -> Result<RelationNode, QueryError>
    where
        F: FnOnce(&Handle<'b>) -> Result<Projection, QueryError>,
    {
        build_relation(self.schema, &self.aliases, table, project)
    }
}

fn build_relation<'a, F>(
    schema: &'a Schema,
    aliases: &'a AliasAllocator,
    table_name: &str,
    project: F,
) -> Result<RelationNode, QueryError>
where
    F: FnOnce(&Handle<'a>) -> Result<Projection, QueryError>,
{
    let Some((name, table)) = schema.tables.get_key_value(table_name) else {
        return Err(QueryError::UnknownTable {
            table: table_name.to_string(),
        });
    };

    let alias = aliases.allocate();
    tracing::trace!(table = %name, %alias, "allocated correlation alias");

    let handle = Handle {
        schema,
        aliases,
        table_name: name,
        table,
        alias,
    };
    let projection = project(&handle)?;

    Ok(RelationNode {
        alias: handle.alias,
        table: name.clone(),
        fields: projection.fields,
        filters: projection.filters,
        limit: projection.limit,
        order_by: projection.order_by,
        group_by: projection.group_by,
    })
}

/// One table instance inside a projection callback
///
/// Columns are reached with [`Handle::column`], relations are traversed with
/// [`Handle::relation`]. Aliases resolve to the column they forward to.
pub struct Handle<'a> {
    schema: &'a Schema,
    aliases: &'a AliasAllocator,
    table_name: &'a str,
    table: &'a Table,
    alias: String,
}

impl<'a> Handle<'a> {
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn table_name(&self) -> &str {
        self.table_name
    }

    /// Names of every column this handle offers
    pub fn columns(&self) -> impl Iterator<Item = &'a str> {
        let table: &'a Table = self.table;
        table.columns.keys().map(String::as_str)
    }

    /// Follow alias chains to the field they end at
    fn resolve(&self, name: &str) -> Result<(&'a str, &'a Field), QueryError> {
        let table: &'a Table = self.table;
        let mut current = name;

        // a chain longer than the table has columns must loop
        for _ in 0..=table.columns.len() {
            let Some((key, column)) = table.columns.get_key_value(current) else {
                return Err(QueryError::UnknownColumn {
                    table: self.table_name.to_string(),
                    column: current.to_string(),
                });
            };
            match &column.field {
                Field::Alias(alias) => current = &alias.target,
                field => return Ok((key.as_str(), field)),
            }
        }

        Err(QueryError::AliasCycle {
            table: self.table_name.to_string(),
            column: name.to_string(),
        })
    }

    /// Reference an atom column
    pub fn column(&self, name: &str) -> Result<Leaf, QueryError> {
        let (resolved, field) = self.resolve(name)?;
        match field {
            Field::Atom(_) => Ok(Leaf::new(&self.alias, resolved)),
            Field::Relation(_) | Field::Alias(_) | Field::Index(_) | Field::Constraint(_) => {
                Err(QueryError::NotAColumn {
                    table: self.table_name.to_string(),
                    column: name.to_string(),
                    kind: field.kind().to_string(),
                })
            }
        }
    }

    /// Traverse a relation, projecting the related table with `project`
    ///
    /// The related rows are correlated to this table instance by a join
    /// filter that precedes any filter `project` adds. A `one` relation is
    /// wrapped so it compiles to a single object.
    pub fn relation<F>(&self, name: &str, project: F) -> Result<QueryNode, QueryError>
    where
        F: FnOnce(&Handle<'a>) -> Result<Projection, QueryError>,
    {
        let (_, field) = self.resolve(name)?;
        let Field::Relation(relation) = field else {
            return Err(QueryError::NotARelation {
                table: self.table_name.to_string(),
                column: name.to_string(),
                kind: field.kind().to_string(),
            });
        };

        let source = self.column(&relation.source.column)?;
        if self.schema.get_field(&relation.destination).is_none() {
            return Err(QueryError::UnknownColumn {
                table: relation.destination.table.clone(),
                column: relation.destination.column.clone(),
            });
        }

        let mut node = build_relation(
            self.schema,
            self.aliases,
            &relation.destination.table,
            project,
        )?;
        let destination = Leaf::new(&node.alias, &relation.destination.column);
        node.filters.insert(0, Expr::equals(source, destination));

        Ok(match relation.cardinality {
            Cardinality::One => node.singular(),
            Cardinality::Many => node.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new()
            .table(
                "User",
                Table::new()
                    .column("id", Field::integer("PRIMARY KEY"))
                    .column("name", Field::text(""))
                    .column("username", Field::alias("handle"))
                    .column("handle", Field::alias("name"))
                    .column("loop_a", Field::alias("loop_b"))
                    .column("loop_b", Field::alias("loop_a"))
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

    #[test]
    fn test_unknown_table() {
        let schema = schema();
        let builder = QueryBuilder::new(&schema);
        let err = builder.build("Comment", |_| Ok(Projection::new())).unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownTable {
                table: "Comment".to_string()
            }
        );
    }

    #[test]
    fn test_aliases_are_never_reused() {
        let schema = schema();
        let builder = QueryBuilder::new(&schema);
        let first = builder.build("User", |_| Ok(Projection::new())).unwrap();
        let second = builder.build("User", |_| Ok(Projection::new())).unwrap();
        assert_eq!(first.alias, "X1");
        assert_eq!(second.alias, "X2");
    }

    #[test]
    fn test_alias_chain_resolves_to_atom() {
        let schema = schema();
        let builder = QueryBuilder::new(&schema);
        let node = builder
            .build("User", |u| Ok(Projection::new().field("who", u.column("username")?)))
            .unwrap();
        assert_eq!(node.fields["who"], QueryNode::Leaf(Leaf::new("X1", "name")));
    }

    #[test]
    fn test_alias_cycle() {
        let schema = schema();
        let builder = QueryBuilder::new(&schema);
        let err = builder
            .build("User", |u| Ok(Projection::new().field("x", u.column("loop_a")?)))
            .unwrap_err();
        assert!(matches!(err, QueryError::AliasCycle { column, .. } if column == "loop_a"));
    }

    #[test]
    fn test_relation_injects_join_filter_first() {
        let schema = schema();
        let builder = QueryBuilder::new(&schema);
        let node = builder
            .build("User", |u| {
                Ok(Projection::new().field(
                    "posts",
                    u.relation("posts", |p| {
                        Ok(Projection::new()
                            .filter(Expr::new().column(&p.column("id")?).sql(" > ").value(10))
                            .field("id", p.column("id")?))
                    })?,
                ))
            })
            .unwrap();

        let QueryNode::Relation(posts) = &node.fields["posts"] else {
            panic!("many relation should not be singular");
        };
        assert_eq!(posts.table, "Post");
        let filters: Vec<String> = posts.filters.iter().map(|f| f.to_string()).collect();
        assert_eq!(filters, vec!["X1.id = X2.authorId", "X2.id > 10"]);
    }

    #[test]
    fn test_one_relation_is_singular() {
        let schema = schema();
        let builder = QueryBuilder::new(&schema);
        let node = builder
            .build("Post", |p| {
                Ok(Projection::new().field(
                    "author",
                    p.relation("author", |a| Ok(Projection::new().field("name", a.column("name")?)))?,
                ))
            })
            .unwrap();
        assert!(matches!(node.fields["author"], QueryNode::Singular(_)));
    }

    #[test]
    fn test_wrong_accessor() {
        let schema = schema();
        let builder = QueryBuilder::new(&schema);

        let err = builder
            .build("User", |u| Ok(Projection::new().field("p", u.column("posts")?)))
            .unwrap_err();
        assert!(matches!(err, QueryError::NotAColumn { kind, .. } if kind == "relation"));

        let err = builder
            .build("User", |u| {
                Ok(Projection::new().field("n", u.relation("name", |_| Ok(Projection::new()))?))
            })
            .unwrap_err();
        assert!(matches!(err, QueryError::NotARelation { kind, .. } if kind == "atom"));

        let err = builder
            .build("User", |u| Ok(Projection::new().field("e", u.column("email")?)))
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownColumn { column, .. } if column == "email"));
    }

    #[test]
    fn test_handle_lists_declared_columns() {
        let schema = schema();
        let builder = QueryBuilder::new(&schema);
        builder
            .build("Post", |p| {
                assert_eq!(p.table_name(), "Post");
                assert_eq!(p.alias(), "X1");
                assert_eq!(p.columns().collect::<Vec<_>>(), vec!["id", "authorId", "author"]);
                Ok(Projection::new())
            })
            .unwrap();
    }

    #[test]
    fn test_custom_alias_prefix() {
        let schema = schema();
        let config = QueryConfig {
            alias_prefix: "t".to_string(),
        };
        let builder = QueryBuilder::with_config(&schema, &config);
        let node = builder.build("User", |_| Ok(Projection::new())).unwrap();
        assert_eq!(node.alias, "t1");
    }
}
