//! schemaweave-core: declarative schema tooling for relational databases
//!
//! This library compares two versions of a declarative schema and synthesizes
//! the DDL needed to move from one to the other, and compiles nested,
//! relation-aware projections into a single SQL statement built on JSON
//! aggregation.

pub mod config;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod query;
pub mod schema;
pub mod types;

pub use config::{Config, MigrationConfig, QueryConfig};
pub use dialect::SqlDialect;
pub use diff::{diff_keys, migrate, KeyDiff, Migration, Migrator};
pub use error::{ConfigError, MigrationError, QueryError, TranslateError, ValidationError};
pub use query::{compile, Expr, Handle, Leaf, Projection, QueryBuilder, QueryNode, RelationNode};
pub use schema::{
    validate, Alias, Atom, Cardinality, Column, ColumnRef, Constraint, Field, FieldKind, Index,
    Relation, Schema, SchemaSource, SqlSchemaBuilder, Table,
};
pub use types::ValueType;
