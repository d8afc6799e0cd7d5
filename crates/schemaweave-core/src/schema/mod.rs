//! Schema management module

mod builder;
mod equality;
mod model;
mod validate;

pub use builder::{SchemaSource, SqlSchemaBuilder};
pub use equality::{first_divergence, structurally_equal};
pub use model::{
    Alias, Atom, Cardinality, Column, ColumnRef, Constraint, Field, FieldKind, Index, Relation,
    Schema, Table, RESERVED_PREFIX,
};
pub use validate::validate;
