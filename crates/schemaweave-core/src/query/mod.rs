//! Query construction and SQL compilation

mod ast;
mod builder;
mod compile;
mod expr;

pub use ast::{Leaf, Projection, QueryNode, RelationNode};
pub use builder::{AliasAllocator, Handle, QueryBuilder};
pub use compile::compile;
pub use expr::{Expr, ExprPart, SqlValue};
