//! Query AST

use indexmap::IndexMap;

use super::expr::Expr;

/// A column of a table instance, e.g. `X1.id`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Leaf {
    /// Correlation alias of the table instance
    pub alias: String,
    /// Underlying atom column, with aliases already resolved
    pub column: String,
}

impl Leaf {
    pub fn new(alias: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            column: column.into(),
        }
    }
}

impl std::fmt::Display for Leaf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.alias, self.column)
    }
}

/// A projection over one table instance
#[derive(Debug, Clone, PartialEq)]
pub struct RelationNode {
    pub alias: String,
    pub table: String,
    pub fields: IndexMap<String, QueryNode>,
    /// Conjoined in order
    pub filters: Vec<Expr>,
    pub limit: Option<u64>,
    pub order_by: Option<Expr>,
    pub group_by: Option<Expr>,
}

impl RelationNode {
    /// Expect at most one row
    pub fn singular(self) -> QueryNode {
        QueryNode::Singular(Box::new(self))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    Leaf(Leaf),
    Relation(RelationNode),
    /// A relation producing a single object instead of an array
    Singular(Box<RelationNode>),
    /// A computed value
    Expr(Expr),
}

impl From<Leaf> for QueryNode {
    fn from(leaf: Leaf) -> Self {
        QueryNode::Leaf(leaf)
    }
}

impl From<RelationNode> for QueryNode {
    fn from(node: RelationNode) -> Self {
        QueryNode::Relation(node)
    }
}

impl From<Expr> for QueryNode {
    fn from(expr: Expr) -> Self {
        QueryNode::Expr(expr)
    }
}

/// What a projection callback returns for one table instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub(crate) fields: IndexMap<String, QueryNode>,
    pub(crate) filters: Vec<Expr>,
    pub(crate) limit: Option<u64>,
    pub(crate) order_by: Option<Expr>,
    pub(crate) group_by: Option<Expr>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project `node` under `name`
    pub fn field(mut self, name: impl Into<String>, node: impl Into<QueryNode>) -> Self {
        self.fields.insert(name.into(), node.into());
        self
    }

    /// Restrict the rows; repeated filters are combined with `AND`
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filters.push(expr);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order_by(mut self, expr: Expr) -> Self {
        self.order_by = Some(expr);
        self
    }

    pub fn group_by(mut self, expr: Expr) -> Self {
        self.group_by = Some(expr);
        self
    }
}
