//! SQL expressions over column references

use super::ast::Leaf;

/// Literal value embedded in an expression
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(n) => write!(f, "{n}"),
            SqlValue::Real(n) => write!(f, "{n}"),
            SqlValue::Boolean(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Integer(n)
    }
}

impl From<i32> for SqlValue {
    fn from(n: i32) -> Self {
        SqlValue::Integer(n.into())
    }
}

impl From<f64> for SqlValue {
    fn from(n: f64) -> Self {
        SqlValue::Real(n)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Boolean(b)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprPart {
    /// Raw SQL text, emitted verbatim
    Sql(String),
    Column(Leaf),
    Value(SqlValue),
}

impl From<Leaf> for ExprPart {
    fn from(leaf: Leaf) -> Self {
        ExprPart::Column(leaf)
    }
}

impl From<&Leaf> for ExprPart {
    fn from(leaf: &Leaf) -> Self {
        ExprPart::Column(leaf.clone())
    }
}

impl From<SqlValue> for ExprPart {
    fn from(value: SqlValue) -> Self {
        ExprPart::Value(value)
    }
}

/// A SQL expression assembled from text, columns and literals
///
/// ```
/// use schemaweave_core::query::{Expr, Leaf};
///
/// let id = Leaf::new("X1", "id");
/// let expr = Expr::new().column(&id).sql(" < ").value(4);
/// assert_eq!(expr.to_string(), "X1.id < 4");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expr {
    parts: Vec<ExprPart>,
}

impl Expr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expression made of a single raw SQL fragment
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new().sql(sql)
    }

    pub fn sql(mut self, sql: impl Into<String>) -> Self {
        self.parts.push(ExprPart::Sql(sql.into()));
        self
    }

    pub fn column(mut self, leaf: &Leaf) -> Self {
        self.parts.push(ExprPart::Column(leaf.clone()));
        self
    }

    pub fn value(mut self, value: impl Into<SqlValue>) -> Self {
        self.parts.push(ExprPart::Value(value.into()));
        self
    }

    /// `left <op> right`
    pub fn binary(left: impl Into<ExprPart>, op: &str, right: impl Into<ExprPart>) -> Self {
        Self {
            parts: vec![
                left.into(),
                ExprPart::Sql(format!(" {op} ")),
                right.into(),
            ],
        }
    }

    /// `left = right`
    pub fn equals(left: impl Into<ExprPart>, right: impl Into<ExprPart>) -> Self {
        Self::binary(left, "=", right)
    }

    pub fn parts(&self) -> &[ExprPart] {
        &self.parts
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for part in &self.parts {
            match part {
                ExprPart::Sql(sql) => f.write_str(sql)?,
                ExprPart::Column(leaf) => write!(f, "{leaf}")?,
                ExprPart::Value(value) => write!(f, "{value}")?,
            }
        }
        Ok(())
    }
}
