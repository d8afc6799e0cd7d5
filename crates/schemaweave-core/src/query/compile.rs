//! Query AST to SQL with JSON aggregation

use crate::schema::RESERVED_PREFIX;

use super::ast::{QueryNode, RelationNode};

/// How a relation's rows are shaped in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Plain result set, one row per match
    Table,
    /// Plain result set, at most one row
    OneTable,
    /// JSON array of objects
    Many,
    /// Single JSON object
    One,
}

impl Mode {
    fn singular(self) -> Self {
        match self {
            Mode::Table | Mode::OneTable => Mode::OneTable,
            Mode::Many | Mode::One => Mode::One,
        }
    }

    fn is_tabular(self) -> bool {
        matches!(self, Mode::Table | Mode::OneTable)
    }

    fn is_single(self) -> bool {
        matches!(self, Mode::OneTable | Mode::One)
    }
}

/// Compile a query tree to SQL
///
/// The root produces a plain result set. Nested relations become correlated
/// subqueries aggregated with `json_group_array` and `json_object`.
pub fn compile(node: &QueryNode) -> String {
    render(node, Mode::Table)
}

impl RelationNode {
    pub fn to_sql(&self) -> String {
        render_relation(self, Mode::Table)
    }
}

impl QueryNode {
    pub fn to_sql(&self) -> String {
        compile(self)
    }
}

fn render(node: &QueryNode, mode: Mode) -> String {
    match node {
        QueryNode::Leaf(leaf) => leaf.to_string(),
        QueryNode::Expr(expr) => expr.to_string(),
        QueryNode::Relation(relation) => render_relation(relation, mode),
        QueryNode::Singular(relation) => render_relation(relation, mode.singular()),
    }
}

/// Render a field nested inside a select list
fn render_nested(node: &QueryNode) -> String {
    let sql = render(node, Mode::Many);
    if sql.contains('\n') {
        format!("({})", indent(&sql).trim())
    } else {
        sql
    }
}

fn render_relation(node: &RelationNode, mode: Mode) -> String {
    let fields: Vec<(&str, String)> = node
        .fields
        .iter()
        .filter(|(name, _)| !name.starts_with(RESERVED_PREFIX))
        .map(|(name, field)| (name.as_str(), render_nested(field)))
        .collect();

    let mut sql = if mode.is_tabular() {
        let columns: Vec<String> = fields
            .iter()
            .map(|(name, value)| format!("\t{value} as {name}"))
            .collect();
        format!(
            "SELECT\n{}\nFROM {} {}\n",
            columns.join(",\n"),
            node.table,
            node.alias
        )
    } else {
        let pairs: Vec<String> = fields
            .iter()
            .map(|(name, value)| format!("\t'{name}', {value}"))
            .collect();
        let object = format!("json_object(\n{}\n)", pairs.join(",\n"));
        let projection = if mode.is_single() {
            object
        } else {
            format!("json_group_array({object})")
        };
        format!("SELECT {} FROM {} {}\n", projection, node.table, node.alias)
    };

    match node.filters.as_slice() {
        [] => {}
        [filter] => sql.push_str(&format!("WHERE {filter}\n")),
        filters => {
            let clauses: Vec<String> = filters.iter().map(|f| format!("({f})")).collect();
            sql.push_str(&format!("WHERE {}\n", clauses.join(" AND ")));
        }
    }
    if let Some(group_by) = &node.group_by {
        sql.push_str(&format!("GROUP BY {group_by}\n"));
    }
    if let Some(order_by) = &node.order_by {
        sql.push_str(&format!("ORDER BY {order_by}\n"));
    }

    let limit = node.limit.or(mode.is_single().then_some(1));
    if let Some(limit) = limit {
        sql.push_str(&format!("LIMIT {limit}\n"));
    }

    sql
}

fn indent(sql: &str) -> String {
    sql.split('\n')
        .map(|line| format!("\t{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
