//! Schema model - tables, columns and field kinds

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::ValueType;

/// Prefix reserved for internal bookkeeping entries
pub const RESERVED_PREFIX: &str = "__";

/// Declarative schema: table name -> table, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    pub tables: IndexMap<String, Table>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any previous table of the same name
    pub fn table(mut self, name: impl Into<String>, table: Table) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    /// Look up a table by name
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Look up the field behind a `Table.column` reference
    pub fn get_field(&self, reference: &ColumnRef) -> Option<&Field> {
        self.tables
            .get(&reference.table)
            .and_then(|t| t.get_field(&reference.column))
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Get all table names
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }

    /// Copy of this schema with every rename marker removed
    pub fn canonical(&self) -> Schema {
        Schema {
            tables: self
                .tables
                .iter()
                .map(|(name, table)| (name.clone(), table.canonical()))
                .collect(),
        }
    }

    /// Whether any table or column still carries a rename marker
    pub fn is_canonical(&self) -> bool {
        self.tables.values().all(|t| {
            t.renamed_from.is_none() && t.columns.values().all(|c| c.renamed_from.is_none())
        })
    }

    /// Serialize for persistence between migration runs
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a persisted schema
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Table definition: column name -> column, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub columns: IndexMap<String, Column>,
    /// Previous name of this table, only set while a rename is pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column
    pub fn column(mut self, name: impl Into<String>, column: impl Into<Column>) -> Self {
        self.columns.insert(name.into(), column.into());
        self
    }

    /// Mark this table as the new name of `old_name`
    pub fn renamed_from(mut self, old_name: impl Into<String>) -> Self {
        self.renamed_from = Some(old_name.into());
        self
    }

    /// Get a column's field by name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.columns.get(name).map(|c| &c.field)
    }

    /// Check if a column exists
    pub fn column_exists(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get all column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|s| s.as_str()).collect()
    }

    /// Copy of this table with its own and its columns' rename markers removed
    pub fn canonical(&self) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.canonical()))
                .collect(),
            renamed_from: None,
        }
    }
}

/// A named slot in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(flatten)]
    pub field: Field,
    /// Previous name of this column, only set while a rename is pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<String>,
}

impl Column {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            renamed_from: None,
        }
    }

    /// A column that replaces `old_name`
    pub fn renamed(old_name: impl Into<String>, field: Field) -> Self {
        Self {
            field,
            renamed_from: Some(old_name.into()),
        }
    }

    pub fn canonical(&self) -> Column {
        Column::new(self.field.clone())
    }
}

impl From<Field> for Column {
    fn from(field: Field) -> Self {
        Column::new(field)
    }
}

/// Discriminant of [`Field`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Atom,
    Relation,
    Alias,
    Index,
    Constraint,
}

impl FieldKind {
    /// Virtual kinds never produce DDL
    pub fn is_virtual(&self) -> bool {
        matches!(self, FieldKind::Relation | FieldKind::Alias)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::Atom => "atom",
            FieldKind::Relation => "relation",
            FieldKind::Alias => "alias",
            FieldKind::Index => "index",
            FieldKind::Constraint => "constraint",
        };
        f.write_str(name)
    }
}

/// Column kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Field {
    Atom(Atom),
    Relation(Relation),
    Alias(Alias),
    Index(Index),
    Constraint(Constraint),
}

impl Field {
    pub fn atom(
        sql_type: impl Into<String>,
        value_type: ValueType,
        constraints: impl Into<String>,
    ) -> Self {
        Field::Atom(Atom {
            sql_type: sql_type.into(),
            value_type,
            constraints: constraints.into(),
        })
    }

    pub fn integer(constraints: impl Into<String>) -> Self {
        Self::atom("INTEGER", ValueType::Number, constraints)
    }

    pub fn real(constraints: impl Into<String>) -> Self {
        Self::atom("REAL", ValueType::Number, constraints)
    }

    pub fn text(constraints: impl Into<String>) -> Self {
        Self::atom("TEXT", ValueType::String, constraints)
    }

    pub fn blob(constraints: impl Into<String>) -> Self {
        Self::atom("BLOB", ValueType::Buffer, constraints)
    }

    pub fn relation_one(source: &str, destination: &str) -> Self {
        Field::Relation(Relation::new(Cardinality::One, source, destination))
    }

    pub fn relation_many(source: &str, destination: &str) -> Self {
        Field::Relation(Relation::new(Cardinality::Many, source, destination))
    }

    pub fn alias(target: impl Into<String>) -> Self {
        Field::Alias(Alias {
            target: target.into(),
        })
    }

    pub fn index(definition: impl Into<String>) -> Self {
        Field::Index(Index {
            definition: definition.into(),
        })
    }

    pub fn constraint(definition: impl Into<String>) -> Self {
        Field::Constraint(Constraint {
            definition: definition.into(),
        })
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Atom(_) => FieldKind::Atom,
            Field::Relation(_) => FieldKind::Relation,
            Field::Alias(_) => FieldKind::Alias,
            Field::Index(_) => FieldKind::Index,
            Field::Constraint(_) => FieldKind::Constraint,
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.kind().is_virtual()
    }
}

/// A concrete scalar column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Atom {
    pub sql_type: String,
    pub value_type: ValueType,
    /// Raw SQL fragment such as `NOT NULL` or `PRIMARY KEY`
    #[serde(default)]
    pub constraints: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

/// A virtual join between two atom columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub cardinality: Cardinality,
    pub source: ColumnRef,
    pub destination: ColumnRef,
}

impl Relation {
    pub fn new(cardinality: Cardinality, source: &str, destination: &str) -> Self {
        Self {
            cardinality,
            source: ColumnRef::parse(source),
            destination: ColumnRef::parse(destination),
        }
    }
}

/// A virtual column forwarding to another column of the same table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub target: String,
}

/// A secondary index; the definition is either a bare column list or a
/// parenthesized one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub definition: String,
}

/// A table-level constraint, emitted inside `CREATE TABLE`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub definition: String,
}

/// `Table.column` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Parse from a dotted name like "Post.authorId"
    ///
    /// A reference without a dot keeps the whole text as the table name and an
    /// empty column, which validation then reports as a missing column.
    pub fn parse(s: &str) -> Self {
        match s.split_once('.') {
            Some((table, column)) => Self::new(table, column),
            None => Self::new(s, ""),
        }
    }
}

impl From<String> for ColumnRef {
    fn from(s: String) -> Self {
        ColumnRef::parse(&s)
    }
}

impl From<ColumnRef> for String {
    fn from(r: ColumnRef) -> Self {
        r.to_string()
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}
