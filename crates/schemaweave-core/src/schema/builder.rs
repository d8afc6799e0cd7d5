//! Schema builder - reads `CREATE TABLE` statements into a Schema

use sqlparser::ast::{CreateTable, DataType, ObjectName, Statement};
use sqlparser::parser::Parser;

use crate::dialect::SqlDialect;
use crate::error::TranslateError;
use crate::schema::{Field, Schema, Table};
use crate::types::ValueType;

/// Anything that can turn DDL text into a schema snapshot
///
/// Plain DDL cannot express relations, aliases or indexes, so a translated
/// schema holds atom columns only; callers add the virtual fields themselves.
pub trait SchemaSource {
    fn to_schema(&self, ddl: &str) -> Result<Schema, TranslateError>;
}

/// [`SchemaSource`] backed by sqlparser
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlSchemaBuilder {
    dialect: SqlDialect,
}

impl SqlSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    /// Convert one CREATE TABLE statement
    fn process_create_table(&self, create: &CreateTable) -> Result<(String, Table), TranslateError> {
        let table_name = object_name_to_table(&create.name);
        let mut table = Table::new();

        for column in &create.columns {
            let col_name = column.name.value.clone();
            if matches!(column.data_type, DataType::Unspecified) {
                return Err(TranslateError::UnsupportedColumn {
                    table: table_name,
                    column: col_name,
                });
            }

            let sql_type = column.data_type.to_string();
            let value_type = ValueType::from_sql_type(&sql_type);
            let constraints = column
                .options
                .iter()
                .map(|option| option.to_string())
                .collect::<Vec<_>>()
                .join(" ");

            table = table.column(col_name, Field::atom(sql_type, value_type, constraints));
        }

        if !create.constraints.is_empty() {
            tracing::debug!(
                table = %table_name,
                count = create.constraints.len(),
                "table constraints are not carried into the schema"
            );
        }

        Ok((table_name, table))
    }
}

impl SchemaSource for SqlSchemaBuilder {
    fn to_schema(&self, ddl: &str) -> Result<Schema, TranslateError> {
        let dialect = self.dialect.parser_dialect();
        let statements = Parser::parse_sql(dialect.as_ref(), ddl)
            .map_err(|e| TranslateError::Parse(e.to_string()))?;

        let mut schema = Schema::new();
        for stmt in &statements {
            match stmt {
                Statement::CreateTable(create) => {
                    let (name, table) = self.process_create_table(create)?;
                    schema.tables.insert(name, table);
                }
                other => {
                    tracing::debug!(statement = %other, "skipping non CREATE TABLE statement");
                }
            }
        }
        Ok(schema)
    }
}

/// Last segment of a possibly qualified name
fn object_name_to_table(name: &ObjectName) -> String {
    match name.0.last() {
        Some(ident) => ident.value.clone(),
        None => name.to_string(),
    }
}
