//! DDL statement text

use crate::schema::{Atom, Field, Index, Table};

/// Generated name of the index declared by `table.column`
pub fn index_name(table: &str, column: &str) -> String {
    format!("{table}_{column}")
}

/// Wrap a bare column list in parentheses
fn index_columns(definition: &str) -> String {
    if definition.contains('(') {
        definition.to_string()
    } else {
        format!("({definition})")
    }
}

fn column_definition(name: &str, atom: &Atom) -> String {
    format!("{name} {} {}", atom.sql_type, atom.constraints)
        .trim_end()
        .to_string()
}

/// `CREATE TABLE` followed by one `CREATE INDEX` per index field
pub fn create_table(name: &str, table: &Table) -> Vec<String> {
    let mut parts = Vec::new();
    for (col_name, column) in &table.columns {
        if let Field::Atom(atom) = &column.field {
            parts.push(column_definition(col_name, atom));
        }
    }
    for (col_name, column) in &table.columns {
        if let Field::Constraint(constraint) = &column.field {
            parts.push(format!("CONSTRAINT {col_name} {}", constraint.definition));
        }
    }

    let mut statements = vec![format!(
        "CREATE TABLE {name} (\n\t{}\n);",
        parts.join(",\n\t")
    )];
    for (col_name, column) in &table.columns {
        if let Field::Index(index) = &column.field {
            statements.push(create_index(name, col_name, index));
        }
    }
    statements
}

pub fn rename_table(from: &str, to: &str) -> String {
    format!("ALTER TABLE {from} RENAME TO {to};")
}

pub fn drop_table(name: &str) -> String {
    format!("DROP TABLE {name};")
}

pub fn add_column(table: &str, name: &str, atom: &Atom) -> String {
    format!("ALTER TABLE {table} ADD COLUMN {};", column_definition(name, atom))
}

pub fn rename_column(table: &str, from: &str, to: &str) -> String {
    format!("ALTER TABLE {table} RENAME COLUMN {from} TO {to};")
}

pub fn drop_column(table: &str, name: &str) -> String {
    format!("ALTER TABLE {table} DROP COLUMN {name};")
}

pub fn create_index(table: &str, column: &str, index: &Index) -> String {
    format!(
        "CREATE INDEX {} ON {table} {};",
        index_name(table, column),
        index_columns(&index.definition)
    )
}

pub fn drop_index(table: &str, column: &str) -> String {
    format!("DROP INDEX {};", index_name(table, column))
}
