//! Structural equality over the schema model
//!
//! Two schemas are structurally equal when they hold the same tables with the
//! same columns and identical fields. Declaration order and rename markers are
//! not part of the structure.

use super::model::{Schema, Table};

/// Whether `left` and `right` describe the same structure
pub fn structurally_equal(left: &Schema, right: &Schema) -> bool {
    first_divergence(left, right).is_none()
}

/// Describe the first structural difference between `left` and `right`
///
/// Tables are visited in `right`'s order, then tables only present in `left`.
pub fn first_divergence(left: &Schema, right: &Schema) -> Option<String> {
    for (name, right_table) in &right.tables {
        let Some(left_table) = left.tables.get(name) else {
            return Some(format!("table {name} is missing"));
        };
        if let Some(detail) = table_divergence(name, left_table, right_table) {
            return Some(detail);
        }
    }

    left.tables
        .keys()
        .find(|name| !right.tables.contains_key(*name))
        .map(|name| format!("table {name} is unexpected"))
}

fn table_divergence(table: &str, left: &Table, right: &Table) -> Option<String> {
    for (name, right_column) in &right.columns {
        match left.columns.get(name) {
            None => return Some(format!("column {table}.{name} is missing")),
            Some(left_column) if left_column.field != right_column.field => {
                return Some(format!(
                    "column {table}.{name} is {:?}, expected {:?}",
                    left_column.field, right_column.field
                ));
            }
            Some(_) => {}
        }
    }

    left.columns
        .keys()
        .find(|name| !right.columns.contains_key(*name))
        .map(|name| format!("column {table}.{name} is unexpected"))
}
