//! Host value types for Atom columns

use serde::{Deserialize, Serialize};

/// The type a column's values take once decoded by the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Buffer,
    Boolean,
    Json,
    #[default]
    Unknown,
}

impl ValueType {
    /// Classify a SQL type name using SQLite's column affinity rules
    ///
    /// The rules are applied in order: `INT` gives an integer, `CHAR`, `CLOB`
    /// or `TEXT` give text, `BLOB` (or no type at all) gives a buffer, and
    /// `REAL`, `FLOA` or `DOUB` give a real. Anything else has numeric
    /// affinity. Booleans and JSON are recognised by name first since SQLite
    /// stores them as integers and text respectively.
    pub fn from_sql_type(sql_type: &str) -> Self {
        let upper = sql_type.trim().to_ascii_uppercase();

        if upper == "BOOLEAN" || upper == "BOOL" {
            return ValueType::Boolean;
        }
        if upper == "JSON" || upper == "JSONB" {
            return ValueType::Json;
        }

        if upper.contains("INT") {
            ValueType::Number
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            ValueType::String
        } else if upper.is_empty() || upper.contains("BLOB") {
            ValueType::Buffer
        } else {
            // REAL, FLOAT, DOUBLE and the NUMERIC catch-all
            ValueType::Number
        }
    }

    /// Get a human-readable name for this type
    pub fn display_name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Buffer => "buffer",
            ValueType::Boolean => "boolean",
            ValueType::Json => "json",
            ValueType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
