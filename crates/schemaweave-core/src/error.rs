//! Error types
//!
//! Every failure is fail-fast: the first violation aborts the whole
//! validation, migration, build or translation and is returned as one of the
//! enums below. Each variant carries a stable diagnostic code and a help line.

use miette::Diagnostic;
use thiserror::Error;

use crate::schema::ColumnRef;

/// Which side of a relation a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Destination,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Source => write!(f, "source"),
            Endpoint::Destination => write!(f, "referenced"),
        }
    }
}

/// Structural or referential problem in a schema definition
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("invalid name \"{name}\"")]
    #[diagnostic(
        code(schemaweave::validation::invalid_identifier),
        help("table and column names may only contain ASCII letters and underscores")
    )]
    InvalidIdentifier { name: String },

    #[error("in relation {table}.{column}, source table {source_table} does not match current table {table}")]
    #[diagnostic(
        code(schemaweave::validation::relation_source_mismatch),
        help("a relation's source must be a column of the table that declares it")
    )]
    RelationSourceMismatch {
        table: String,
        column: String,
        source_table: String,
    },

    #[error("in relation {table}.{column}, {endpoint} table {target_table} was not found")]
    #[diagnostic(code(schemaweave::validation::relation_table_not_found))]
    RelationTableNotFound {
        table: String,
        column: String,
        endpoint: Endpoint,
        target_table: String,
    },

    #[error("in relation {table}.{column}, {endpoint} column {target} was not found")]
    #[diagnostic(code(schemaweave::validation::relation_column_not_found))]
    RelationColumnNotFound {
        table: String,
        column: String,
        endpoint: Endpoint,
        target: ColumnRef,
    },

    #[error("in relation {table}.{column}, {endpoint} column {target} must be an atom, found {kind}")]
    #[diagnostic(
        code(schemaweave::validation::relation_endpoint_not_atom),
        help("point the relation at the concrete column instead of a virtual one")
    )]
    RelationEndpointNotAtom {
        table: String,
        column: String,
        endpoint: Endpoint,
        target: ColumnRef,
        kind: String,
    },

    #[error("in relation {table}.{column}, source column {source_column} ({source_type}) and referenced column {destination_column} ({destination_type}) must have the same type")]
    #[diagnostic(code(schemaweave::validation::relation_type_mismatch))]
    RelationTypeMismatch {
        table: String,
        column: String,
        source_column: ColumnRef,
        source_type: String,
        destination_column: ColumnRef,
        destination_type: String,
    },

    #[error("alias {table}.{column} refers to non-existent column {target}")]
    #[diagnostic(code(schemaweave::validation::dangling_alias))]
    DanglingAlias {
        table: String,
        column: String,
        target: String,
    },
}

/// Why a rename marker could not be honoured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameProblem {
    /// The old name does not exist in the previous schema
    SourceMissing,
    /// The old name is still present in the next schema
    SourceStillPresent,
    /// Another entity already claimed the same old name
    SourceAlreadyConsumed,
}

impl std::fmt::Display for RenameProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenameProblem::SourceMissing => write!(f, "the source does not exist"),
            RenameProblem::SourceStillPresent => write!(f, "the source still exists"),
            RenameProblem::SourceAlreadyConsumed => {
                write!(f, "the source was already renamed to something else")
            }
        }
    }
}

/// Failure to synthesize a migration between two schemas
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum MigrationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("{name} is renamed from {from}, but {problem}")]
    #[diagnostic(
        code(schemaweave::migration::invalid_rename),
        help("if the rename has already been applied, remove the rename marker from the schema definition")
    )]
    InvalidRename {
        name: String,
        from: String,
        problem: RenameProblem,
    },

    #[error("{name} must be renamed to \"deprecated_{name}\" before it can be dropped")]
    #[diagnostic(
        code(schemaweave::migration::unsafe_drop),
        help("rename the entity to a deprecated name in one migration, then remove it in the next")
    )]
    UnsafeDrop { name: String },

    #[error("unable to create migration: migrated schema diverges from target ({detail})")]
    #[diagnostic(
        code(schemaweave::migration::divergent_result),
        help("discard the generated DDL; the edit is unsupported or the engine is wrong")
    )]
    DivergentResult { detail: String, notes: Vec<String> },
}

/// Failure to build a query against a schema
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum QueryError {
    #[error("table {table} not found in schema")]
    #[diagnostic(code(schemaweave::query::unknown_table))]
    UnknownTable { table: String },

    #[error("column {table}.{column} not found")]
    #[diagnostic(code(schemaweave::query::unknown_column))]
    UnknownColumn { table: String, column: String },

    #[error("{table}.{column} is a {kind}, not a column")]
    #[diagnostic(
        code(schemaweave::query::not_a_column),
        help("relations are traversed with `Handle::relation`")
    )]
    NotAColumn {
        table: String,
        column: String,
        kind: String,
    },

    #[error("{table}.{column} is a {kind}, not a relation")]
    #[diagnostic(code(schemaweave::query::not_a_relation))]
    NotARelation {
        table: String,
        column: String,
        kind: String,
    },

    #[error("alias {table}.{column} never resolves to a column")]
    #[diagnostic(code(schemaweave::query::alias_cycle))]
    AliasCycle { table: String, column: String },
}

/// Failure to read a schema out of SQL DDL
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum TranslateError {
    #[error("parse error: {0}")]
    #[diagnostic(code(schemaweave::translate::parse))]
    Parse(String),

    #[error("column {table}.{column} has no data type")]
    #[diagnostic(code(schemaweave::translate::unsupported_column))]
    UnsupportedColumn { table: String, column: String },
}

/// Failure to load configuration
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read configuration file")]
    #[diagnostic(code(schemaweave::config::io))]
    Io(#[from] std::io::Error),

    #[error("invalid configuration")]
    #[diagnostic(code(schemaweave::config::parse))]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsafe_drop_message_suggests_deprecated_name() {
        let err = MigrationError::UnsafeDrop {
            name: "Foo".to_string(),
        };
        assert!(err.to_string().contains("deprecated_Foo"));
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let err: MigrationError = ValidationError::InvalidIdentifier {
            name: "bad-name".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "invalid name \"bad-name\"");
    }
}
