//! Migration engine - turns a pair of schemas into DDL
//!
//! The engine keeps a mirror of the previous schema and updates it after
//! every emitted statement to match what the statement would do to a real
//! database. Once the traversal is done the mirror must be structurally equal
//! to the target schema, otherwise the migration is rejected.

use crate::config::MigrationConfig;
use crate::error::MigrationError;
use crate::schema::{first_divergence, validate, Column, Field, Schema, Table};

use super::apply::{apply_changes, ChangeDriver};
use super::ddl;

/// Result of a successful migration run
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    /// Semicolon-terminated statements in emission order
    pub statements: Vec<String>,
    /// The target schema without rename markers, to persist as the next baseline
    pub schema: Schema,
}

impl Migration {
    /// All statements as one SQL text
    pub fn sql(&self) -> String {
        let mut sql = self.statements.join("\n");
        if !sql.is_empty() {
            sql.push('\n');
        }
        sql
    }

    /// Whether the migration does nothing
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl std::fmt::Display for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql())
    }
}

/// Migration engine
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    config: MigrationConfig,
}

impl Migrator {
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    /// Compute the DDL that turns `prev` into `next`
    pub fn migrate(&self, prev: &Schema, next: &Schema) -> Result<Migration, MigrationError> {
        validate(prev)?;
        validate(next)?;

        let mut state = MigrationState {
            mirror: prev.canonical(),
            statements: Vec::new(),
            notes: Vec::new(),
            config: &self.config,
        };
        apply_changes(&prev.tables, &next.tables, &mut TableDriver { state: &mut state })?;

        let target = next.canonical();
        if let Some(detail) = first_divergence(&state.mirror, &target) {
            tracing::warn!(%detail, "migration rejected");
            return Err(MigrationError::DivergentResult {
                detail,
                notes: state.notes,
            });
        }

        tracing::info!(statements = state.statements.len(), "migration created");
        Ok(Migration {
            statements: state.statements,
            schema: target,
        })
    }
}

/// Compute the DDL that turns `prev` into `next` with the default configuration
pub fn migrate(prev: &Schema, next: &Schema) -> Result<Migration, MigrationError> {
    Migrator::default().migrate(prev, next)
}

/// Mutable state of a single run
struct MigrationState<'c> {
    mirror: Schema,
    statements: Vec<String>,
    notes: Vec<String>,
    config: &'c MigrationConfig,
}

impl MigrationState<'_> {
    fn emit(&mut self, statement: String) {
        tracing::debug!(%statement, "emit");
        self.statements.push(statement);
    }

    /// Record an edit that has no DDL and leaves the mirror untouched
    fn note(&mut self, note: String) {
        tracing::warn!(%note, "edit not migrated");
        self.notes.push(note);
    }

    fn mirror_table(&mut self, name: &str) -> Result<&mut Table, MigrationError> {
        self.mirror
            .tables
            .get_mut(name)
            .ok_or_else(|| MigrationError::DivergentResult {
                detail: format!("table {name} is missing from the mirror"),
                notes: self.notes.clone(),
            })
    }

    fn check_deprecated(&self, name: &str, qualified: String) -> Result<(), MigrationError> {
        if self.config.is_deprecated(name) {
            Ok(())
        } else {
            Err(MigrationError::UnsafeDrop { name: qualified })
        }
    }
}

struct TableDriver<'s, 'c> {
    state: &'s mut MigrationState<'c>,
}

impl ChangeDriver<Table> for TableDriver<'_, '_> {
    fn qualify(&self, name: &str) -> String {
        name.to_string()
    }

    fn create(&mut self, name: &str, next: &Table) -> Result<(), MigrationError> {
        for statement in ddl::create_table(name, next) {
            self.state.emit(statement);
        }
        self.state
            .mirror
            .tables
            .insert(name.to_string(), next.canonical());
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str, _prev: &Table) -> Result<(), MigrationError> {
        self.state.emit(ddl::rename_table(from, to));
        if let Some(table) = self.state.mirror.tables.shift_remove(from) {
            self.state.mirror.tables.insert(to.to_string(), table);
        }
        Ok(())
    }

    fn remove(&mut self, name: &str, _prev: &Table) -> Result<(), MigrationError> {
        self.state.check_deprecated(name, name.to_string())?;
        self.state.emit(ddl::drop_table(name));
        self.state.mirror.tables.shift_remove(name);
        Ok(())
    }

    fn change(&mut self, name: &str, prev: &Table, next: &Table) -> Result<(), MigrationError> {
        let mut columns = ColumnDriver {
            state: &mut *self.state,
            table: name,
        };
        apply_changes(&prev.columns, &next.columns, &mut columns)
    }
}

struct ColumnDriver<'s, 'c> {
    state: &'s mut MigrationState<'c>,
    table: &'s str,
}

impl ColumnDriver<'_, '_> {
    fn insert(&mut self, name: &str, column: Column) -> Result<(), MigrationError> {
        let table = self.state.mirror_table(self.table)?;
        table.columns.insert(name.to_string(), column);
        Ok(())
    }

    fn remove_from_mirror(&mut self, name: &str) -> Result<Option<Column>, MigrationError> {
        let table = self.state.mirror_table(self.table)?;
        Ok(table.columns.shift_remove(name))
    }

    fn move_in_mirror(&mut self, from: &str, to: &str) -> Result<(), MigrationError> {
        if let Some(column) = self.remove_from_mirror(from)? {
            self.insert(to, column)?;
        }
        Ok(())
    }
}

impl ChangeDriver<Column> for ColumnDriver<'_, '_> {
    fn qualify(&self, name: &str) -> String {
        format!("{}.{name}", self.table)
    }

    fn create(&mut self, name: &str, next: &Column) -> Result<(), MigrationError> {
        match &next.field {
            Field::Atom(atom) => {
                self.state.emit(ddl::add_column(self.table, name, atom));
            }
            Field::Index(index) => {
                self.state.emit(ddl::create_index(self.table, name, index));
            }
            Field::Relation(_) | Field::Alias(_) => {}
            Field::Constraint(_) => {
                let note = format!(
                    "adding constraint {} to an existing table is not supported",
                    self.qualify(name)
                );
                self.state.note(note);
                return Ok(());
            }
        }
        self.insert(name, next.canonical())
    }

    fn rename(&mut self, from: &str, to: &str, prev: &Column) -> Result<(), MigrationError> {
        match &prev.field {
            Field::Atom(_) => {
                self.state.emit(ddl::rename_column(self.table, from, to));
            }
            Field::Index(index) => {
                self.state.emit(ddl::drop_index(self.table, from));
                self.state.emit(ddl::create_index(self.table, to, index));
            }
            Field::Relation(_) | Field::Alias(_) => {}
            Field::Constraint(_) => {
                let note = format!(
                    "renaming constraint {} is not supported",
                    self.qualify(from)
                );
                self.state.note(note);
                return Ok(());
            }
        }
        self.move_in_mirror(from, to)
    }

    fn remove(&mut self, name: &str, prev: &Column) -> Result<(), MigrationError> {
        if !prev.field.is_virtual() {
            self.state.check_deprecated(name, self.qualify(name))?;
        }

        match &prev.field {
            Field::Atom(_) => self.state.emit(ddl::drop_column(self.table, name)),
            Field::Index(_) => self.state.emit(ddl::drop_index(self.table, name)),
            Field::Relation(_) | Field::Alias(_) => {}
            Field::Constraint(_) => {
                let note = format!(
                    "dropping constraint {} is not supported",
                    self.qualify(name)
                );
                self.state.note(note);
                return Ok(());
            }
        }
        self.remove_from_mirror(name)?;
        Ok(())
    }

    fn change(&mut self, name: &str, prev: &Column, next: &Column) -> Result<(), MigrationError> {
        if prev.field == next.field {
            return Ok(());
        }

        if prev.field.is_virtual() && next.field.is_virtual() {
            // virtual fields never touch the database
            return self.insert(name, next.canonical());
        }

        let note = if prev.field.kind() == next.field.kind() {
            format!(
                "{} {} changed in place: {:?} -> {:?}",
                prev.field.kind(),
                self.qualify(name),
                prev.field,
                next.field
            )
        } else {
            format!(
                "{} changed kind from {} to {}",
                self.qualify(name),
                prev.field.kind(),
                next.field.kind()
            )
        };
        self.state.note(note);
        Ok(())
    }
}
