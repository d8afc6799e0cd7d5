//! Generic change traversal shared by table- and column-level diffing

use std::collections::HashSet;

use indexmap::IndexMap;

use super::keys::diff_keys;
use crate::error::{MigrationError, RenameProblem};
use crate::schema::{Column, Table};

/// Entities that may carry a pending rename marker
pub(crate) trait Renamable {
    fn renamed_from(&self) -> Option<&str>;
}

impl Renamable for Table {
    fn renamed_from(&self) -> Option<&str> {
        self.renamed_from.as_deref()
    }
}

impl Renamable for Column {
    fn renamed_from(&self) -> Option<&str> {
        self.renamed_from.as_deref()
    }
}

/// Receiver of the operations found by [`apply_changes`]
pub(crate) trait ChangeDriver<T> {
    /// Name used when reporting errors about `name`
    fn qualify(&self, name: &str) -> String;

    fn create(&mut self, name: &str, next: &T) -> Result<(), MigrationError>;

    fn rename(&mut self, from: &str, to: &str, prev: &T) -> Result<(), MigrationError>;

    fn remove(&mut self, name: &str, prev: &T) -> Result<(), MigrationError>;

    fn change(&mut self, name: &str, prev: &T, next: &T) -> Result<(), MigrationError>;
}

/// Walk the difference between `prev` and `next`, reporting to `driver`
///
/// Operations are issued in three phases: added entities (creates and
/// renames) in `next` order, then removals in `prev` order, then entities
/// present on both sides in `next` order. A rename is followed immediately by
/// a change between the old and new entity so nested contents are diffed too.
pub(crate) fn apply_changes<T, D>(
    prev: &IndexMap<String, T>,
    next: &IndexMap<String, T>,
    driver: &mut D,
) -> Result<(), MigrationError>
where
    T: Renamable,
    D: ChangeDriver<T>,
{
    let keys = diff_keys(
        prev.keys().map(String::as_str),
        next.keys().map(String::as_str),
    );
    let mut renamed: HashSet<&str> = HashSet::new();

    for name in &keys.added {
        let entity = &next[*name];
        let Some(old_name) = entity.renamed_from() else {
            driver.create(name, entity)?;
            continue;
        };

        let invalid = |problem| MigrationError::InvalidRename {
            name: driver.qualify(name),
            from: driver.qualify(old_name),
            problem,
        };
        let Some(old_entity) = prev.get(old_name) else {
            return Err(invalid(RenameProblem::SourceMissing));
        };
        if next.contains_key(old_name) {
            return Err(invalid(RenameProblem::SourceStillPresent));
        }
        if !renamed.insert(old_name) {
            return Err(invalid(RenameProblem::SourceAlreadyConsumed));
        }

        driver.rename(old_name, name, old_entity)?;
        driver.change(name, old_entity, entity)?;
    }

    for name in &keys.removed {
        if renamed.contains(name) {
            continue;
        }
        driver.remove(name, &prev[*name])?;
    }

    for name in &keys.common {
        driver.change(name, &prev[*name], &next[*name])?;
    }

    Ok(())
}
