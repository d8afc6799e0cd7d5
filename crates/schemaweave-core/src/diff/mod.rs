//! Schema diffing and migration synthesis

mod apply;
pub mod ddl;
mod keys;
mod migrate;

pub use keys::{diff_keys, KeyDiff};
pub use migrate::{migrate, Migration, Migrator};
