//! Constraint clause builders.
//!
//! Each builder renders one constraint kind from typed parameters. They are
//! used by the annotation parser and can be used directly when building
//! columns and tables by hand.

mod check;
mod default;
mod generated;
mod indexed_column;
mod key;

pub use check::Check;
pub use default::DefaultValue;
pub use generated::{Generated, GeneratedStorage};
pub use indexed_column::IndexedColumn;
pub use key::{ColumnPrimaryKey, TablePrimaryKey, TableUnique};

use crate::types::ConflictAction;

/// Renders `NOT NULL[ ON CONFLICT action]`.
#[must_use]
pub fn not_null_sql(conflict: Option<ConflictAction>) -> String {
    format!("NOT NULL{}", ConflictAction::suffix(conflict))
}

/// Renders `UNIQUE[ ON CONFLICT action]`.
#[must_use]
pub fn unique_sql(conflict: Option<ConflictAction>) -> String {
    format!("UNIQUE{}", ConflictAction::suffix(conflict))
}

/// Renders `COLLATE name`.
#[must_use]
pub fn collate_sql(collation: &str) -> String {
    format!("COLLATE {collation}")
}

/// Prefixes a fragment with `CONSTRAINT name` when a name is given.
pub(crate) fn named(name: Option<&str>, fragment: &str) -> String {
    match name {
        Some(name) => format!("CONSTRAINT {name} {fragment}"),
        None => fragment.to_string(),
    }
}
