use super::indexed_column::join_indexed;
use super::IndexedColumn;
use crate::types::{ConflictAction, SortOrder};

/// A column-level `PRIMARY KEY` clause.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnPrimaryKey {
    order: Option<SortOrder>,
    conflict: Option<ConflictAction>,
    autoincrement: bool,
}

impl ColumnPrimaryKey {
    /// Creates a bare `PRIMARY KEY`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key's sort order.
    #[must_use]
    pub const fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the conflict resolution.
    #[must_use]
    pub const fn on_conflict(mut self, action: ConflictAction) -> Self {
        self.conflict = Some(action);
        self
    }

    /// Adds `AUTOINCREMENT`.
    #[must_use]
    pub const fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// Returns true if `AUTOINCREMENT` is set.
    #[must_use]
    pub const fn is_autoincrement(&self) -> bool {
        self.autoincrement
    }

    /// Renders `PRIMARY KEY[ ASC|DESC][ ON CONFLICT a][ AUTOINCREMENT]`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("PRIMARY KEY");
        if let Some(order) = self.order {
            sql.push(' ');
            sql.push_str(order.as_sql());
        }
        sql.push_str(&ConflictAction::suffix(self.conflict));
        if self.autoincrement {
            sql.push_str(" AUTOINCREMENT");
        }
        sql
    }
}

/// A table-level `PRIMARY KEY (cols)` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePrimaryKey {
    columns: Vec<IndexedColumn>,
    conflict: Option<ConflictAction>,
}

impl TablePrimaryKey {
    /// Creates a key over the given columns.
    #[must_use]
    pub fn new<C: Into<IndexedColumn>>(columns: impl IntoIterator<Item = C>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            conflict: None,
        }
    }

    /// Sets the conflict resolution.
    #[must_use]
    pub fn on_conflict(mut self, action: ConflictAction) -> Self {
        self.conflict = Some(action);
        self
    }

    /// Returns the key columns.
    #[must_use]
    pub fn columns(&self) -> &[IndexedColumn] {
        &self.columns
    }

    /// Renders the constraint.
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!(
            "PRIMARY KEY ({}){}",
            join_indexed(&self.columns),
            ConflictAction::suffix(self.conflict)
        )
    }
}

/// A table-level `UNIQUE (cols)` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableUnique {
    columns: Vec<IndexedColumn>,
    conflict: Option<ConflictAction>,
}

impl TableUnique {
    /// Creates a unique constraint over the given columns.
    #[must_use]
    pub fn new<C: Into<IndexedColumn>>(columns: impl IntoIterator<Item = C>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            conflict: None,
        }
    }

    /// Sets the conflict resolution.
    #[must_use]
    pub fn on_conflict(mut self, action: ConflictAction) -> Self {
        self.conflict = Some(action);
        self
    }

    /// Returns the constrained columns.
    #[must_use]
    pub fn columns(&self) -> &[IndexedColumn] {
        &self.columns
    }

    /// Renders the constraint.
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!(
            "UNIQUE ({}){}",
            join_indexed(&self.columns),
            ConflictAction::suffix(self.conflict)
        )
    }
}
