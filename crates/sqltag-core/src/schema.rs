//! Schema scripts.
//!
//! A [`Schema`] collects pragmas, tables and indexes and renders them as one
//! script in that fixed order: pragmas one per line, a blank line, each
//! table followed by a blank line, then indexes one per line.

use tracing::{debug, info};

use crate::error::Result;
use crate::index::Index;
use crate::pragma::Pragma;
use crate::table::Table;

/// An ordered collection of pragmas, tables and indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    pragmas: Vec<Pragma>,
    tables: Vec<Table>,
    indexes: Vec<Index>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pragmas: Vec::new(),
            tables: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Appends a pragma.
    #[must_use]
    pub fn pragma(mut self, pragma: Pragma) -> Self {
        self.pragmas.push(pragma);
        self
    }

    /// Appends a table.
    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Appends an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tables in order.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Renders the full script.
    ///
    /// # Errors
    ///
    /// Returns the first table validation error.
    pub fn build(&self) -> Result<String> {
        let mut script = String::new();
        for pragma in &self.pragmas {
            script.push_str(&pragma.build());
            script.push('\n');
        }
        script.push('\n');
        for table in &self.tables {
            script.push_str(&table.build()?);
            script.push('\n');
        }
        for index in &self.indexes {
            script.push_str(&index.build());
            script.push('\n');
        }
        debug!(script = %script, "rendered schema script");
        info!(
            schema = %self.name,
            pragmas = self.pragmas.len(),
            tables = self.tables.len(),
            indexes = self.indexes.len(),
            "built schema"
        );
        Ok(script)
    }
}
