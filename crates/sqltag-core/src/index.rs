//! CREATE INDEX statements.

use tracing::debug;

use crate::clause::IndexedColumn;
use crate::expr::{Expression, IntoExpression};
use crate::model::ModelDescriptor;
use crate::naming::to_snake_case;

/// A `CREATE INDEX` statement.
///
/// ```rust
/// use sqltag_core::clause::IndexedColumn;
/// use sqltag_core::expr::col;
/// use sqltag_core::Index;
///
/// let index = Index::new("idx_product_name", "Product")
///     .column(IndexedColumn::new("Name").collate("NOCASE"))
///     .unique()
///     .where_clause(col("deleted_at").is_null());
/// assert_eq!(
///     index.build(),
///     "CREATE UNIQUE INDEX idx_product_name ON product (name COLLATE NOCASE) WHERE deleted_at IS NULL;"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    name: String,
    table: String,
    schema: Option<String>,
    columns: Vec<IndexedColumn>,
    unique: bool,
    if_not_exists: bool,
    predicate: Option<Expression>,
}

impl Index {
    /// Creates an index on `table`. The table name is identifier-cased on
    /// render; the index name is kept as given.
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            schema: None,
            columns: Vec::new(),
            unique: false,
            if_not_exists: false,
            predicate: None,
        }
    }

    /// Creates an index on the table of a model.
    #[must_use]
    pub fn on_model(name: impl Into<String>, model: &ModelDescriptor) -> Self {
        Self::new(name, model.name.clone())
    }

    /// Adds an indexed column.
    #[must_use]
    pub fn column(mut self, column: impl Into<IndexedColumn>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Adds several indexed columns.
    #[must_use]
    pub fn columns<C: Into<IndexedColumn>>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Makes the index `UNIQUE`.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Adds `IF NOT EXISTS`.
    #[must_use]
    pub const fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Qualifies the index with a schema name.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Makes the index partial.
    #[must_use]
    pub fn where_clause(mut self, predicate: impl IntoExpression) -> Self {
        self.predicate = Some(predicate.into_expression());
        self
    }

    /// Returns the index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders `CREATE [UNIQUE ]INDEX [IF NOT EXISTS ][schema.]name ON table (cols)[ WHERE p];`.
    #[must_use]
    pub fn build(&self) -> String {
        let mut sql = String::from("CREATE ");
        if self.unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX ");
        if self.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        if let Some(schema) = &self.schema {
            sql.push_str(schema);
            sql.push('.');
        }
        let columns: Vec<String> = self.columns.iter().map(IndexedColumn::to_sql).collect();
        sql.push_str(&format!(
            "{} ON {} ({})",
            self.name,
            to_snake_case(&self.table),
            columns.join(", ")
        ));
        if let Some(predicate) = &self.predicate {
            sql.push_str(&format!(" WHERE {predicate}"));
        }
        sql.push(';');
        debug!(index = %self.name, table = %self.table, "built index");
        sql
    }
}
