//! Common table expressions (`WITH` clauses).
//!
//! ```rust
//! use sqltag_core::expr::col;
//! use sqltag_core::select::Select;
//! use sqltag_core::with::{CommonTableExpression, With};
//!
//! let recent = Select::new().from("Order").where_clause(col("age").lt(7));
//! let sql = Select::new()
//!     .with(With::new().table(CommonTableExpression::new("Recent", recent).materialized()))
//!     .from("Recent")
//!     .build();
//! assert_eq!(
//!     sql,
//!     "WITH recent AS MATERIALIZED (SELECT * FROM order WHERE age < 7) SELECT * FROM recent"
//! );
//! ```

use crate::naming::{join_identifiers, to_snake_case};
use crate::select::Select;

/// One named subquery of a `WITH` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonTableExpression {
    name: String,
    columns: Vec<String>,
    materialized: Option<bool>,
    select: Select,
}

impl CommonTableExpression {
    /// Creates `name AS (select)`.
    #[must_use]
    pub fn new(name: impl Into<String>, select: Select) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            materialized: None,
            select,
        }
    }

    /// Names the result columns, `name(col, ...)`.
    #[must_use]
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Adds `MATERIALIZED`.
    #[must_use]
    pub const fn materialized(mut self) -> Self {
        self.materialized = Some(true);
        self
    }

    /// Adds `NOT MATERIALIZED`.
    #[must_use]
    pub const fn not_materialized(mut self) -> Self {
        self.materialized = Some(false);
        self
    }

    /// Renders `name[(cols)] AS [[NOT] MATERIALIZED ](select)`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql = to_snake_case(&self.name);
        if !self.columns.is_empty() {
            sql.push_str(&format!("({})", join_identifiers(&self.columns)));
        }
        sql.push_str(" AS ");
        match self.materialized {
            Some(true) => sql.push_str("MATERIALIZED "),
            Some(false) => sql.push_str("NOT MATERIALIZED "),
            None => {}
        }
        sql.push_str(&format!("({})", self.select.build()));
        sql
    }
}

/// A `WITH [RECURSIVE]` clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct With {
    recursive: bool,
    tables: Vec<CommonTableExpression>,
}

impl With {
    /// Creates an empty `WITH` clause.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `RECURSIVE`.
    #[must_use]
    pub const fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Appends a common table expression.
    #[must_use]
    pub fn table(mut self, cte: CommonTableExpression) -> Self {
        self.tables.push(cte);
        self
    }

    /// Renders the clause.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let tables: Vec<String> = self
            .tables
            .iter()
            .map(CommonTableExpression::to_sql)
            .collect();
        let recursive = if self.recursive { "RECURSIVE " } else { "" };
        format!("WITH {recursive}{}", tables.join(", "))
    }
}
