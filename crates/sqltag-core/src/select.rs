//! SELECT statement builder.
//!
//! Clauses render in SQL order regardless of the order the builder methods
//! are called in; absent clauses are omitted. The result has no trailing
//! semicolon so it can be nested as a subquery.
//!
//! ```rust
//! use sqltag_core::expr::{col, Column};
//! use sqltag_core::select::{Join, JoinKind, Select};
//!
//! let sql = Select::new()
//!     .column(Column::qualified("p", "name"))
//!     .from_as("Product", "p")
//!     .join(
//!         Join::table(JoinKind::Inner, "Category")
//!             .alias("c")
//!             .on(Column::qualified("p", "category_id").eq(Column::qualified("c", "id"))),
//!     )
//!     .where_clause(col("price").gt(10))
//!     .build();
//! assert_eq!(
//!     sql,
//!     "SELECT p.name FROM product AS p INNER JOIN category AS c ON p.category_id = c.id WHERE price > 10"
//! );
//! ```

use crate::expr::{Expression, IntoExpression};
use crate::naming::{join_identifiers, to_snake_case};
use crate::types::SortOrder;
use crate::with::With;
use tracing::warn;

/// `ALL` or `DISTINCT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// `SELECT ALL`
    All,
    /// `SELECT DISTINCT`
    Distinct,
}

impl SelectMode {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Distinct => "DISTINCT",
        }
    }
}

/// One entry of the result column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultColumn {
    /// `expr [AS alias]`
    Expr {
        /// The selected expression.
        expr: Expression,
        /// Optional alias.
        alias: Option<String>,
    },
    /// `*`
    Wildcard,
    /// `table.*`
    TableWildcard(String),
}

impl ResultColumn {
    /// Renders the result column.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Expr { expr, alias: None } => expr.to_string(),
            Self::Expr {
                expr,
                alias: Some(alias),
            } => format!("{expr} AS {alias}"),
            Self::Wildcard => String::from("*"),
            Self::TableWildcard(table) => format!("{}.*", to_snake_case(table)),
        }
    }
}

/// A table or subquery in a FROM clause or join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A table, identifier-cased on render.
    Table(String),
    /// A parenthesized subquery.
    Subquery(Box<Select>),
}

impl Source {
    fn to_sql(&self) -> String {
        match self {
            Self::Table(name) => to_snake_case(name),
            Self::Subquery(select) => format!("({})", select.build()),
        }
    }
}

/// The kind of a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `LEFT OUTER JOIN`
    LeftOuter,
    /// `RIGHT JOIN`
    Right,
    /// `RIGHT OUTER JOIN`
    RightOuter,
    /// `FULL JOIN`
    Full,
    /// `FULL OUTER JOIN`
    FullOuter,
    /// `CROSS JOIN`
    Cross,
    /// `NATURAL JOIN`
    Natural,
}

impl JoinKind {
    /// Returns the SQL join operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
            Self::Right => "RIGHT JOIN",
            Self::RightOuter => "RIGHT OUTER JOIN",
            Self::Full => "FULL JOIN",
            Self::FullOuter => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Natural => "NATURAL JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum JoinConstraint {
    On(Expression),
    Using(Vec<String>),
}

/// A join attached to a FROM clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    kind: JoinKind,
    source: Source,
    alias: Option<String>,
    constraint: Option<JoinConstraint>,
}

impl Join {
    /// Joins a table.
    #[must_use]
    pub fn table(kind: JoinKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            source: Source::Table(table.into()),
            alias: None,
            constraint: None,
        }
    }

    /// Joins a subquery.
    #[must_use]
    pub fn subquery(kind: JoinKind, select: Select) -> Self {
        Self {
            kind,
            source: Source::Subquery(Box::new(select)),
            alias: None,
            constraint: None,
        }
    }

    /// Sets the alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets an `ON` condition, replacing any `USING` list.
    #[must_use]
    pub fn on(mut self, condition: impl IntoExpression) -> Self {
        self.constraint = Some(JoinConstraint::On(condition.into_expression()));
        self
    }

    /// Sets a `USING` column list, replacing any `ON` condition.
    #[must_use]
    pub fn using<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.constraint = Some(JoinConstraint::Using(
            columns.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Renders the join.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.kind.as_sql(), self.source.to_sql());
        if let Some(alias) = &self.alias {
            sql.push_str(" AS ");
            sql.push_str(alias);
        }
        match &self.constraint {
            Some(JoinConstraint::On(expr)) => sql.push_str(&format!(" ON {expr}")),
            Some(JoinConstraint::Using(columns)) => {
                sql.push_str(&format!(" USING ({})", join_identifiers(columns)));
            }
            None => {}
        }
        sql
    }
}

/// `NULLS FIRST` / `NULLS LAST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    /// `NULLS FIRST`
    First,
    /// `NULLS LAST`
    Last,
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingTerm {
    expr: Expression,
    order: Option<SortOrder>,
    nulls: Option<NullsOrder>,
}

impl OrderingTerm {
    /// Orders by an expression with the default direction.
    #[must_use]
    pub fn new(expr: impl IntoExpression) -> Self {
        Self {
            expr: expr.into_expression(),
            order: None,
            nulls: None,
        }
    }

    /// Sorts ascending.
    #[must_use]
    pub const fn asc(mut self) -> Self {
        self.order = Some(SortOrder::Asc);
        self
    }

    /// Sorts descending.
    #[must_use]
    pub const fn desc(mut self) -> Self {
        self.order = Some(SortOrder::Desc);
        self
    }

    /// Places NULLs first or last.
    #[must_use]
    pub const fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }

    /// Renders the term.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql = self.expr.to_string();
        if let Some(order) = self.order {
            sql.push(' ');
            sql.push_str(order.as_sql());
        }
        match self.nulls {
            Some(NullsOrder::First) => sql.push_str(" NULLS FIRST"),
            Some(NullsOrder::Last) => sql.push_str(" NULLS LAST"),
            None => {}
        }
        sql
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FromClause {
    source: Source,
    alias: Option<String>,
}

/// A SELECT statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
    with: Option<With>,
    mode: Option<SelectMode>,
    columns: Vec<ResultColumn>,
    from: Option<FromClause>,
    joins: Vec<Join>,
    where_clause: Option<Expression>,
    group_by: Vec<Expression>,
    having: Option<Expression>,
    order_by: Vec<OrderingTerm>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    /// Creates an empty SELECT. Without result columns it selects `*`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches common table expressions.
    #[must_use]
    pub fn with(mut self, with: With) -> Self {
        self.with = Some(with);
        self
    }

    /// Adds `DISTINCT`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.mode = Some(SelectMode::Distinct);
        self
    }

    /// Adds `ALL`.
    #[must_use]
    pub const fn all(mut self) -> Self {
        self.mode = Some(SelectMode::All);
        self
    }

    /// Adds a result column.
    #[must_use]
    pub fn column(mut self, expr: impl IntoExpression) -> Self {
        self.columns.push(ResultColumn::Expr {
            expr: expr.into_expression(),
            alias: None,
        });
        self
    }

    /// Adds an aliased result column.
    #[must_use]
    pub fn column_as(mut self, expr: impl IntoExpression, alias: impl Into<String>) -> Self {
        self.columns.push(ResultColumn::Expr {
            expr: expr.into_expression(),
            alias: Some(alias.into()),
        });
        self
    }

    /// Adds several columns by name.
    #[must_use]
    pub fn columns(mut self, names: &[&str]) -> Self {
        self.columns.extend(names.iter().map(|name| ResultColumn::Expr {
            expr: Expression::raw(*name),
            alias: None,
        }));
        self
    }

    /// Adds `*`.
    #[must_use]
    pub fn wildcard(mut self) -> Self {
        self.columns.push(ResultColumn::Wildcard);
        self
    }

    /// Adds `table.*`.
    #[must_use]
    pub fn table_wildcard(mut self, table: impl Into<String>) -> Self {
        self.columns.push(ResultColumn::TableWildcard(table.into()));
        self
    }

    fn set_from(mut self, source: Source, alias: Option<String>) -> Self {
        self.from = Some(FromClause { source, alias });
        self
    }

    /// Selects from a table.
    #[must_use]
    pub fn from(self, table: impl Into<String>) -> Self {
        self.set_from(Source::Table(table.into()), None)
    }

    /// Selects from an aliased table.
    #[must_use]
    pub fn from_as(self, table: impl Into<String>, alias: impl Into<String>) -> Self {
        self.set_from(Source::Table(table.into()), Some(alias.into()))
    }

    /// Selects from an aliased subquery.
    #[must_use]
    pub fn from_subquery(self, select: Self, alias: impl Into<String>) -> Self {
        self.set_from(Source::Subquery(Box::new(select)), Some(alias.into()))
    }

    /// Attaches a join. Joins render in the order they are attached.
    ///
    /// Joins are kept apart from the source, so a join attached before
    /// `from` renders once a source is set. Joins without a source are not
    /// rendered and are reported with a warning on build.
    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Sets the WHERE condition.
    #[must_use]
    pub fn where_clause(mut self, condition: impl IntoExpression) -> Self {
        self.where_clause = Some(condition.into_expression());
        self
    }

    /// Adds a GROUP BY expression.
    #[must_use]
    pub fn group_by(mut self, expr: impl IntoExpression) -> Self {
        self.group_by.push(expr.into_expression());
        self
    }

    /// Sets the HAVING condition.
    #[must_use]
    pub fn having(mut self, condition: impl IntoExpression) -> Self {
        self.having = Some(condition.into_expression());
        self
    }

    /// Adds an ORDER BY term.
    #[must_use]
    pub fn order_by(mut self, term: OrderingTerm) -> Self {
        self.order_by.push(term);
        self
    }

    /// Sets the LIMIT.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the OFFSET.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Renders the statement on a single line, without a terminator.
    #[must_use]
    pub fn build(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(with) = &self.with {
            parts.push(with.to_sql());
        }
        parts.push(String::from("SELECT"));
        if let Some(mode) = self.mode {
            parts.push(mode.as_sql().to_string());
        }
        if self.columns.is_empty() {
            parts.push(String::from("*"));
        } else {
            parts.push(
                self.columns
                    .iter()
                    .map(ResultColumn::to_sql)
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        let source = self
            .from
            .as_ref()
            .map(|from| (from.source.to_sql(), from.alias.as_ref()))
            .filter(|(source, _)| !source.is_empty());
        match source {
            Some((source, alias)) => {
                parts.push(format!("FROM {source}"));
                if let Some(alias) = alias {
                    parts.push(format!("AS {alias}"));
                }
                parts.extend(self.joins.iter().map(Join::to_sql));
            }
            None if self.from.is_some() || !self.joins.is_empty() => {
                warn!(
                    joins = self.joins.len(),
                    "SELECT has no source table; FROM clause and joins are not rendered"
                );
            }
            None => {}
        }
        if let Some(condition) = &self.where_clause {
            parts.push(format!("WHERE {condition}"));
        }
        if !self.group_by.is_empty() {
            parts.push(format!("GROUP BY {}", join_expressions(&self.group_by)));
        }
        if let Some(condition) = &self.having {
            parts.push(format!("HAVING {condition}"));
        }
        if !self.order_by.is_empty() {
            let terms: Vec<String> = self.order_by.iter().map(OrderingTerm::to_sql).collect();
            parts.push(format!("ORDER BY {}", terms.join(", ")));
        }
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => parts.push(format!("LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => parts.push(format!("LIMIT {limit}")),
            // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
            (None, Some(offset)) => parts.push(format!("LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }
        parts.join(" ")
    }
}

fn join_expressions(exprs: &[Expression]) -> String {
    exprs
        .iter()
        .map(Expression::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, Column};

    #[test]
    fn test_default_wildcard() {
        assert_eq!(Select::new().from("Product").build(), "SELECT * FROM product");
    }

    #[test]
    fn test_every_clause_in_order() {
        let sql = Select::new()
            .offset(20)
            .limit(10)
            .order_by(OrderingTerm::new(col("total")).desc())
            .order_by(OrderingTerm::new(col("name")).asc())
            .having(col("total").gt(100))
            .group_by(col("name"))
            .where_clause(col("active").eq(true))
            .join(
                Join::table(JoinKind::Inner, "OrderLine")
                    .alias("l")
                    .on(Column::qualified("l", "customer_id").eq(Column::qualified("c", "id"))),
            )
            .from_as("Customer", "c")
            .column(Column::qualified("c", "name"))
            .column_as(Expression::raw("sum(l.amount)"), "total")
            .distinct()
            .build();
        assert_eq!(
            sql,
            "SELECT DISTINCT c.name, sum(l.amount) AS total FROM customer AS c \
             INNER JOIN order_line AS l ON l.customer_id = c.id WHERE active = TRUE \
             GROUP BY name HAVING total > 100 ORDER BY total DESC, name ASC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_join_kinds_and_using() {
        let sql = Select::new()
            .from("A")
            .join(Join::table(JoinKind::LeftOuter, "B").using(["RefId"]))
            .join(Join::table(JoinKind::Cross, "C"))
            .join(Join::table(JoinKind::Natural, "D"))
            .build();
        assert_eq!(
            sql,
            "SELECT * FROM a LEFT OUTER JOIN b USING (ref_id) CROSS JOIN c NATURAL JOIN d"
        );
    }

    #[test]
    fn test_on_replaces_using() {
        let join = Join::table(JoinKind::Left, "B").using(["x"]).on(col("a.x").eq(col("b.x")));
        assert_eq!(join.to_sql(), "LEFT JOIN b ON a.x = b.x");
    }

    #[test]
    fn test_subqueries() {
        let inner = Select::new().column(col("id")).from("Product").where_clause(col("price").gt(5));
        let sql = Select::new()
            .table_wildcard("p")
            .from_subquery(inner.clone(), "p")
            .join(Join::subquery(JoinKind::Inner, inner).alias("q").on(col("p.id").eq(col("q.id"))))
            .build();
        assert_eq!(
            sql,
            "SELECT p.* FROM (SELECT id FROM product WHERE price > 5) AS p \
             INNER JOIN (SELECT id FROM product WHERE price > 5) AS q ON p.id = q.id"
        );
    }

    #[test]
    fn test_offset_without_limit() {
        assert_eq!(
            Select::new().from("t").offset(5).build(),
            "SELECT * FROM t LIMIT -1 OFFSET 5"
        );
    }

    #[test]
    fn test_nulls_ordering() {
        assert_eq!(
            OrderingTerm::new(col("x")).desc().nulls(NullsOrder::Last).to_sql(),
            "x DESC NULLS LAST"
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let select = Select::new().all().columns(&["a", "b"]).from("T").limit(1);
        assert_eq!(select.build(), select.build());
        assert_eq!(select.build(), "SELECT ALL a, b FROM t LIMIT 1");
    }
}
