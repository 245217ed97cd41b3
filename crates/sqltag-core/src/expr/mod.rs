//! SQL expressions.
//!
//! An [`Expression`] is an opaque fragment of SQL text. It is the leaf used
//! by CHECK constraints, DEFAULT and GENERATED values, partial index
//! predicates, join conditions and every clause of a SELECT statement.
//!
//! ```rust
//! use sqltag_core::expr::{col, Expression};
//!
//! let cond = col("price").gt_eq(0).and(col("name").is_not_null());
//! assert_eq!(cond.as_str(), "price >= 0 AND name IS NOT NULL");
//!
//! let raw = Expression::raw("length(name) > 0");
//! assert_eq!(raw.to_string(), "length(name) > 0");
//! ```

mod value;

use std::fmt;

pub use value::{quote_text, BindingParameter, SqlValue, ToSqlValue};

use crate::error::{Result, SchemaError};
use crate::model::ModelDescriptor;
use crate::naming::to_snake_case;
use crate::select::Select;
use crate::types::StorageType;

/// Creates a column reference.
#[must_use]
pub fn col(name: &str) -> Column {
    Column {
        schema: None,
        table: None,
        name: String::from(name),
    }
}

/// Creates a literal expression from a Rust value.
#[must_use]
pub fn lit<T: ToSqlValue>(value: T) -> Expression {
    Expression::value(value)
}

/// A column reference, optionally qualified by a table name or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Optional schema qualifier, only rendered with a table.
    pub schema: Option<String>,
    /// Optional table qualifier.
    pub table: Option<String>,
    /// Column name.
    pub name: String,
}

impl Column {
    /// Creates a qualified column reference (`table.name`).
    #[must_use]
    pub fn qualified(table: &str, name: &str) -> Self {
        Self {
            schema: None,
            table: Some(String::from(table)),
            name: String::from(name),
        }
    }

    /// References a column of a model's table, checking that the model maps
    /// a field to it. Table and column are identifier-cased.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownColumn`] if no mapped field matches.
    pub fn of_model(model: &ModelDescriptor, name: &str) -> Result<Self> {
        if !model.maps_column(name) {
            return Err(SchemaError::UnknownColumn {
                model: model.name.clone(),
                column: String::from(name),
            });
        }
        Ok(Self {
            schema: None,
            table: Some(model.table_name()),
            name: to_snake_case(name),
        })
    }

    /// Qualifies the table with a schema name (`schema.table.name`).
    #[must_use]
    pub fn in_schema(mut self, schema: &str) -> Self {
        self.schema = Some(String::from(schema));
        self
    }

    /// Returns the SQL representation.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match (&self.schema, &self.table) {
            (Some(s), Some(t)) => format!("{s}.{t}.{}", self.name),
            (None, Some(t)) => format!("{t}.{}", self.name),
            (_, None) => self.name.clone(),
        }
    }

    /// Converts the reference into an expression.
    #[must_use]
    pub fn expr(self) -> Expression {
        self.into()
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, rhs: impl IntoExpression) -> Expression {
        self.expr().eq(rhs)
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq(self, rhs: impl IntoExpression) -> Expression {
        self.expr().not_eq(rhs)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt(self, rhs: impl IntoExpression) -> Expression {
        self.expr().lt(rhs)
    }

    /// Creates a less-than-or-equal expression.
    #[must_use]
    pub fn lt_eq(self, rhs: impl IntoExpression) -> Expression {
        self.expr().lt_eq(rhs)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt(self, rhs: impl IntoExpression) -> Expression {
        self.expr().gt(rhs)
    }

    /// Creates a greater-than-or-equal expression.
    #[must_use]
    pub fn gt_eq(self, rhs: impl IntoExpression) -> Expression {
        self.expr().gt_eq(rhs)
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Expression {
        self.expr().is_null()
    }

    /// Creates an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Expression {
        self.expr().is_not_null()
    }

    /// Creates a LIKE expression.
    #[must_use]
    pub fn like(self, pattern: impl IntoExpression) -> Expression {
        self.expr().like(pattern)
    }

    /// Creates a BETWEEN expression.
    #[must_use]
    pub fn between(self, low: impl IntoExpression, high: impl IntoExpression) -> Expression {
        self.expr().between(low, high)
    }

    /// Creates an IN expression over a value list.
    #[must_use]
    pub fn in_list<T: IntoExpression>(self, values: Vec<T>) -> Expression {
        self.expr().in_list(values)
    }
}

/// Conversion into an [`Expression`] operand.
///
/// Implemented for expressions, column references, binding parameters and
/// every [`ToSqlValue`] type (which become inline literals).
pub trait IntoExpression {
    /// Converts `self` into an expression.
    fn into_expression(self) -> Expression;
}

impl IntoExpression for Expression {
    fn into_expression(self) -> Expression {
        self
    }
}

impl IntoExpression for Column {
    fn into_expression(self) -> Expression {
        self.into()
    }
}

impl IntoExpression for BindingParameter {
    fn into_expression(self) -> Expression {
        Expression::param(&self)
    }
}

impl<T: ToSqlValue> IntoExpression for T {
    fn into_expression(self) -> Expression {
        Expression::value(self)
    }
}

/// An opaque SQL expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Expression {
    sql: String,
}

impl Expression {
    /// Creates an expression from raw SQL text.
    ///
    /// The text is emitted verbatim; only use it for trusted fragments.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    /// Creates an inline literal.
    #[must_use]
    pub fn value<T: ToSqlValue>(value: T) -> Self {
        Self::raw(value.to_sql_value().to_sql_inline())
    }

    /// Creates a binding parameter placeholder.
    #[must_use]
    pub fn param(param: &BindingParameter) -> Self {
        Self::raw(param.to_string())
    }

    /// Creates a function call, `name(arg, ...)`.
    #[must_use]
    pub fn function<T: IntoExpression>(name: &str, args: Vec<T>) -> Self {
        Self::raw(format!("{name}({})", join(args)))
    }

    /// Creates `CAST(expr AS type)`.
    #[must_use]
    pub fn cast(expr: impl IntoExpression, storage: StorageType) -> Self {
        Self::raw(format!(
            "CAST({} AS {})",
            expr.into_expression().sql,
            storage.as_sql()
        ))
    }

    /// Creates a parenthesized scalar subquery.
    #[must_use]
    pub fn subquery(select: &Select) -> Self {
        Self::raw(format!("({})", select.build()))
    }

    /// Creates `EXISTS (subquery)`.
    #[must_use]
    pub fn exists(select: &Select) -> Self {
        Self::raw(format!("EXISTS ({})", select.build()))
    }

    /// Creates `NOT EXISTS (subquery)`.
    #[must_use]
    pub fn not_exists(select: &Select) -> Self {
        Self::raw(format!("NOT EXISTS ({})", select.build()))
    }

    /// Creates a `RAISE(...)` call for trigger bodies.
    #[must_use]
    pub fn raise(action: &Raise) -> Self {
        Self::raw(action.to_sql())
    }

    fn binary(self, op: &str, rhs: impl IntoExpression) -> Self {
        Self::raw(format!("{} {op} {}", self.sql, rhs.into_expression().sql))
    }

    fn postfix(self, op: &str) -> Self {
        Self::raw(format!("{} {op}", self.sql))
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, other: impl IntoExpression) -> Self {
        self.binary("AND", other)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, other: impl IntoExpression) -> Self {
        self.binary("OR", other)
    }

    /// Wraps the expression in parentheses.
    #[must_use]
    pub fn paren(self) -> Self {
        Self::raw(format!("({})", self.sql))
    }

    /// Negates the expression with NOT.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::raw(format!("NOT {}", self.sql))
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, rhs: impl IntoExpression) -> Self {
        self.binary("=", rhs)
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq(self, rhs: impl IntoExpression) -> Self {
        self.binary("!=", rhs)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt(self, rhs: impl IntoExpression) -> Self {
        self.binary("<", rhs)
    }

    /// Creates a less-than-or-equal expression.
    #[must_use]
    pub fn lt_eq(self, rhs: impl IntoExpression) -> Self {
        self.binary("<=", rhs)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt(self, rhs: impl IntoExpression) -> Self {
        self.binary(">", rhs)
    }

    /// Creates a greater-than-or-equal expression.
    #[must_use]
    pub fn gt_eq(self, rhs: impl IntoExpression) -> Self {
        self.binary(">=", rhs)
    }

    /// Creates an arithmetic or concatenation expression with any operator.
    #[must_use]
    pub fn op(self, op: &str, rhs: impl IntoExpression) -> Self {
        self.binary(op, rhs)
    }

    /// Creates an `IS` expression.
    #[must_use]
    pub fn is(self, rhs: impl IntoExpression) -> Self {
        self.binary("IS", rhs)
    }

    /// Creates an `IS NOT` expression.
    #[must_use]
    pub fn is_not(self, rhs: impl IntoExpression) -> Self {
        self.binary("IS NOT", rhs)
    }

    /// Creates an `IS DISTINCT FROM` expression.
    #[must_use]
    pub fn is_distinct_from(self, rhs: impl IntoExpression) -> Self {
        self.binary("IS DISTINCT FROM", rhs)
    }

    /// Creates an `IS NOT DISTINCT FROM` expression.
    #[must_use]
    pub fn is_not_distinct_from(self, rhs: impl IntoExpression) -> Self {
        self.binary("IS NOT DISTINCT FROM", rhs)
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        self.postfix("IS NULL")
    }

    /// Creates an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        self.postfix("IS NOT NULL")
    }

    /// Creates a LIKE expression.
    #[must_use]
    pub fn like(self, pattern: impl IntoExpression) -> Self {
        self.binary("LIKE", pattern)
    }

    /// Creates a NOT LIKE expression.
    #[must_use]
    pub fn not_like(self, pattern: impl IntoExpression) -> Self {
        self.binary("NOT LIKE", pattern)
    }

    /// Creates `expr LIKE pattern ESCAPE escape`.
    #[must_use]
    pub fn like_escape(self, pattern: impl IntoExpression, escape: impl IntoExpression) -> Self {
        self.binary("LIKE", pattern).binary("ESCAPE", escape)
    }

    /// Creates a GLOB expression.
    #[must_use]
    pub fn glob(self, pattern: impl IntoExpression) -> Self {
        self.binary("GLOB", pattern)
    }

    /// Creates a NOT GLOB expression.
    #[must_use]
    pub fn not_glob(self, pattern: impl IntoExpression) -> Self {
        self.binary("NOT GLOB", pattern)
    }

    /// Creates a REGEXP expression.
    #[must_use]
    pub fn regexp(self, pattern: impl IntoExpression) -> Self {
        self.binary("REGEXP", pattern)
    }

    /// Creates a NOT REGEXP expression.
    #[must_use]
    pub fn not_regexp(self, pattern: impl IntoExpression) -> Self {
        self.binary("NOT REGEXP", pattern)
    }

    /// Creates a MATCH expression.
    #[must_use]
    pub fn matches(self, pattern: impl IntoExpression) -> Self {
        self.binary("MATCH", pattern)
    }

    /// Creates a NOT MATCH expression.
    #[must_use]
    pub fn not_matches(self, pattern: impl IntoExpression) -> Self {
        self.binary("NOT MATCH", pattern)
    }

    /// Creates a BETWEEN expression.
    #[must_use]
    pub fn between(self, low: impl IntoExpression, high: impl IntoExpression) -> Self {
        self.binary("BETWEEN", low).binary("AND", high)
    }

    /// Creates a NOT BETWEEN expression.
    #[must_use]
    pub fn not_between(self, low: impl IntoExpression, high: impl IntoExpression) -> Self {
        self.binary("NOT BETWEEN", low).binary("AND", high)
    }

    /// Creates an IN expression over a value list.
    #[must_use]
    pub fn in_list<T: IntoExpression>(self, values: Vec<T>) -> Self {
        Self::raw(format!("{} IN ({})", self.sql, join(values)))
    }

    /// Creates a NOT IN expression over a value list.
    #[must_use]
    pub fn not_in_list<T: IntoExpression>(self, values: Vec<T>) -> Self {
        Self::raw(format!("{} NOT IN ({})", self.sql, join(values)))
    }

    /// Creates an IN expression over a subquery.
    #[must_use]
    pub fn in_select(self, select: &Select) -> Self {
        Self::raw(format!("{} IN ({})", self.sql, select.build()))
    }

    /// Creates a NOT IN expression over a subquery.
    #[must_use]
    pub fn not_in_select(self, select: &Select) -> Self {
        Self::raw(format!("{} NOT IN ({})", self.sql, select.build()))
    }

    /// Applies a collation, `expr COLLATE name`.
    #[must_use]
    pub fn collate(self, collation: &str) -> Self {
        Self::raw(format!("{} COLLATE {collation}", self.sql))
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.sql
    }

    /// Consumes the expression and returns the SQL text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.sql
    }

    /// Returns true if the expression has no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl From<Column> for Expression {
    fn from(col: Column) -> Self {
        Self::raw(col.to_sql())
    }
}

impl From<&str> for Expression {
    fn from(sql: &str) -> Self {
        Self::raw(sql)
    }
}

impl From<String> for Expression {
    fn from(sql: String) -> Self {
        Self::raw(sql)
    }
}

fn join<T: IntoExpression>(items: Vec<T>) -> String {
    items
        .into_iter()
        .map(|e| e.into_expression().sql)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A `CASE` expression.
#[derive(Debug, Clone, Default)]
pub struct Case {
    operand: Option<Expression>,
    branches: Vec<(Expression, Expression)>,
    otherwise: Option<Expression>,
}

impl Case {
    /// Creates a searched CASE (`CASE WHEN cond THEN ...`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simple CASE over an operand (`CASE expr WHEN value ...`).
    #[must_use]
    pub fn on(operand: impl IntoExpression) -> Self {
        Self {
            operand: Some(operand.into_expression()),
            ..Self::default()
        }
    }

    /// Creates a CASE from parallel WHEN and THEN lists.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::CaseArity`] if the lists differ in length.
    pub fn from_branches(
        operand: Option<Expression>,
        whens: Vec<Expression>,
        thens: Vec<Expression>,
    ) -> Result<Self> {
        if whens.len() != thens.len() {
            return Err(SchemaError::CaseArity {
                when: whens.len(),
                then: thens.len(),
            });
        }
        Ok(Self {
            operand,
            branches: whens.into_iter().zip(thens).collect(),
            otherwise: None,
        })
    }

    /// Adds a `WHEN .. THEN ..` branch.
    #[must_use]
    pub fn when(mut self, when: impl IntoExpression, then: impl IntoExpression) -> Self {
        self.branches
            .push((when.into_expression(), then.into_expression()));
        self
    }

    /// Sets the `ELSE` result.
    #[must_use]
    pub fn otherwise(mut self, value: impl IntoExpression) -> Self {
        self.otherwise = Some(value.into_expression());
        self
    }

    /// Renders the CASE expression.
    #[must_use]
    pub fn build(&self) -> Expression {
        let mut sql = String::from("CASE");
        if let Some(operand) = &self.operand {
            sql.push(' ');
            sql.push_str(operand.as_str());
        }
        for (when, then) in &self.branches {
            sql.push_str(&format!(" WHEN {when} THEN {then}"));
        }
        if let Some(otherwise) = &self.otherwise {
            sql.push_str(&format!(" ELSE {otherwise}"));
        }
        sql.push_str(" END");
        Expression::raw(sql)
    }
}

/// The action of a `RAISE` function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Raise {
    /// `RAISE(IGNORE)`
    Ignore,
    /// `RAISE(ROLLBACK, message)`
    Rollback(String),
    /// `RAISE(ABORT, message)`
    Abort(String),
    /// `RAISE(FAIL, message)`
    Fail(String),
}

impl Raise {
    fn to_sql(&self) -> String {
        match self {
            Self::Ignore => String::from("RAISE(IGNORE)"),
            Self::Rollback(msg) => format!("RAISE(ROLLBACK, {})", quote_text(msg)),
            Self::Abort(msg) => format!("RAISE(ABORT, {})", quote_text(msg)),
            Self::Fail(msg) => format!("RAISE(FAIL, {})", quote_text(msg)),
        }
    }
}
