use crate::expr::Expression;

/// A `CHECK (expr)` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    expr: Expression,
}

impl Check {
    /// Creates a check over the given boolean expression.
    #[must_use]
    pub fn new(expr: impl Into<Expression>) -> Self {
        Self { expr: expr.into() }
    }

    /// Returns the checked expression.
    #[must_use]
    pub const fn expr(&self) -> &Expression {
        &self.expr
    }

    /// Renders the clause.
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!("CHECK ({})", self.expr)
    }
}
