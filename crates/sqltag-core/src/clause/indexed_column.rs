use crate::expr::Expression;
use crate::naming::to_snake_case;
use crate::types::SortOrder;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Name(String),
    Expr(Expression),
}

/// A column (or expression) in an index, primary key or unique list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedColumn {
    target: Target,
    collation: Option<String>,
    order: Option<SortOrder>,
}

impl IndexedColumn {
    /// Indexes a named column. The name is identifier-cased on render.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            target: Target::Name(name.into()),
            collation: None,
            order: None,
        }
    }

    /// Indexes an expression.
    #[must_use]
    pub fn expr(expr: impl Into<Expression>) -> Self {
        Self {
            target: Target::Expr(expr.into()),
            collation: None,
            order: None,
        }
    }

    /// Sets the collation.
    #[must_use]
    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the sort order. The first order set wins.
    #[must_use]
    pub fn order(mut self, order: SortOrder) -> Self {
        if self.order.is_none() {
            self.order = Some(order);
        }
        self
    }

    /// Sorts ascending.
    #[must_use]
    pub fn asc(self) -> Self {
        self.order(SortOrder::Asc)
    }

    /// Sorts descending.
    #[must_use]
    pub fn desc(self) -> Self {
        self.order(SortOrder::Desc)
    }

    /// Returns the column name, if this indexes a named column.
    #[must_use]
    pub fn column_name(&self) -> Option<&str> {
        match &self.target {
            Target::Name(name) => Some(name),
            Target::Expr(_) => None,
        }
    }

    /// Renders `target[ COLLATE c][ ASC|DESC]`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql = match &self.target {
            Target::Name(name) => to_snake_case(name),
            Target::Expr(expr) => expr.to_string(),
        };
        if let Some(collation) = &self.collation {
            sql.push_str(" COLLATE ");
            sql.push_str(collation);
        }
        if let Some(order) = self.order {
            sql.push(' ');
            sql.push_str(order.as_sql());
        }
        sql
    }
}

impl From<&str> for IndexedColumn {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for IndexedColumn {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Renders a comma separated list of indexed columns.
pub(crate) fn join_indexed(columns: &[IndexedColumn]) -> String {
    columns
        .iter()
        .map(IndexedColumn::to_sql)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_column() {
        assert_eq!(IndexedColumn::new("CreatedAt").to_sql(), "created_at");
        assert_eq!(
            IndexedColumn::new("Name").collate("NOCASE").desc().to_sql(),
            "name COLLATE NOCASE DESC"
        );
    }

    #[test]
    fn test_first_order_wins() {
        assert_eq!(IndexedColumn::new("a").asc().desc().to_sql(), "a ASC");
    }

    #[test]
    fn test_expression_column() {
        let column = IndexedColumn::expr("lower(email)");
        assert_eq!(column.column_name(), None);
        assert_eq!(column.to_sql(), "lower(email)");
    }
}
