use crate::expr::Expression;

/// Where a generated column's value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratedStorage {
    /// Computed on read.
    #[default]
    Virtual,
    /// Computed on write and stored.
    Stored,
}

impl GeneratedStorage {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Virtual => "VIRTUAL",
            Self::Stored => "STORED",
        }
    }

    /// Parses `STORED` or `VIRTUAL` (case-insensitive).
    #[must_use]
    pub fn from_sql(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "VIRTUAL" => Some(Self::Virtual),
            "STORED" => Some(Self::Stored),
            _ => None,
        }
    }
}

/// A generated column clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    expr: Expression,
    storage: GeneratedStorage,
    always: bool,
}

impl Generated {
    /// Creates `GENERATED ALWAYS AS (expr) VIRTUAL`.
    #[must_use]
    pub fn new(expr: impl Into<Expression>) -> Self {
        Self {
            expr: expr.into(),
            storage: GeneratedStorage::Virtual,
            always: true,
        }
    }

    /// Creates the short form, `AS (expr) VIRTUAL`.
    #[must_use]
    pub fn short(expr: impl Into<Expression>) -> Self {
        Self {
            always: false,
            ..Self::new(expr)
        }
    }

    /// Sets the storage.
    #[must_use]
    pub const fn storage(mut self, storage: GeneratedStorage) -> Self {
        self.storage = storage;
        self
    }

    /// Marks the column as `STORED`.
    #[must_use]
    pub const fn stored(self) -> Self {
        self.storage(GeneratedStorage::Stored)
    }

    /// Renders the clause.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let prefix = if self.always { "GENERATED ALWAYS " } else { "" };
        format!("{prefix}AS ({}) {}", self.expr, self.storage.as_sql())
    }
}
