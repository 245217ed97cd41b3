//! Error types for schema construction.

/// Errors raised while turning annotations and builder calls into SQL.
///
/// Every variant is a construction error: the input that produced it has to
/// be fixed before the statement can be rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two constraint kinds that cannot share a column.
    #[error("column '{column}': {constraint} cannot be combined with {existing}")]
    Incompatible {
        /// The column being constrained.
        column: String,
        /// The constraint that was being added.
        constraint: &'static str,
        /// The constraint already present on the column.
        existing: &'static str,
    },

    /// AUTOINCREMENT outside an INTEGER PRIMARY KEY.
    #[error("column '{column}': AUTOINCREMENT is only allowed on INTEGER PRIMARY KEY columns, found {storage}")]
    AutoincrementRequiresIntegerKey {
        /// The column being constrained.
        column: String,
        /// The storage type the column was declared with.
        storage: String,
    },

    /// The same constraint kind was given twice on one column.
    #[error("column '{column}': duplicate {constraint} constraint")]
    DuplicateConstraint {
        /// The column being constrained.
        column: String,
        /// The repeated constraint.
        constraint: &'static str,
    },

    /// No candidate model carries the referenced entity name.
    #[error("column '{column}': no referenced model matches '{target}'")]
    UnresolvedReference {
        /// The owning column (or comma-joined columns).
        column: String,
        /// The entity name that was looked up.
        target: String,
    },

    /// A referenced column does not exist on the target model.
    #[error("column '{column}' not found in referenced model '{target}'")]
    UnknownTargetColumn {
        /// The referenced model.
        target: String,
        /// The missing column.
        column: String,
    },

    /// A column named by a table-level clause is not declared by the model.
    #[error("column '{column}' not found in model '{model}'")]
    UnknownColumn {
        /// The owning model.
        model: String,
        /// The missing column.
        column: String,
    },

    /// A REFERENCES clause that cannot be parsed.
    #[error("column '{column}': invalid REFERENCES clause: {message}")]
    InvalidReference {
        /// The owning column.
        column: String,
        /// What went wrong.
        message: String,
    },

    /// An action keyword of a REFERENCES clause is not recognized.
    #[error("column '{column}': invalid {clause} action '{value}'")]
    InvalidAction {
        /// The owning column.
        column: String,
        /// The clause the action belongs to (`ON DELETE`, `DEFERRABLE`, ...).
        clause: &'static str,
        /// The rejected action text.
        value: String,
    },

    /// A constraint keyword is missing the expression it requires.
    #[error("column '{column}': {constraint} requires {expected}")]
    MissingExpression {
        /// The owning column.
        column: String,
        /// The constraint keyword.
        constraint: &'static str,
        /// What should have followed it.
        expected: &'static str,
    },

    /// The annotation text itself is malformed (unbalanced parentheses,
    /// unterminated quote).
    #[error("column '{column}': {message} at offset {offset}")]
    Syntax {
        /// The owning column.
        column: String,
        /// What went wrong.
        message: String,
        /// Byte offset into the annotation.
        offset: usize,
    },

    /// The model maps no field to a column and the table has no
    /// constraints.
    #[error("model '{model}' has no columns")]
    EmptyTable {
        /// The model name.
        model: String,
    },

    /// Owning and referenced column lists differ in length.
    #[error("foreign key on ({columns}) references {expected} column(s), found {found}")]
    ColumnCountMismatch {
        /// The owning columns, comma joined.
        columns: String,
        /// Number of owning columns.
        expected: usize,
        /// Number of referenced columns supplied.
        found: usize,
    },

    /// WHEN and THEN lists of a CASE expression differ in length.
    #[error("CASE expression requires as many THEN as WHEN branches ({when} WHEN, {then} THEN)")]
    CaseArity {
        /// Number of WHEN branches.
        when: usize,
        /// Number of THEN branches.
        then: usize,
    },

    /// An error raised while building one field of a model.
    #[error("{model}.{field}: {source}")]
    Field {
        /// The model being built.
        model: String,
        /// The field whose annotation failed.
        field: String,
        /// The underlying error.
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    /// Wraps the error with the model and field it was raised for.
    #[must_use]
    pub fn in_field(self, model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Field {
            model: model.into(),
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, unwrapping any field context.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Field { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for schema construction.
pub type Result<T> = std::result::Result<T, SchemaError>;
