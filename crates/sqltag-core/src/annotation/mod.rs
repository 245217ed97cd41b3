//! The annotation compiler.
//!
//! An annotation is the constraint text attached to one model field, for
//! example `PRIMARY KEY AUTOINCREMENT` or
//! `REFERENCES Category (Id) ON DELETE SET NULL`. [`parse_annotation`] turns
//! it into an ordered list of typed constraints; [`crate::Column`] applies
//! them and enforces the per-column invariants.
//!
//! Parsing is lenient about words it does not understand: they are skipped
//! and logged at debug level. Malformed constraint arguments (a CHECK
//! without its expression, unbalanced parentheses) are errors.

mod keyword;
mod scanner;

pub use keyword::Keyword;
pub use scanner::{tokenize, Piece, PieceKind, ScanError, Scanner, Span};

use tracing::{debug, warn};

use crate::clause::{Check, ColumnPrimaryKey, DefaultValue, Generated, GeneratedStorage};
use crate::error::{Result, SchemaError};
use crate::expr::Expression;
use crate::types::{ConflictAction, SortOrder};

/// One constraint recognized in an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintSpec {
    /// `PRIMARY KEY ...`
    PrimaryKey(ColumnPrimaryKey),
    /// `NOT NULL [ON CONFLICT action]`
    NotNull(Option<ConflictAction>),
    /// `UNIQUE [ON CONFLICT action]`
    Unique(Option<ConflictAction>),
    /// `CHECK (expr)`
    Check(Check),
    /// `DEFAULT value`
    Default(DefaultValue),
    /// `COLLATE name`
    Collate(String),
    /// The captured `REFERENCES ...` clause, handed to the foreign key parser.
    References(String),
    /// `GENERATED ALWAYS AS (expr)` or `AS (expr)`
    Generated(Generated),
}

/// A constraint together with its optional `CONSTRAINT name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedConstraint {
    /// Name given by a preceding `CONSTRAINT name`.
    pub name: Option<String>,
    /// The constraint itself.
    pub spec: ConstraintSpec,
}

/// Parses the annotation of column `column`.
///
/// # Errors
///
/// Returns [`SchemaError::Syntax`] for unbalanced parentheses or an
/// unterminated quote, and [`SchemaError::MissingExpression`] when CHECK,
/// DEFAULT, COLLATE or GENERATED lack their argument.
///
/// ```rust
/// use sqltag_core::annotation::{parse_annotation, ConstraintSpec};
///
/// let parsed = parse_annotation("price", "NOT NULL CHECK(price >= 0)").unwrap();
/// assert_eq!(parsed.len(), 2);
/// assert_eq!(parsed[0].spec, ConstraintSpec::NotNull(None));
/// ```
pub fn parse_annotation(column: &str, annotation: &str) -> Result<Vec<AnnotatedConstraint>> {
    let pieces = tokenize(annotation).map_err(|e| SchemaError::Syntax {
        column: column.to_string(),
        message: e.message.to_string(),
        offset: e.offset,
    })?;
    Parser {
        column,
        pieces,
        pos: 0,
    }
    .parse()
}

struct Parser<'a> {
    column: &'a str,
    pieces: Vec<Piece<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Piece<'a>> {
        self.pieces.get(self.pos).copied()
    }

    fn peek_is(&self, offset: usize, word: &str) -> bool {
        self.pieces
            .get(self.pos + offset)
            .is_some_and(|p| p.is_word(word))
    }

    fn at_keyword(&self) -> bool {
        Keyword::recognize(&self.pieces, self.pos).is_some()
    }

    fn missing(&self, constraint: &'static str, expected: &'static str) -> SchemaError {
        SchemaError::MissingExpression {
            column: self.column.to_string(),
            constraint,
            expected,
        }
    }

    fn skip(&mut self, piece: Piece<'_>) {
        debug!(
            column = self.column,
            token = piece.text,
            "skipping unrecognized annotation token"
        );
        self.pos += 1;
    }

    fn parse(mut self) -> Result<Vec<AnnotatedConstraint>> {
        let mut constraints = Vec::new();
        let mut pending_name: Option<String> = None;

        while let Some(piece) = self.peek() {
            let Some((keyword, width)) = Keyword::recognize(&self.pieces, self.pos) else {
                self.skip(piece);
                continue;
            };
            self.pos += width;

            let spec = match keyword {
                Keyword::Constraint => {
                    match self.peek() {
                        Some(name) if name.kind == PieceKind::Word && !self.at_keyword() => {
                            pending_name = Some(name.text.to_string());
                            self.pos += 1;
                        }
                        _ => warn!(column = self.column, "CONSTRAINT without a name ignored"),
                    }
                    continue;
                }
                Keyword::PrimaryKey => ConstraintSpec::PrimaryKey(self.primary_key()),
                Keyword::NotNull => ConstraintSpec::NotNull(self.conflict_clause()),
                Keyword::Unique => ConstraintSpec::Unique(self.conflict_clause()),
                Keyword::Check => ConstraintSpec::Check(Check::new(
                    self.group("CHECK", "a parenthesized expression")?,
                )),
                Keyword::Default => ConstraintSpec::Default(self.default_value()?),
                Keyword::Collate => ConstraintSpec::Collate(self.collation()?),
                Keyword::References => ConstraintSpec::References(self.references()),
                Keyword::Generated => {
                    if !(self.peek_is(0, "ALWAYS") && self.peek_is(1, "AS")) {
                        return Err(self.missing("GENERATED", "ALWAYS AS (expression)"));
                    }
                    self.pos += 2;
                    ConstraintSpec::Generated(self.generated(true)?)
                }
                Keyword::As => ConstraintSpec::Generated(self.generated(false)?),
            };
            constraints.push(AnnotatedConstraint {
                name: pending_name.take(),
                spec,
            });
        }

        if let Some(name) = pending_name {
            warn!(
                column = self.column,
                name = %name,
                "CONSTRAINT name not followed by a constraint"
            );
        }
        Ok(constraints)
    }

    /// Consumes `[ON] [CONFLICT] action`. Unknown actions are dropped.
    fn conflict_action(&mut self) -> Option<ConflictAction> {
        if self.peek_is(0, "CONFLICT") {
            self.pos += 1;
        }
        let piece = self.peek().filter(|p| p.kind == PieceKind::Word)?;
        if self.at_keyword() {
            return None;
        }
        self.pos += 1;
        let action = ConflictAction::from_sql(piece.text);
        if action.is_none() {
            warn!(
                column = self.column,
                action = piece.text,
                "unknown conflict action ignored"
            );
        }
        action
    }

    /// Parses an optional `ON CONFLICT action` directly following.
    fn conflict_clause(&mut self) -> Option<ConflictAction> {
        if self.peek_is(0, "ON") && self.peek_is(1, "CONFLICT") {
            self.pos += 1;
            return self.conflict_action();
        }
        None
    }

    fn primary_key(&mut self) -> ColumnPrimaryKey {
        let mut key = ColumnPrimaryKey::new();
        let mut ordered = false;
        while let Some(piece) = self.peek() {
            if self.at_keyword() {
                break;
            }
            if piece.kind == PieceKind::Word {
                if let Some(order) = SortOrder::from_sql(piece.text) {
                    if !ordered {
                        key = key.order(order);
                        ordered = true;
                    }
                    self.pos += 1;
                    continue;
                }
                if piece.is_word("AUTOINCREMENT") {
                    key = key.autoincrement();
                    self.pos += 1;
                    continue;
                }
                if piece.is_word("ON") {
                    self.pos += 1;
                    if let Some(action) = self.conflict_action() {
                        key = key.on_conflict(action);
                    }
                    continue;
                }
            }
            self.skip(piece);
        }
        key
    }

    fn group(&mut self, constraint: &'static str, expected: &'static str) -> Result<Expression> {
        let inner = self
            .peek()
            .and_then(|p| p.group_inner())
            .filter(|inner| !inner.is_empty())
            .ok_or_else(|| self.missing(constraint, expected))?;
        self.pos += 1;
        Ok(Expression::raw(inner))
    }

    fn default_value(&mut self) -> Result<DefaultValue> {
        let piece = self
            .peek()
            .filter(|p| p.group_inner() != Some(""))
            .filter(|_| !self.at_keyword())
            .ok_or_else(|| self.missing("DEFAULT", "a value or parenthesized expression"))?;
        self.pos += 1;
        Ok(DefaultValue::parse(piece.text))
    }

    fn collation(&mut self) -> Result<String> {
        let piece = self
            .peek()
            .filter(|p| p.kind == PieceKind::Word)
            .filter(|_| !self.at_keyword())
            .ok_or_else(|| self.missing("COLLATE", "a collation name"))?;
        self.pos += 1;
        Ok(piece.text.to_string())
    }

    /// Captures everything up to the next top-level constraint keyword.
    ///
    /// `DEFAULT` right after `SET` belongs to an `ON DELETE SET DEFAULT`
    /// action and does not end the clause.
    fn references(&mut self) -> String {
        let mut clause = String::from("REFERENCES");
        while let Some(piece) = self.peek() {
            let after_set = self.pos > 0 && self.pieces[self.pos - 1].is_word("SET");
            if self.at_keyword() && !(after_set && piece.is_word("DEFAULT")) {
                break;
            }
            clause.push(' ');
            clause.push_str(piece.text);
            self.pos += 1;
        }
        clause
    }

    fn generated(&mut self, always: bool) -> Result<Generated> {
        let constraint = if always { "GENERATED" } else { "AS" };
        let expr = self.group(constraint, "a parenthesized expression")?;
        let mut generated = if always {
            Generated::new(expr)
        } else {
            Generated::short(expr)
        };
        if let Some(storage) = self
            .peek()
            .filter(|p| p.kind == PieceKind::Word)
            .and_then(|p| GeneratedStorage::from_sql(p.text))
        {
            generated = generated.storage(storage);
            self.pos += 1;
        }
        Ok(generated)
    }
}
