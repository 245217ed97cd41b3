//! Constraint keyword recognition.

use super::scanner::Piece;

/// A top-level constraint keyword of the annotation grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `CONSTRAINT name`
    Constraint,
    /// `PRIMARY KEY`
    PrimaryKey,
    /// `NOT NULL`
    NotNull,
    /// `UNIQUE`
    Unique,
    /// `CHECK`
    Check,
    /// `DEFAULT`
    Default,
    /// `COLLATE`
    Collate,
    /// `REFERENCES`
    References,
    /// `GENERATED ALWAYS AS`
    Generated,
    /// `AS`, the short generated column form
    As,
}

impl Keyword {
    /// Returns the keyword as written in SQL.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Constraint => "CONSTRAINT",
            Self::PrimaryKey => "PRIMARY KEY",
            Self::NotNull => "NOT NULL",
            Self::Unique => "UNIQUE",
            Self::Check => "CHECK",
            Self::Default => "DEFAULT",
            Self::Collate => "COLLATE",
            Self::References => "REFERENCES",
            Self::Generated => "GENERATED",
            Self::As => "AS",
        }
    }

    /// Recognizes a keyword starting at `pieces[pos]`.
    ///
    /// Returns the keyword and the number of pieces it spans. Two-word
    /// keywords only match when both words are present, so a lone `KEY` or
    /// `NOT` is never taken for `PRIMARY KEY` or `NOT NULL`.
    #[must_use]
    pub fn recognize(pieces: &[Piece<'_>], pos: usize) -> Option<(Self, usize)> {
        let first = pieces.get(pos)?;
        let next_is = |word: &str| pieces.get(pos + 1).is_some_and(|p| p.is_word(word));

        let single = [
            Self::Constraint,
            Self::Unique,
            Self::Check,
            Self::Default,
            Self::Collate,
            Self::References,
            Self::Generated,
            Self::As,
        ];
        if let Some(keyword) = single.into_iter().find(|k| first.is_word(k.as_sql())) {
            return Some((keyword, 1));
        }
        if first.is_word("PRIMARY") && next_is("KEY") {
            return Some((Self::PrimaryKey, 2));
        }
        if first.is_word("NOT") && next_is("NULL") {
            return Some((Self::NotNull, 2));
        }
        None
    }
}
