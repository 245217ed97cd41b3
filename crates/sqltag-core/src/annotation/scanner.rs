//! Cursor-based scanner for annotation text.
//!
//! A single pass splits the input into three kinds of pieces:
//!
//! - words: maximal runs of non-whitespace that stop before `(`
//! - quoted literals: `'...'`, `"..."` or `` `...` `` with doubled-quote
//!   escapes, kept as one piece even when they contain whitespace
//! - groups: a balanced parenthesized span, nested parentheses and quoted
//!   text included, kept verbatim
//!
//! `CHECK(length(name) > 0)` therefore scans as the word `CHECK` followed
//! by the group `(length(name) > 0)`.

/// Byte range of a piece within the scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// The kind of a scanned piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    /// A bare word.
    Word,
    /// A quoted literal, quotes included.
    Quoted,
    /// A balanced parenthesized group, parentheses included.
    Group,
}

/// One scanned piece of annotation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece<'a> {
    /// What the piece is.
    pub kind: PieceKind,
    /// The exact source text of the piece.
    pub text: &'a str,
    /// Where the piece sits in the input.
    pub span: Span,
}

impl<'a> Piece<'a> {
    /// Returns true if this is a word equal to `keyword` (case-insensitive).
    #[must_use]
    pub fn is_word(&self, keyword: &str) -> bool {
        self.kind == PieceKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Returns the text between the outer parentheses of a group.
    #[must_use]
    pub fn group_inner(&self) -> Option<&'a str> {
        if self.kind != PieceKind::Group {
            return None;
        }
        self.text
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .map(str::trim)
    }
}

/// A scanning failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    /// What went wrong.
    pub message: &'static str,
    /// Byte offset where the offending construct starts.
    pub offset: usize,
}

/// Scanner over annotation text.
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn piece(&self, kind: PieceKind, start: usize) -> Piece<'a> {
        Piece {
            kind,
            text: &self.input[start..self.pos],
            span: Span::new(start, self.pos),
        }
    }

    /// Consumes a quoted literal whose opening quote is at the cursor.
    fn scan_quoted(&mut self, quote: char) -> Result<(), ScanError> {
        let start = self.pos;
        self.advance();
        loop {
            match self.advance() {
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        self.advance();
                    } else {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => {
                    return Err(ScanError {
                        message: "unterminated quoted literal",
                        offset: start,
                    })
                }
            }
        }
    }

    /// Consumes a balanced group whose `(` is at the cursor.
    fn scan_group(&mut self) -> Result<(), ScanError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '\'' | '"' | '`' => {
                    self.scan_quoted(c)?;
                    continue;
                }
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.advance();
        }
        Err(ScanError {
            message: "unbalanced parentheses",
            offset: start,
        })
    }

    fn scan_word(&mut self) {
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && c != '(')
        {
            self.advance();
        }
    }

    /// Scans the next piece, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] for unbalanced parentheses or an
    /// unterminated quoted literal.
    pub fn next_piece(&mut self) -> Result<Option<Piece<'a>>, ScanError> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let kind = match c {
            '(' => {
                self.scan_group()?;
                PieceKind::Group
            }
            '\'' | '"' | '`' => {
                self.scan_quoted(c)?;
                PieceKind::Quoted
            }
            _ => {
                self.scan_word();
                PieceKind::Word
            }
        };
        Ok(Some(self.piece(kind, start)))
    }
}

/// Scans the whole input into pieces.
///
/// # Errors
///
/// Returns the first [`ScanError`] encountered.
///
/// ```rust
/// use sqltag_core::annotation::{tokenize, PieceKind};
///
/// let pieces = tokenize("CHECK(length(Name) > 0)").unwrap();
/// assert_eq!(pieces.len(), 2);
/// assert_eq!(pieces[1].kind, PieceKind::Group);
/// assert_eq!(pieces[1].text, "(length(Name) > 0)");
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Piece<'_>>, ScanError> {
    let mut scanner = Scanner::new(input);
    let mut pieces = Vec::new();
    while let Some(piece) = scanner.next_piece()? {
        pieces.push(piece);
    }
    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<&str> {
        tokenize(input).unwrap().iter().map(|p| p.text).collect()
    }

    #[test]
    fn test_words() {
        assert_eq!(
            texts("  PRIMARY KEY\tAUTOINCREMENT "),
            vec!["PRIMARY", "KEY", "AUTOINCREMENT"]
        );
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_group_attached_to_keyword() {
        let pieces = tokenize("CHECK(Price >= 0)").unwrap();
        assert_eq!(pieces[0].text, "CHECK");
        assert_eq!(pieces[0].kind, PieceKind::Word);
        assert_eq!(pieces[1].text, "(Price >= 0)");
        assert_eq!(pieces[1].group_inner(), Some("Price >= 0"));
        assert_eq!(pieces[1].span, Span::new(5, 17));
    }

    #[test]
    fn test_nested_group() {
        assert_eq!(
            texts("CHECK ( length(Name) > (SELECT 0) ) UNIQUE"),
            vec!["CHECK", "( length(Name) > (SELECT 0) )", "UNIQUE"]
        );
    }

    #[test]
    fn test_parens_inside_quotes_are_ignored() {
        assert_eq!(
            texts("CHECK (name != ')') NOT NULL"),
            vec!["CHECK", "(name != ')')", "NOT", "NULL"]
        );
    }

    #[test]
    fn test_quoted_literal_with_spaces() {
        let pieces = tokenize("DEFAULT 'it''s here' NOT NULL").unwrap();
        assert_eq!(pieces[1].kind, PieceKind::Quoted);
        assert_eq!(pieces[1].text, "'it''s here'");
        assert_eq!(pieces.len(), 4);
    }

    #[test]
    fn test_unbalanced_group() {
        let err = tokenize("CHECK (a > (b)").unwrap_err();
        assert_eq!(err.message, "unbalanced parentheses");
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize("DEFAULT 'abc").unwrap_err();
        assert_eq!(err.message, "unterminated quoted literal");
        assert_eq!(err.offset, 8);
    }

    #[test]
    fn test_word_stops_at_paren() {
        assert_eq!(
            texts("REFERENCES Category(Id) ON DELETE CASCADE"),
            vec!["REFERENCES", "Category", "(Id)", "ON", "DELETE", "CASCADE"]
        );
    }
}
