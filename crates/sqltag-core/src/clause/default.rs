use crate::expr::{quote_text, Expression, SqlValue, ToSqlValue};

/// The value of a `DEFAULT` clause.
///
/// Annotation tokens are classified with [`DefaultValue::parse`]: keywords
/// stay keywords, quoted text becomes a string literal, signed numbers pass
/// through and anything else is treated as an expression and parenthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// `NULL`
    Null,
    /// `TRUE`
    True,
    /// `FALSE`
    False,
    /// `CURRENT_TIME`
    CurrentTime,
    /// `CURRENT_DATE`
    CurrentDate,
    /// `CURRENT_TIMESTAMP`
    CurrentTimestamp,
    /// A string literal (unquoted content).
    Text(String),
    /// A signed numeric literal, kept verbatim.
    Number(String),
    /// An expression, rendered in parentheses.
    Expression(Expression),
}

impl DefaultValue {
    /// Classifies a single annotation token.
    ///
    /// ```rust
    /// use sqltag_core::clause::DefaultValue;
    ///
    /// assert_eq!(DefaultValue::parse("current_timestamp"), DefaultValue::CurrentTimestamp);
    /// assert_eq!(DefaultValue::parse("-1.5").to_sql(), "DEFAULT -1.5");
    /// assert_eq!(DefaultValue::parse("'n/a'").to_sql(), "DEFAULT 'n/a'");
    /// assert_eq!(DefaultValue::parse("(random())").to_sql(), "DEFAULT (random())");
    /// ```
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.to_ascii_uppercase().as_str() {
            "NULL" => return Self::Null,
            "TRUE" => return Self::True,
            "FALSE" => return Self::False,
            "CURRENT_TIME" => return Self::CurrentTime,
            "CURRENT_DATE" => return Self::CurrentDate,
            "CURRENT_TIMESTAMP" => return Self::CurrentTimestamp,
            _ => {}
        }
        if let Some(text) = unquote(token) {
            return Self::Text(text);
        }
        if is_numeric_literal(token) {
            return Self::Number(token.to_string());
        }
        let inner = token
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .map_or(token, str::trim);
        Self::Expression(Expression::raw(inner))
    }

    /// Creates a default from a Rust value.
    #[must_use]
    pub fn value<T: ToSqlValue>(value: T) -> Self {
        match value.to_sql_value() {
            SqlValue::Null => Self::Null,
            SqlValue::Bool(true) => Self::True,
            SqlValue::Bool(false) => Self::False,
            SqlValue::Text(s) => Self::Text(s),
            v @ (SqlValue::Int(_) | SqlValue::Float(_)) => Self::Number(v.to_sql_inline()),
            v @ SqlValue::Blob(_) => Self::Expression(Expression::raw(v.to_sql_inline())),
        }
    }

    /// Renders `DEFAULT value`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let value = match self {
            Self::Null => String::from("NULL"),
            Self::True => String::from("TRUE"),
            Self::False => String::from("FALSE"),
            Self::CurrentTime => String::from("CURRENT_TIME"),
            Self::CurrentDate => String::from("CURRENT_DATE"),
            Self::CurrentTimestamp => String::from("CURRENT_TIMESTAMP"),
            Self::Text(s) => quote_text(s),
            Self::Number(n) => n.clone(),
            Self::Expression(e) => format!("({e})"),
        };
        format!("DEFAULT {value}")
    }
}

fn unquote(token: &str) -> Option<String> {
    for quote in ['\'', '"'] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            let inner = &token[1..token.len() - 1];
            let doubled = format!("{quote}{quote}");
            return Some(inner.replace(&doubled, &quote.to_string()));
        }
    }
    None
}

fn is_numeric_literal(token: &str) -> bool {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    unsigned
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.')
        && unsigned.parse::<f64>().is_ok()
}
