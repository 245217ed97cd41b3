//! Literal values and binding parameters embedded in expressions.
//!
//! Schema text is rendered ahead of execution, so literals are inlined
//! into the SQL with proper quoting instead of being bound.

use std::fmt;

/// A literal SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// `NULL`
    Null,
    /// `TRUE` / `FALSE`
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// Text literal, rendered single quoted.
    Text(String),
    /// Blob literal, rendered as `X'..'`.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the literal as SQL text, quoting and escaping as needed.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(true) => String::from("TRUE"),
            Self::Bool(false) => String::from("FALSE"),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => format_float(*f),
            Self::Text(s) => quote_text(s),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }
}

/// Wraps text in single quotes, doubling any embedded quote.
#[must_use]
pub fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// Keep a decimal point so the literal keeps REAL affinity.
fn format_float(f: f64) -> String {
    let s = f.to_string();
    if f.is_finite() && !s.contains(['.', 'e', 'E']) {
        format!("{s}.0")
    } else {
        s
    }
}

/// Trait for Rust values that can be written as SQL literals.
pub trait ToSqlValue {
    /// Converts the value to a [`SqlValue`].
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! impl_int_value {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )+
    };
}

impl_int_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        self.map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

/// A binding parameter placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingParameter {
    /// `?`
    Anonymous,
    /// `?NNN`
    Indexed(u32),
    /// `:name`
    Colon(String),
    /// `@name`
    At(String),
    /// `$name`
    Dollar(String),
}

impl fmt::Display for BindingParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("?"),
            Self::Indexed(n) => write!(f, "?{n}"),
            Self::Colon(name) => write!(f, ":{name}"),
            Self::At(name) => write!(f, "@{name}"),
            Self::Dollar(name) => write!(f, "${name}"),
        }
    }
}
