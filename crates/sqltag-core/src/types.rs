//! SQLite storage classes and the small keyword enums shared by clauses.

use std::fmt;

/// SQLite storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageType {
    /// `NULL`
    Null,
    /// `TEXT`
    #[default]
    Text,
    /// `INTEGER`
    Integer,
    /// `REAL`
    Real,
    /// `BLOB`
    Blob,
}

impl StorageType {
    /// Returns the SQL keyword of the storage class.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
        }
    }

    /// Parses a storage class keyword (case-insensitive).
    #[must_use]
    pub fn from_sql(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NULL" => Some(Self::Null),
            "TEXT" => Some(Self::Text),
            "INTEGER" => Some(Self::Integer),
            "REAL" => Some(Self::Real),
            "BLOB" => Some(Self::Blob),
            _ => None,
        }
    }

    /// Infers the storage class of a declared field type.
    ///
    /// Accepts either a storage class keyword or a Rust type as written in
    /// source (`i64`, `Option<String>`, `Vec<u8>`, ...). Wrappers such as
    /// `Option` and `Box` are looked through. Unknown types map to `TEXT`.
    #[must_use]
    pub fn infer(declared: &str) -> Self {
        let compact: String = declared.chars().filter(|c| !c.is_whitespace()).collect();
        if let Some(storage) = Self::from_sql(&compact) {
            return storage;
        }
        Self::map_rust_type(&compact)
    }

    fn map_rust_type(ty: &str) -> Self {
        let ty = ty.trim_start_matches('&').trim_start_matches("'static");
        for wrapper in ["Option<", "Box<", "std::option::Option<", "std::boxed::Box<"] {
            if let Some(inner) = ty.strip_prefix(wrapper).and_then(|t| t.strip_suffix('>')) {
                return Self::map_rust_type(inner);
            }
        }
        match ty {
            "bool" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32"
            | "u64" | "u128" | "usize" => Self::Integer,
            "f32" | "f64" => Self::Real,
            "String" | "str" | "char" => Self::Text,
            "Vec<u8>" | "[u8]" => Self::Blob,
            t if t.starts_with("[u8;") => Self::Blob,
            _ => Self::Text,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Sort direction of an indexed column, key or ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

impl SortOrder {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parses `ASC` or `DESC` (case-insensitive).
    #[must_use]
    pub fn from_sql(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Resolution policy applied when a constraint is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictAction {
    /// `ROLLBACK`
    Rollback,
    /// `ABORT`
    Abort,
    /// `FAIL`
    Fail,
    /// `IGNORE`
    Ignore,
    /// `REPLACE`
    Replace,
}

impl ConflictAction {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Rollback => "ROLLBACK",
            Self::Abort => "ABORT",
            Self::Fail => "FAIL",
            Self::Ignore => "IGNORE",
            Self::Replace => "REPLACE",
        }
    }

    /// Parses a conflict action keyword (case-insensitive).
    #[must_use]
    pub fn from_sql(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ROLLBACK" => Some(Self::Rollback),
            "ABORT" => Some(Self::Abort),
            "FAIL" => Some(Self::Fail),
            "IGNORE" => Some(Self::Ignore),
            "REPLACE" => Some(Self::Replace),
            _ => None,
        }
    }

    /// Renders the `ON CONFLICT` suffix, with a leading space.
    pub(crate) fn suffix(action: Option<Self>) -> String {
        action.map_or_else(String::new, |a| format!(" ON CONFLICT {}", a.as_sql()))
    }
}

/// Foreign key referential action for `ON DELETE` / `ON UPDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    /// `SET NULL`
    SetNull,
    /// `SET DEFAULT`
    SetDefault,
    /// `CASCADE`
    Cascade,
    /// `RESTRICT`
    Restrict,
    /// `NO ACTION`
    NoAction,
}

impl RowAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
        }
    }

    /// Parses an action whose words are separated by single spaces.
    #[must_use]
    pub fn from_sql(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SET NULL" => Some(Self::SetNull),
            "SET DEFAULT" => Some(Self::SetDefault),
            "CASCADE" => Some(Self::Cascade),
            "RESTRICT" => Some(Self::Restrict),
            "NO ACTION" => Some(Self::NoAction),
            _ => None,
        }
    }
}

/// Initial checking mode of a deferrable foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeferrableAction {
    /// No `INITIALLY` clause.
    #[default]
    Unspecified,
    /// `INITIALLY DEFERRED`
    InitiallyDeferred,
    /// `INITIALLY IMMEDIATE`
    InitiallyImmediate,
}

impl DeferrableAction {
    /// Returns the SQL suffix, empty for [`DeferrableAction::Unspecified`].
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::InitiallyDeferred => "INITIALLY DEFERRED",
            Self::InitiallyImmediate => "INITIALLY IMMEDIATE",
        }
    }

    /// Parses the text following `DEFERRABLE` / `NOT DEFERRABLE`.
    #[must_use]
    pub fn from_sql(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "" => Some(Self::Unspecified),
            "INITIALLY DEFERRED" => Some(Self::InitiallyDeferred),
            "INITIALLY IMMEDIATE" => Some(Self::InitiallyImmediate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_storage_keywords() {
        assert_eq!(StorageType::infer("INTEGER"), StorageType::Integer);
        assert_eq!(StorageType::infer("blob"), StorageType::Blob);
        assert_eq!(StorageType::infer("Null"), StorageType::Null);
    }

    #[test]
    fn test_infer_rust_types() {
        assert_eq!(StorageType::infer("i64"), StorageType::Integer);
        assert_eq!(StorageType::infer("bool"), StorageType::Integer);
        assert_eq!(StorageType::infer("f64"), StorageType::Real);
        assert_eq!(StorageType::infer("String"), StorageType::Text);
        assert_eq!(StorageType::infer("Vec<u8>"), StorageType::Blob);
        assert_eq!(StorageType::infer("[u8; 32]"), StorageType::Blob);
        assert_eq!(StorageType::infer("Option < i32 >"), StorageType::Integer);
        assert_eq!(StorageType::infer("Option<Box<f32>>"), StorageType::Real);
        assert_eq!(StorageType::infer("&'static str"), StorageType::Text);
    }

    #[test]
    fn test_infer_unknown_defaults_to_text() {
        assert_eq!(StorageType::infer("chrono::DateTime<Utc>"), StorageType::Text);
        assert_eq!(StorageType::infer("Uuid"), StorageType::Text);
    }

    #[test]
    fn test_conflict_action_parse() {
        assert_eq!(ConflictAction::from_sql("replace"), Some(ConflictAction::Replace));
        assert_eq!(ConflictAction::from_sql("DELETE"), None);
        assert_eq!(ConflictAction::suffix(Some(ConflictAction::Fail)), " ON CONFLICT FAIL");
        assert_eq!(ConflictAction::suffix(None), "");
    }

    #[test]
    fn test_row_action_parse() {
        assert_eq!(RowAction::from_sql("SET NULL"), Some(RowAction::SetNull));
        assert_eq!(RowAction::from_sql("no action"), Some(RowAction::NoAction));
        assert_eq!(RowAction::from_sql("DROP"), None);
    }

    #[test]
    fn test_deferrable_action_parse() {
        assert_eq!(DeferrableAction::from_sql(""), Some(DeferrableAction::Unspecified));
        assert_eq!(
            DeferrableAction::from_sql("INITIALLY DEFERRED"),
            Some(DeferrableAction::InitiallyDeferred)
        );
        assert_eq!(DeferrableAction::from_sql("LATER"), None);
    }
}
