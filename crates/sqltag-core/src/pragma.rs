//! PRAGMA statements.
//!
//! A pragma either assigns a value (`PRAGMA name = value;`), calls with an
//! argument (`PRAGMA name(arg);`) or just reads (`PRAGMA name;`). The
//! commonly used pragmas have typed constructors.
//!
//! ```rust
//! use sqltag_core::pragma::{JournalMode, Pragma};
//!
//! assert_eq!(Pragma::foreign_keys(true).build(), "PRAGMA foreign_keys = ON;");
//! assert_eq!(
//!     Pragma::journal_mode(JournalMode::Wal).in_schema("main").build(),
//!     "PRAGMA main.journal_mode = WAL;"
//! );
//! assert_eq!(Pragma::table_info("OrderLine").build(), "PRAGMA table_info(order_line);");
//! ```

use std::fmt;

use crate::naming::to_snake_case;

/// What follows the pragma name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PragmaArgument {
    /// Nothing: the pragma is queried or run as is.
    #[default]
    None,
    /// `= value`
    Value(String),
    /// `(argument)`
    Call(String),
}

/// A PRAGMA statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pragma {
    schema: Option<String>,
    name: String,
    argument: PragmaArgument,
}

macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $sql:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $(
                #[doc = concat!("`", $sql, "`")]
                $variant,
            )+
        }

        impl $name {
            /// Returns the SQL keyword.
            #[must_use]
            pub const fn as_sql(self) -> &'static str {
                match self {
                    $(Self::$variant => $sql,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_sql())
            }
        }
    };
}

keyword_enum!(
    /// Values of `journal_mode`.
    JournalMode {
        Delete => "DELETE",
        Truncate => "TRUNCATE",
        Persist => "PERSIST",
        Memory => "MEMORY",
        Wal => "WAL",
        Off => "OFF",
    }
);

keyword_enum!(
    /// Values of `synchronous`.
    Synchronous {
        Off => "OFF",
        Normal => "NORMAL",
        Full => "FULL",
        Extra => "EXTRA",
    }
);

keyword_enum!(
    /// Values of `encoding`.
    Encoding {
        Utf8 => "'UTF-8'",
        Utf16 => "'UTF-16'",
        Utf16le => "'UTF-16le'",
        Utf16be => "'UTF-16be'",
    }
);

keyword_enum!(
    /// Values of `auto_vacuum`.
    AutoVacuum {
        None => "NONE",
        Full => "FULL",
        Incremental => "INCREMENTAL",
    }
);

keyword_enum!(
    /// Values of `temp_store`.
    TempStore {
        Default => "DEFAULT",
        File => "FILE",
        Memory => "MEMORY",
    }
);

keyword_enum!(
    /// Values of `locking_mode`.
    LockingMode {
        Normal => "NORMAL",
        Exclusive => "EXCLUSIVE",
    }
);

keyword_enum!(
    /// Modes of `wal_checkpoint`.
    WalCheckpoint {
        Passive => "PASSIVE",
        Full => "FULL",
        Restart => "RESTART",
        Truncate => "TRUNCATE",
    }
);

const fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "ON"
    } else {
        "OFF"
    }
}

impl Pragma {
    /// Creates a bare `PRAGMA name;`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            argument: PragmaArgument::None,
        }
    }

    /// Qualifies the pragma with a schema name.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Assigns a value, replacing any call argument.
    #[must_use]
    pub fn value(mut self, value: impl fmt::Display) -> Self {
        self.argument = PragmaArgument::Value(value.to_string());
        self
    }

    /// Sets a call argument, replacing any assigned value.
    #[must_use]
    pub fn argument(mut self, argument: impl fmt::Display) -> Self {
        self.argument = PragmaArgument::Call(argument.to_string());
        self
    }

    /// Returns the pragma name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `PRAGMA foreign_keys = ON|OFF;`
    #[must_use]
    pub fn foreign_keys(enabled: bool) -> Self {
        Self::new("foreign_keys").value(on_off(enabled))
    }

    /// `PRAGMA journal_mode = mode;`
    #[must_use]
    pub fn journal_mode(mode: JournalMode) -> Self {
        Self::new("journal_mode").value(mode)
    }

    /// `PRAGMA synchronous = level;`
    #[must_use]
    pub fn synchronous(level: Synchronous) -> Self {
        Self::new("synchronous").value(level)
    }

    /// `PRAGMA encoding = 'enc';`
    #[must_use]
    pub fn encoding(encoding: Encoding) -> Self {
        Self::new("encoding").value(encoding)
    }

    /// `PRAGMA auto_vacuum = mode;`
    #[must_use]
    pub fn auto_vacuum(mode: AutoVacuum) -> Self {
        Self::new("auto_vacuum").value(mode)
    }

    /// `PRAGMA temp_store = store;`
    #[must_use]
    pub fn temp_store(store: TempStore) -> Self {
        Self::new("temp_store").value(store)
    }

    /// `PRAGMA locking_mode = mode;`
    #[must_use]
    pub fn locking_mode(mode: LockingMode) -> Self {
        Self::new("locking_mode").value(mode)
    }

    /// `PRAGMA secure_delete = ON|OFF;`
    #[must_use]
    pub fn secure_delete(enabled: bool) -> Self {
        Self::new("secure_delete").value(on_off(enabled))
    }

    /// `PRAGMA recursive_triggers = ON|OFF;`
    #[must_use]
    pub fn recursive_triggers(enabled: bool) -> Self {
        Self::new("recursive_triggers").value(on_off(enabled))
    }

    /// `PRAGMA defer_foreign_keys = ON|OFF;`
    #[must_use]
    pub fn defer_foreign_keys(enabled: bool) -> Self {
        Self::new("defer_foreign_keys").value(on_off(enabled))
    }

    /// `PRAGMA user_version = n;`
    #[must_use]
    pub fn user_version(version: i64) -> Self {
        Self::new("user_version").value(version)
    }

    /// `PRAGMA application_id = n;`
    #[must_use]
    pub fn application_id(id: i32) -> Self {
        Self::new("application_id").value(id)
    }

    /// `PRAGMA busy_timeout = ms;`
    #[must_use]
    pub fn busy_timeout(millis: u32) -> Self {
        Self::new("busy_timeout").value(millis)
    }

    /// `PRAGMA cache_size = n;` (negative values are KiB).
    #[must_use]
    pub fn cache_size(size: i64) -> Self {
        Self::new("cache_size").value(size)
    }

    /// `PRAGMA page_size = bytes;`
    #[must_use]
    pub fn page_size(bytes: u32) -> Self {
        Self::new("page_size").value(bytes)
    }

    /// `PRAGMA integrity_check;`
    #[must_use]
    pub fn integrity_check() -> Self {
        Self::new("integrity_check")
    }

    /// `PRAGMA quick_check;`
    #[must_use]
    pub fn quick_check() -> Self {
        Self::new("quick_check")
    }

    /// `PRAGMA optimize;`
    #[must_use]
    pub fn optimize() -> Self {
        Self::new("optimize")
    }

    /// `PRAGMA table_info(table);`
    #[must_use]
    pub fn table_info(table: &str) -> Self {
        Self::new("table_info").argument(to_snake_case(table))
    }

    /// `PRAGMA index_list(table);`
    #[must_use]
    pub fn index_list(table: &str) -> Self {
        Self::new("index_list").argument(to_snake_case(table))
    }

    /// `PRAGMA foreign_key_check[(table)];`
    #[must_use]
    pub fn foreign_key_check(table: Option<&str>) -> Self {
        let pragma = Self::new("foreign_key_check");
        match table {
            Some(table) => pragma.argument(to_snake_case(table)),
            None => pragma,
        }
    }

    /// `PRAGMA wal_checkpoint[(mode)];`
    #[must_use]
    pub fn wal_checkpoint(mode: Option<WalCheckpoint>) -> Self {
        let pragma = Self::new("wal_checkpoint");
        match mode {
            Some(mode) => pragma.argument(mode),
            None => pragma,
        }
    }

    /// Renders `PRAGMA [schema.]name[ = value | (argument)];`.
    #[must_use]
    pub fn build(&self) -> String {
        let mut sql = String::from("PRAGMA ");
        if let Some(schema) = &self.schema {
            sql.push_str(schema);
            sql.push('.');
        }
        sql.push_str(&self.name);
        match &self.argument {
            PragmaArgument::None => {}
            PragmaArgument::Value(value) => {
                sql.push_str(" = ");
                sql.push_str(value);
            }
            PragmaArgument::Call(argument) => {
                sql.push('(');
                sql.push_str(argument);
                sql.push(')');
            }
        }
        sql.push(';');
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_pragma() {
        assert_eq!(Pragma::integrity_check().build(), "PRAGMA integrity_check;");
        assert_eq!(Pragma::optimize().in_schema("aux").build(), "PRAGMA aux.optimize;");
    }

    #[test]
    fn test_value_pragmas() {
        assert_eq!(
            Pragma::synchronous(Synchronous::Normal).build(),
            "PRAGMA synchronous = NORMAL;"
        );
        assert_eq!(Pragma::encoding(Encoding::Utf8).build(), "PRAGMA encoding = 'UTF-8';");
        assert_eq!(Pragma::cache_size(-2000).build(), "PRAGMA cache_size = -2000;");
        assert_eq!(Pragma::user_version(3).build(), "PRAGMA user_version = 3;");
    }

    #[test]
    fn test_value_and_argument_are_exclusive() {
        assert_eq!(
            Pragma::new("busy_timeout").argument(5).value(1000).build(),
            "PRAGMA busy_timeout = 1000;"
        );
        assert_eq!(
            Pragma::new("wal_checkpoint").value(1).argument("FULL").build(),
            "PRAGMA wal_checkpoint(FULL);"
        );
    }

    #[test]
    fn test_argument_pragmas() {
        assert_eq!(
            Pragma::foreign_key_check(Some("Product")).build(),
            "PRAGMA foreign_key_check(product);"
        );
        assert_eq!(
            Pragma::wal_checkpoint(Some(WalCheckpoint::Truncate)).build(),
            "PRAGMA wal_checkpoint(TRUNCATE);"
        );
        assert_eq!(Pragma::foreign_key_check(None).build(), "PRAGMA foreign_key_check;");
    }
}
