//! # sqltag-core
//!
//! Annotation-driven SQLite schema compiler and SQL statement builder.
//!
//! This crate provides:
//! - A parser for per-field constraint annotations such as
//!   `"PRIMARY KEY AUTOINCREMENT"` or `"REFERENCES Category (Id) ON DELETE CASCADE"`
//! - Typed clause builders enforcing the column invariants (GENERATED excludes
//!   PRIMARY KEY, UNIQUE, DEFAULT and REFERENCES; AUTOINCREMENT needs an
//!   INTEGER primary key)
//! - Foreign-key resolution against a set of candidate models
//! - Builders for `CREATE TABLE`, `CREATE INDEX`, `PRAGMA` and `SELECT`
//! - A [`Schema`] aggregating everything into one build script
//!
//! ## Tables from models
//!
//! Models describe their fields as `(name, declared type, annotation)`. The
//! `sqltag-derive` crate generates the descriptor from a struct; it can also
//! be built by hand:
//!
//! ```rust
//! use sqltag_core::{ModelDescriptor, Table};
//!
//! let model = ModelDescriptor::new("T")
//!     .field("Id", "i64", "PRIMARY KEY AUTOINCREMENT")
//!     .field("Name", "String", "NOT NULL");
//! let table = Table::new(&model, &[]).unwrap();
//! assert_eq!(
//!     table.build().unwrap(),
//!     "CREATE TABLE t (\n\tid INTEGER PRIMARY KEY AUTOINCREMENT,\n\tname TEXT NOT NULL\n);\n"
//! );
//! ```
//!
//! ## Errors
//!
//! Invalid annotations are reported as [`SchemaError`] values naming the
//! model and field:
//!
//! ```rust
//! use sqltag_core::{ModelDescriptor, SchemaError, Table};
//!
//! let model = ModelDescriptor::new("Product")
//!     .field("CategoryId", "i64", "REFERENCES Category (Id)");
//! let err = Table::new(&model, &[]).unwrap_err();
//! assert!(matches!(err.root(), SchemaError::UnresolvedReference { .. }));
//! ```
//!
//! ## Queries
//!
//! ```rust
//! use sqltag_core::expr::col;
//! use sqltag_core::select::Select;
//!
//! let sql = Select::new()
//!     .columns(&["id", "name"])
//!     .from("Product")
//!     .where_clause(col("price").gt(10))
//!     .build();
//! assert_eq!(sql, "SELECT id, name FROM product WHERE price > 10");
//! ```

pub mod annotation;
pub mod clause;
pub mod column;
pub mod error;
pub mod expr;
pub mod foreign_key;
pub mod index;
pub mod model;
pub mod naming;
pub mod pragma;
pub mod schema;
pub mod select;
pub mod table;
pub mod types;
pub mod with;

pub use column::Column;
pub use error::{Result, SchemaError};
pub use expr::{col, lit, Expression};
pub use foreign_key::ForeignKey;
pub use index::Index;
pub use model::{FieldDescriptor, Model, ModelDescriptor};
pub use pragma::Pragma;
pub use schema::Schema;
pub use select::{Join, JoinKind, Select};
pub use table::Table;
pub use types::{ConflictAction, DeferrableAction, RowAction, SortOrder, StorageType};
pub use with::{CommonTableExpression, With};
