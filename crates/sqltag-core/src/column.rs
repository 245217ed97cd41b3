//! Column definitions.
//!
//! A [`Column`] collects rendered constraint fragments in the order they
//! were added and tracks which constraint kinds it already carries, so that
//! incompatible combinations are rejected as soon as they are added.

use tracing::debug;

use crate::annotation::{parse_annotation, AnnotatedConstraint, ConstraintSpec};
use crate::clause::{
    collate_sql, named, not_null_sql, unique_sql, Check, ColumnPrimaryKey, DefaultValue, Generated,
};
use crate::error::{Result, SchemaError};
use crate::foreign_key::ForeignKey;
use crate::model::{FieldDescriptor, ModelDescriptor};
use crate::naming::to_snake_case;
use crate::types::{ConflictAction, StorageType};

const PRIMARY_KEY: &str = "PRIMARY KEY";
const UNIQUE: &str = "UNIQUE";
const DEFAULT: &str = "DEFAULT";
const COLLATE: &str = "COLLATE";
const FOREIGN_KEY: &str = "FOREIGN KEY";
const GENERATED: &str = "GENERATED";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
struct Flags {
    primary_key: bool,
    not_null: bool,
    unique: bool,
    default: bool,
    check: bool,
    collate: bool,
    foreign_key: bool,
    generated: bool,
    autoincrement: bool,
}

/// A column definition: name, storage class and constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    storage: StorageType,
    constraints: Vec<String>,
    flags: Flags,
}

impl Column {
    /// Creates an unconstrained column. The name is identifier-cased.
    #[must_use]
    pub fn new(name: &str, storage: StorageType) -> Self {
        Self {
            name: to_snake_case(name),
            storage,
            constraints: Vec::new(),
            flags: Flags::default(),
        }
    }

    /// Builds the column for one model field.
    ///
    /// Returns `Ok(None)` when the field's annotation is empty or `-`.
    /// `candidates` are the models a REFERENCES clause may name.
    ///
    /// # Errors
    ///
    /// Returns the first parse or invariant error of the annotation.
    pub fn from_field(
        field: &FieldDescriptor,
        candidates: &[ModelDescriptor],
    ) -> Result<Option<Self>> {
        if !field.is_mapped() {
            debug!(field = %field.name, "field has no column");
            return Ok(None);
        }
        let mut column = Self::new(&field.name, StorageType::infer(&field.declared_type));
        let name = column.name.clone();
        for constraint in parse_annotation(&name, &field.annotation)? {
            column.apply(constraint, &name, candidates)?;
        }
        debug!(
            column = %column.name,
            storage = %column.storage,
            constraints = column.constraints.len(),
            "parsed column"
        );
        Ok(Some(column))
    }

    /// Applies one parsed annotation constraint.
    ///
    /// # Errors
    ///
    /// Returns the invariant error of the matching builder method, or the
    /// foreign key error of a REFERENCES clause.
    pub fn apply(
        &mut self,
        constraint: AnnotatedConstraint,
        field: &str,
        candidates: &[ModelDescriptor],
    ) -> Result<&mut Self> {
        let name = constraint.name.as_deref();
        match constraint.spec {
            ConstraintSpec::PrimaryKey(key) => self.primary_key(name, &key),
            ConstraintSpec::NotNull(conflict) => Ok(self.not_null(name, conflict)),
            ConstraintSpec::Unique(conflict) => self.unique(name, conflict),
            ConstraintSpec::Check(check) => Ok(self.check(name, &check)),
            ConstraintSpec::Default(value) => self.default(name, &value),
            ConstraintSpec::Collate(collation) => self.collate(name, &collation),
            ConstraintSpec::References(clause) => {
                let fk = ForeignKey::parse(field, &clause, candidates)?;
                self.references(name, &fk)
            }
            ConstraintSpec::Generated(generated) => self.generated(name, &generated),
        }
    }

    fn incompatible(&self, constraint: &'static str, existing: &'static str) -> SchemaError {
        SchemaError::Incompatible {
            column: self.name.clone(),
            constraint,
            existing,
        }
    }

    fn duplicate(&self, constraint: &'static str) -> SchemaError {
        SchemaError::DuplicateConstraint {
            column: self.name.clone(),
            constraint,
        }
    }

    fn push(&mut self, name: Option<&str>, fragment: &str) -> &mut Self {
        self.constraints.push(named(name, fragment));
        self
    }

    /// Adds a `PRIMARY KEY` clause.
    ///
    /// # Errors
    ///
    /// Fails if the column already has a primary key, a DEFAULT or a
    /// GENERATED clause, or if AUTOINCREMENT is requested on a non-INTEGER
    /// column.
    pub fn primary_key(&mut self, name: Option<&str>, key: &ColumnPrimaryKey) -> Result<&mut Self> {
        if self.flags.primary_key {
            return Err(self.duplicate(PRIMARY_KEY));
        }
        if self.flags.generated {
            return Err(self.incompatible(PRIMARY_KEY, GENERATED));
        }
        if self.flags.default {
            return Err(self.incompatible(PRIMARY_KEY, DEFAULT));
        }
        if key.is_autoincrement() && self.storage != StorageType::Integer {
            return Err(SchemaError::AutoincrementRequiresIntegerKey {
                column: self.name.clone(),
                storage: self.storage.to_string(),
            });
        }
        self.flags.primary_key = true;
        self.flags.autoincrement = key.is_autoincrement();
        Ok(self.push(name, &key.to_sql()))
    }

    /// Adds a `NOT NULL` clause.
    pub fn not_null(&mut self, name: Option<&str>, conflict: Option<ConflictAction>) -> &mut Self {
        self.flags.not_null = true;
        self.push(name, &not_null_sql(conflict))
    }

    /// Adds a `UNIQUE` clause.
    ///
    /// # Errors
    ///
    /// Fails on a generated column.
    pub fn unique(
        &mut self,
        name: Option<&str>,
        conflict: Option<ConflictAction>,
    ) -> Result<&mut Self> {
        if self.flags.generated {
            return Err(self.incompatible(UNIQUE, GENERATED));
        }
        self.flags.unique = true;
        Ok(self.push(name, &unique_sql(conflict)))
    }

    /// Adds a `CHECK` clause.
    pub fn check(&mut self, name: Option<&str>, check: &Check) -> &mut Self {
        self.flags.check = true;
        self.push(name, &check.to_sql())
    }

    /// Adds a `DEFAULT` clause.
    ///
    /// # Errors
    ///
    /// Fails on a generated or primary key column, or if a default is
    /// already set.
    pub fn default(&mut self, name: Option<&str>, value: &DefaultValue) -> Result<&mut Self> {
        if self.flags.generated {
            return Err(self.incompatible(DEFAULT, GENERATED));
        }
        if self.flags.primary_key {
            return Err(self.incompatible(DEFAULT, PRIMARY_KEY));
        }
        if self.flags.default {
            return Err(self.duplicate(DEFAULT));
        }
        self.flags.default = true;
        Ok(self.push(name, &value.to_sql()))
    }

    /// Adds a `COLLATE` clause.
    ///
    /// # Errors
    ///
    /// Fails if a collation is already set.
    pub fn collate(&mut self, name: Option<&str>, collation: &str) -> Result<&mut Self> {
        if self.flags.collate {
            return Err(self.duplicate(COLLATE));
        }
        self.flags.collate = true;
        Ok(self.push(name, &collate_sql(collation)))
    }

    /// Adds a column-level `REFERENCES` clause.
    ///
    /// # Errors
    ///
    /// Fails on a generated column, or if a referenced column does not exist
    /// on the target.
    pub fn references(&mut self, name: Option<&str>, fk: &ForeignKey) -> Result<&mut Self> {
        if self.flags.generated {
            return Err(self.incompatible(FOREIGN_KEY, GENERATED));
        }
        let sql = fk.build()?;
        self.flags.foreign_key = true;
        Ok(self.push(name, &sql))
    }

    /// Adds a generated column clause.
    ///
    /// # Errors
    ///
    /// Fails if the column already has a PRIMARY KEY, UNIQUE, DEFAULT,
    /// REFERENCES or another generated clause.
    pub fn generated(&mut self, name: Option<&str>, generated: &Generated) -> Result<&mut Self> {
        if self.flags.generated {
            return Err(self.duplicate(GENERATED));
        }
        let conflicting = [
            (self.flags.primary_key, PRIMARY_KEY),
            (self.flags.unique, UNIQUE),
            (self.flags.default, DEFAULT),
            (self.flags.foreign_key, FOREIGN_KEY),
        ];
        if let Some((_, existing)) = conflicting.into_iter().find(|(set, _)| *set) {
            return Err(self.incompatible(GENERATED, existing));
        }
        self.flags.generated = true;
        Ok(self.push(name, &generated.to_sql()))
    }

    /// Returns the column's SQL identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the storage class.
    #[must_use]
    pub const fn storage(&self) -> StorageType {
        self.storage
    }

    /// Returns the rendered constraint fragments in order.
    #[must_use]
    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }

    /// Returns true if the column is its table's primary key.
    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.flags.primary_key
    }

    /// Returns true if the column has a NOT NULL clause.
    #[must_use]
    pub const fn is_not_null(&self) -> bool {
        self.flags.not_null
    }

    /// Returns true if the column has a column-level UNIQUE clause.
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.flags.unique
    }

    /// Returns true if the key is `AUTOINCREMENT`.
    #[must_use]
    pub const fn is_autoincrement(&self) -> bool {
        self.flags.autoincrement
    }

    /// Returns true if the column has at least one CHECK clause.
    #[must_use]
    pub const fn has_check(&self) -> bool {
        self.flags.check
    }

    /// Returns true if the column is generated.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.flags.generated
    }

    /// Renders the column definition.
    #[must_use]
    pub fn build(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.storage.as_sql());
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(constraint);
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SortOrder;

    fn field(name: &str, ty: &str, annotation: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, ty, annotation)
    }

    fn build(name: &str, ty: &str, annotation: &str) -> Result<String> {
        Column::from_field(&field(name, ty, annotation), &[])
            .map(|c| c.map(|c| c.build()).unwrap_or_default())
    }

    #[test]
    fn test_unmapped_field() {
        assert!(Column::from_field(&field("Cache", "String", "-"), &[])
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_errors_name_the_sql_column() {
        assert!(matches!(
            build("ParentId", "i64", "CHECK (ParentId > 0").unwrap_err(),
            SchemaError::Syntax { column, .. } if column == "parent_id"
        ));
        assert!(matches!(
            build("ParentId", "i64", "REFERENCES Category (Id)").unwrap_err(),
            SchemaError::UnresolvedReference { column, .. } if column == "parent_id"
        ));
        assert!(matches!(
            build("ParentId", "i64", "PRIMARY KEY PRIMARY KEY").unwrap_err(),
            SchemaError::DuplicateConstraint { column, .. } if column == "parent_id"
        ));
    }

    #[test]
    fn test_autoincrement_key() {
        assert_eq!(
            build("Id", "i64", "PRIMARY KEY AUTOINCREMENT").unwrap(),
            "id INTEGER PRIMARY KEY AUTOINCREMENT"
        );
        assert_eq!(
            build("Id", "INTEGER", "PRIMARY KEY ASC ON CONFLICT ABORT AUTOINCREMENT").unwrap(),
            "id INTEGER PRIMARY KEY ASC ON CONFLICT ABORT AUTOINCREMENT"
        );
    }

    #[test]
    fn test_autoincrement_requires_integer() {
        let err = build("Code", "String", "PRIMARY KEY AUTOINCREMENT").unwrap_err();
        assert_eq!(
            err,
            SchemaError::AutoincrementRequiresIntegerKey {
                column: "code".into(),
                storage: "TEXT".into()
            }
        );
    }

    #[test]
    fn test_generated_and_default_conflict_both_ways() {
        let err = build("Total", "f64", "GENERATED ALWAYS AS (Price * Qty) DEFAULT 0").unwrap_err();
        assert_eq!(
            err,
            SchemaError::Incompatible {
                column: "total".into(),
                constraint: "DEFAULT",
                existing: "GENERATED"
            }
        );
        let err = build("Total", "f64", "DEFAULT 0 AS (Price * Qty)").unwrap_err();
        assert_eq!(
            err,
            SchemaError::Incompatible {
                column: "total".into(),
                constraint: "GENERATED",
                existing: "DEFAULT"
            }
        );
    }

    #[test]
    fn test_primary_key_rejects_default() {
        assert!(matches!(
            build("Id", "i64", "PRIMARY KEY DEFAULT 1").unwrap_err(),
            SchemaError::Incompatible {
                constraint: "DEFAULT",
                existing: "PRIMARY KEY",
                ..
            }
        ));
        assert!(matches!(
            build("Id", "i64", "DEFAULT 1 PRIMARY KEY").unwrap_err(),
            SchemaError::Incompatible {
                constraint: "PRIMARY KEY",
                existing: "DEFAULT",
                ..
            }
        ));
    }

    #[test]
    fn test_generated_rejects_key_and_unique() {
        assert!(build("X", "i64", "UNIQUE AS (1)").is_err());
        assert!(build("X", "i64", "AS (1) UNIQUE").is_err());
        assert!(build("X", "i64", "AS (1) PRIMARY KEY").is_err());
    }

    #[test]
    fn test_duplicates() {
        assert!(matches!(
            build("X", "i64", "PRIMARY KEY PRIMARY KEY").unwrap_err(),
            SchemaError::DuplicateConstraint {
                constraint: "PRIMARY KEY",
                ..
            }
        ));
        assert!(build("X", "String", "COLLATE NOCASE COLLATE BINARY").is_err());
        assert!(build("X", "i64", "DEFAULT 1 DEFAULT 2").is_err());
    }

    #[test]
    fn test_constraint_order_is_preserved() {
        assert_eq!(
            build(
                "Email",
                "String",
                "NOT NULL CONSTRAINT uq_email UNIQUE ON CONFLICT IGNORE COLLATE NOCASE CHECK(length(Email) > 3)"
            )
            .unwrap(),
            "email TEXT NOT NULL CONSTRAINT uq_email UNIQUE ON CONFLICT IGNORE COLLATE NOCASE CHECK (length(Email) > 3)"
        );
    }

    #[test]
    fn test_default_rendering() {
        assert_eq!(
            build("Status", "String", "NOT NULL DEFAULT 'draft'").unwrap(),
            "status TEXT NOT NULL DEFAULT 'draft'"
        );
        assert_eq!(
            build("CreatedAt", "String", "DEFAULT CURRENT_TIMESTAMP").unwrap(),
            "created_at TEXT DEFAULT CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_references_resolved_against_candidates() {
        let category = ModelDescriptor::new("Category").field("Id", "i64", "PRIMARY KEY");
        let column = Column::from_field(
            &field("CategoryId", "Option<i64>", "REFERENCES Category (Id) ON DELETE SET NULL"),
            &[category],
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            column.build(),
            "category_id INTEGER REFERENCES category (id) ON DELETE SET NULL"
        );
    }

    #[test]
    fn test_references_unresolved() {
        let err = build("CategoryId", "i64", "REFERENCES Category (Id)").unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_builder_methods() {
        let mut column = Column::new("Rank", StorageType::Integer);
        column
            .primary_key(None, &ColumnPrimaryKey::new().order(SortOrder::Desc))
            .unwrap()
            .not_null(Some("nn_rank"), None);
        assert!(column.is_primary_key());
        assert!(column.is_not_null());
        assert_eq!(
            column.build(),
            "rank INTEGER PRIMARY KEY DESC CONSTRAINT nn_rank NOT NULL"
        );
    }
}
