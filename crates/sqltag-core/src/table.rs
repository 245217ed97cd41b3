//! CREATE TABLE statements.
//!
//! A [`Table`] is built from a model descriptor: every mapped field is
//! parsed into a [`Column`] up front, so annotation errors surface from
//! [`Table::new`] with the offending field attached. Table-level
//! constraints are added with the builder methods and checked against the
//! model when the table is rendered.

use tracing::debug;

use crate::clause::{named, Check, IndexedColumn, TablePrimaryKey, TableUnique};
use crate::column::Column;
use crate::error::{Result, SchemaError};
use crate::foreign_key::ForeignKey;
use crate::model::{Model, ModelDescriptor};
use crate::select::Select;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableConstraint {
    PrimaryKey(TablePrimaryKey),
    Unique(TableUnique),
    Check(Check),
    ForeignKey(ForeignKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NamedConstraint {
    name: Option<String>,
    constraint: TableConstraint,
}

/// A `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Table {
    model: ModelDescriptor,
    schema: Option<String>,
    temporary: bool,
    if_not_exists: bool,
    without_rowid: bool,
    strict: bool,
    columns: Vec<Column>,
    constraints: Vec<NamedConstraint>,
    select: Option<Select>,
}

impl Table {
    /// Builds the table for `model`.
    ///
    /// `references` are the models REFERENCES clauses may name; the model
    /// itself is always a candidate, so self references resolve.
    ///
    /// # Errors
    ///
    /// Returns the first field error, wrapped in [`SchemaError::Field`].
    pub fn new(model: &ModelDescriptor, references: &[ModelDescriptor]) -> Result<Self> {
        let mut candidates = references.to_vec();
        candidates.push(model.clone());

        let mut columns = Vec::with_capacity(model.fields.len());
        for field in &model.fields {
            if let Some(column) = Column::from_field(field, &candidates)
                .map_err(|e| e.in_field(&model.name, &field.name))?
            {
                columns.push(column);
            }
        }
        debug!(
            model = %model.name,
            columns = columns.len(),
            "parsed model"
        );
        Ok(Self {
            model: model.clone(),
            schema: None,
            temporary: false,
            if_not_exists: false,
            without_rowid: false,
            strict: false,
            columns,
            constraints: Vec::new(),
            select: None,
        })
    }

    /// Builds the table of a [`Model`] that references no other model.
    ///
    /// # Errors
    ///
    /// See [`Table::new`].
    pub fn from_model<M: Model>() -> Result<Self> {
        Self::new(&M::descriptor(), &[])
    }

    /// Builds the table of a [`Model`] whose REFERENCES clauses may name
    /// any of `references`.
    ///
    /// # Errors
    ///
    /// See [`Table::new`].
    pub fn with_references<M: Model>(references: &[ModelDescriptor]) -> Result<Self> {
        Self::new(&M::descriptor(), references)
    }

    /// Creates a `TEMP` table.
    #[must_use]
    pub const fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    /// Adds `IF NOT EXISTS`.
    #[must_use]
    pub const fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Qualifies the table with a schema name.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Adds `WITHOUT ROWID`.
    #[must_use]
    pub const fn without_rowid(mut self) -> Self {
        self.without_rowid = true;
        self
    }

    /// Adds `STRICT`.
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Creates the table from a query (`CREATE TABLE name AS select`)
    /// instead of the column list.
    #[must_use]
    pub fn as_select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    fn constraint(mut self, name: Option<&str>, constraint: TableConstraint) -> Self {
        self.constraints.push(NamedConstraint {
            name: name.map(str::to_string),
            constraint,
        });
        self
    }

    /// Adds a table-level `PRIMARY KEY`.
    #[must_use]
    pub fn primary_key(self, name: Option<&str>, key: TablePrimaryKey) -> Self {
        self.constraint(name, TableConstraint::PrimaryKey(key))
    }

    /// Adds a table-level `UNIQUE`.
    #[must_use]
    pub fn unique(self, name: Option<&str>, unique: TableUnique) -> Self {
        self.constraint(name, TableConstraint::Unique(unique))
    }

    /// Adds a table-level `CHECK`.
    #[must_use]
    pub fn check(self, name: Option<&str>, check: Check) -> Self {
        self.constraint(name, TableConstraint::Check(check))
    }

    /// Adds a table-level `FOREIGN KEY`.
    #[must_use]
    pub fn foreign_key(self, name: Option<&str>, fk: ForeignKey) -> Self {
        self.constraint(name, TableConstraint::ForeignKey(fk))
    }

    /// Returns the table's SQL identifier.
    #[must_use]
    pub fn name(&self) -> String {
        self.model.table_name()
    }

    /// Returns the model the table was built from.
    #[must_use]
    pub const fn model(&self) -> &ModelDescriptor {
        &self.model
    }

    /// Returns the parsed columns in field order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by SQL identifier.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    fn require_column(&self, column: &str) -> Result<()> {
        if self.model.maps_column(column) {
            Ok(())
        } else {
            Err(SchemaError::UnknownColumn {
                model: self.model.name.clone(),
                column: column.to_string(),
            })
        }
    }

    /// Checks that the table has at least one definition, that table-level
    /// constraints only name mapped fields and that foreign keys reference
    /// existing target columns.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyTable`], [`SchemaError::UnknownColumn`]
    /// or [`SchemaError::UnknownTargetColumn`].
    pub fn validate(&self) -> Result<()> {
        if self.select.is_none() && self.columns.is_empty() && self.constraints.is_empty() {
            return Err(SchemaError::EmptyTable {
                model: self.model.name.clone(),
            });
        }
        for entry in &self.constraints {
            match &entry.constraint {
                TableConstraint::PrimaryKey(key) => {
                    for column in key.columns().iter().filter_map(IndexedColumn::column_name) {
                        self.require_column(column)?;
                    }
                }
                TableConstraint::Unique(unique) => {
                    for column in unique.columns().iter().filter_map(IndexedColumn::column_name) {
                        self.require_column(column)?;
                    }
                }
                TableConstraint::ForeignKey(fk) => {
                    for column in fk.columns() {
                        self.require_column(column)?;
                    }
                    fk.validate()?;
                }
                TableConstraint::Check(_) => {}
            }
        }
        Ok(())
    }

    fn definitions(&self) -> Result<Vec<String>> {
        let mut items: Vec<String> = self.columns.iter().map(Column::build).collect();
        for entry in &self.constraints {
            let fragment = match &entry.constraint {
                TableConstraint::PrimaryKey(key) => key.to_sql(),
                TableConstraint::Unique(unique) => unique.to_sql(),
                TableConstraint::Check(check) => check.to_sql(),
                TableConstraint::ForeignKey(fk) => fk.build()?,
            };
            items.push(named(entry.name.as_deref(), &fragment));
        }
        Ok(items)
    }

    /// Renders the statement, terminated by `;` and a newline.
    ///
    /// # Errors
    ///
    /// See [`Table::validate`].
    pub fn build(&self) -> Result<String> {
        self.validate()?;

        let mut sql = String::from("CREATE ");
        if self.temporary {
            sql.push_str("TEMP ");
        }
        sql.push_str("TABLE ");
        if self.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        if let Some(schema) = &self.schema {
            sql.push_str(schema);
            sql.push('.');
        }
        sql.push_str(&self.name());

        if let Some(select) = &self.select {
            sql.push_str(" AS ");
            sql.push_str(&select.build());
        } else {
            sql.push_str(" (\n\t");
            sql.push_str(&self.definitions()?.join(",\n\t"));
            sql.push_str("\n)");
            if self.without_rowid {
                sql.push_str(" WITHOUT ROWID");
            }
            if self.strict {
                sql.push_str(if self.without_rowid { ", STRICT" } else { " STRICT" });
            }
        }
        sql.push_str(";\n");
        debug!(table = %self.name(), "built table");
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::col;
    use crate::types::RowAction;

    fn order_line() -> ModelDescriptor {
        ModelDescriptor::new("OrderLine")
            .field("OrderId", "i64", "NOT NULL")
            .field("LineNo", "i32", "NOT NULL")
            .field("Qty", "i32", "NOT NULL DEFAULT 1")
            .field("Cache", "String", "-")
    }

    #[test]
    fn test_golden_table() {
        let model = ModelDescriptor::new("T")
            .field("Id", "INTEGER", "PRIMARY KEY AUTOINCREMENT")
            .field("Name", "TEXT", "NOT NULL");
        assert_eq!(
            Table::new(&model, &[]).unwrap().build().unwrap(),
            "CREATE TABLE t (\n\tid INTEGER PRIMARY KEY AUTOINCREMENT,\n\tname TEXT NOT NULL\n);\n"
        );
    }

    #[test]
    fn test_table_constraints_follow_columns() {
        let table = Table::new(&order_line(), &[])
            .unwrap()
            .primary_key(None, TablePrimaryKey::new(["OrderId", "LineNo"]))
            .check(Some("qty_positive"), Check::new(col("qty").gt(0)));
        assert_eq!(
            table.build().unwrap(),
            "CREATE TABLE order_line (\n\
             \torder_id INTEGER NOT NULL,\n\
             \tline_no INTEGER NOT NULL,\n\
             \tqty INTEGER NOT NULL DEFAULT 1,\n\
             \tPRIMARY KEY (order_id, line_no),\n\
             \tCONSTRAINT qty_positive CHECK (qty > 0)\n\
             );\n"
        );
    }

    #[test]
    fn test_modifiers() {
        let table = Table::new(&order_line(), &[])
            .unwrap()
            .temporary()
            .if_not_exists()
            .schema("aux")
            .without_rowid()
            .strict();
        let sql = table.build().unwrap();
        assert!(sql.starts_with("CREATE TEMP TABLE IF NOT EXISTS aux.order_line (\n"));
        assert!(sql.ends_with("\n) WITHOUT ROWID, STRICT;\n"));
    }

    #[test]
    fn test_strict_alone() {
        let sql = Table::new(&order_line(), &[]).unwrap().strict().build().unwrap();
        assert!(sql.ends_with("\n) STRICT;\n"));
    }

    #[test]
    fn test_as_select() {
        let table = Table::new(&order_line(), &[])
            .unwrap()
            .as_select(Select::new().from("OrderLine").where_clause(col("qty").gt(10)));
        assert_eq!(
            table.build().unwrap(),
            "CREATE TABLE order_line AS SELECT * FROM order_line WHERE qty > 10;\n"
        );
    }

    #[test]
    fn test_table_without_definitions_fails() {
        let model = ModelDescriptor::new("Ghost").field("Cache", "String", "-");
        let table = Table::new(&model, &[]).unwrap();
        assert_eq!(
            table.build().unwrap_err(),
            SchemaError::EmptyTable {
                model: "Ghost".into()
            }
        );
    }

    #[test]
    fn test_constraint_on_unmapped_field_fails() {
        let table = Table::new(&order_line(), &[])
            .unwrap()
            .unique(None, TableUnique::new(["Cache"]));
        assert_eq!(
            table.build().unwrap_err(),
            SchemaError::UnknownColumn {
                model: "OrderLine".into(),
                column: "Cache".into()
            }
        );
    }

    #[test]
    fn test_unknown_constraint_column() {
        let table = Table::new(&order_line(), &[])
            .unwrap()
            .unique(None, TableUnique::new(["Sku"]));
        assert_eq!(
            table.build().unwrap_err(),
            SchemaError::UnknownColumn {
                model: "OrderLine".into(),
                column: "Sku".into()
            }
        );
    }

    #[test]
    fn test_table_level_foreign_key() {
        let order = ModelDescriptor::new("Order").field("Id", "i64", "PRIMARY KEY");
        let table = Table::new(&order_line(), &[order.clone()])
            .unwrap()
            .foreign_key(
                Some("fk_order"),
                ForeignKey::table(["OrderId"], &order)
                    .references(["Id"])
                    .unwrap()
                    .on_delete(RowAction::Cascade),
            );
        let sql = table.build().unwrap();
        assert!(sql.contains(
            "\tCONSTRAINT fk_order FOREIGN KEY (order_id) REFERENCES order (id) ON DELETE CASCADE\n"
        ));
    }

    #[test]
    fn test_field_errors_carry_context() {
        let model = ModelDescriptor::new("Product").field("Sku", "String", "PRIMARY KEY AUTOINCREMENT");
        let err = Table::new(&model, &[]).unwrap_err();
        assert!(matches!(&err, SchemaError::Field { model, field, .. } if model == "Product" && field == "Sku"));
        assert!(matches!(
            err.root(),
            SchemaError::AutoincrementRequiresIntegerKey { .. }
        ));
    }

    #[test]
    fn test_self_reference_resolves() {
        let employee = ModelDescriptor::new("Employee")
            .field("Id", "i64", "PRIMARY KEY")
            .field("ManagerId", "Option<i64>", "REFERENCES Employee (Id)");
        let table = Table::new(&employee, &[]).unwrap();
        assert_eq!(
            table.column("manager_id").unwrap().build(),
            "manager_id INTEGER REFERENCES employee (id)"
        );
    }
}
