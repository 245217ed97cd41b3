#![allow(dead_code)]

use sqltag_core::{ModelDescriptor, SchemaError, Table};

pub fn category() -> ModelDescriptor {
    ModelDescriptor::new("Category")
        .field("Id", "i64", "PRIMARY KEY AUTOINCREMENT")
        .field("Name", "String", "NOT NULL UNIQUE")
        .field("ParentId", "Option<i64>", "REFERENCES Category (Id) ON DELETE CASCADE")
}

pub fn product() -> ModelDescriptor {
    ModelDescriptor::new("Product")
        .field("Id", "i64", "PRIMARY KEY AUTOINCREMENT")
        .field("Name", "String", "NOT NULL COLLATE NOCASE")
        .field("Sku", "String", "CONSTRAINT uq_sku UNIQUE ON CONFLICT REPLACE")
        .field("Price", "f64", "NOT NULL DEFAULT 0 CHECK(Price >= 0)")
        .field(
            "CategoryId",
            "Option<i64>",
            "REFERENCES Category (Id) ON DELETE SET NULL ON UPDATE CASCADE",
        )
        .field("PriceWithTax", "f64", "GENERATED ALWAYS AS (Price * 1.2) STORED")
        .field("Cache", "String", "-")
}

pub fn order_line() -> ModelDescriptor {
    ModelDescriptor::new("OrderLine")
        .field("PurchaseId", "i64", "NOT NULL")
        .field("LineNo", "i32", "NOT NULL")
        .field("ProductId", "i64", "NOT NULL REFERENCES Product (Id)")
        .field("Qty", "i32", "NOT NULL DEFAULT 1 CHECK(Qty > 0)")
        .field("Note", "Option<String>", "DEFAULT 'none'")
}

pub const PRODUCT_SQL: &str = "CREATE TABLE product (\n\
    \tid INTEGER PRIMARY KEY AUTOINCREMENT,\n\
    \tname TEXT NOT NULL COLLATE NOCASE,\n\
    \tsku TEXT CONSTRAINT uq_sku UNIQUE ON CONFLICT REPLACE,\n\
    \tprice REAL NOT NULL DEFAULT 0 CHECK (Price >= 0),\n\
    \tcategory_id INTEGER REFERENCES category (id) ON DELETE SET NULL ON UPDATE CASCADE,\n\
    \tprice_with_tax REAL GENERATED ALWAYS AS (Price * 1.2) STORED\n\
    );\n";

pub fn build(model: &ModelDescriptor, references: &[ModelDescriptor]) -> String {
    Table::new(model, references)
        .and_then(|t| t.build())
        .unwrap_or_else(|e| panic!("Failed to build {}: {e}", model.name))
}

/// Builds a single-field model and returns the innermost error.
pub fn field_err(declared_type: &str, annotation: &str) -> SchemaError {
    let model = ModelDescriptor::new("T").field("Col", declared_type, annotation);
    let err = Table::new(&model, &[])
        .expect_err(&format!("Expected an error for: {annotation}"));
    err.root().clone()
}

/// Builds a single-field model and returns its column definition.
pub fn column_sql(declared_type: &str, annotation: &str) -> String {
    let model = ModelDescriptor::new("T").field("Col", declared_type, annotation);
    let table = Table::new(&model, &[])
        .unwrap_or_else(|e| panic!("Failed to parse: {annotation}\nError: {e}"));
    table.columns()[0].build()
}
