//! Schema scripts: pragmas, tables and indexes in a fixed order.

mod common;

use common::{category, order_line, product, PRODUCT_SQL};
use sqltag_core::clause::IndexedColumn;
use sqltag_core::expr::col;
use sqltag_core::pragma::JournalMode;
use sqltag_core::{Index, ModelDescriptor, Pragma, Schema, SchemaError, Table};

fn shop() -> Schema {
    let models = [category(), product(), order_line()];
    Schema::new("shop")
        .pragma(Pragma::foreign_keys(true))
        .pragma(Pragma::journal_mode(JournalMode::Wal))
        .table(Table::new(&models[1], &models).unwrap())
        .index(
            Index::on_model("idx_product_name", &models[1])
                .unique()
                .column(IndexedColumn::new("Name").collate("NOCASE")),
        )
        .index(
            Index::new("idx_product_price", "Product")
                .if_not_exists()
                .column(IndexedColumn::new("Price").desc())
                .where_clause(col("price").gt(0)),
        )
}

#[test]
fn test_script_layout() {
    let expected = format!(
        "PRAGMA foreign_keys = ON;\n\
         PRAGMA journal_mode = WAL;\n\
         \n\
         {PRODUCT_SQL}\n\
         CREATE UNIQUE INDEX idx_product_name ON product (name COLLATE NOCASE);\n\
         CREATE INDEX IF NOT EXISTS idx_product_price ON product (price DESC) WHERE price > 0;\n"
    );
    assert_eq!(shop().build().unwrap(), expected);
}

#[test]
fn test_script_is_idempotent() {
    let schema = shop();
    assert_eq!(schema.build().unwrap(), schema.build().unwrap());
}

#[test]
fn test_insertion_order_does_not_change_layout() {
    let a = Schema::new("a")
        .index(Index::new("i", "T").column("X"))
        .pragma(Pragma::user_version(2));
    let b = Schema::new("b")
        .pragma(Pragma::user_version(2))
        .index(Index::new("i", "T").column("X"));
    assert_eq!(a.build().unwrap(), b.build().unwrap());
}

#[test]
fn test_table_error_surfaces_from_build() {
    let model = ModelDescriptor::new("Tag").field("Id", "i64", "PRIMARY KEY");
    let schema = Schema::new("broken").table(
        Table::new(&model, &[])
            .unwrap()
            .unique(None, sqltag_core::clause::TableUnique::new(["Label"])),
    );
    assert!(matches!(
        schema.build().unwrap_err(),
        SchemaError::UnknownColumn { model, column } if model == "Tag" && column == "Label"
    ));
}
