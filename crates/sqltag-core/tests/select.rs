//! SELECT statements and the expressions that feed them.

use sqltag_core::expr::{col, lit, BindingParameter, Case, Column, Expression, Raise};
use sqltag_core::select::{Join, JoinKind, OrderingTerm, Select};
use sqltag_core::with::{CommonTableExpression, With};
use sqltag_core::{SchemaError, StorageType};

#[test]
fn test_all_clauses_in_fixed_order() {
    let select = Select::new()
        .distinct()
        .column(Column::qualified("p", "name"))
        .column_as(Expression::function("count", vec![col("l.qty")]), "sold")
        .from_as("Product", "p")
        .join(
            Join::table(JoinKind::Inner, "OrderLine")
                .alias("l")
                .on(Column::qualified("l", "product_id").eq(Column::qualified("p", "id"))),
        )
        .where_clause(col("p.price").gt(0))
        .group_by(col("p.name"))
        .having(col("sold").gt_eq(10))
        .order_by(OrderingTerm::new(col("sold")).desc())
        .order_by(OrderingTerm::new(col("p.name")).asc())
        .limit(5)
        .offset(10);
    assert_eq!(
        select.build(),
        "SELECT DISTINCT p.name, count(l.qty) AS sold FROM product AS p \
         INNER JOIN order_line AS l ON l.product_id = p.id \
         WHERE p.price > 0 GROUP BY p.name HAVING sold >= 10 \
         ORDER BY sold DESC, p.name ASC LIMIT 5 OFFSET 10"
    );
    assert_eq!(select.build(), select.build());
}

#[test]
fn test_joins_render_in_attachment_order() {
    let sql = Select::new()
        .from("Product")
        .join(Join::table(JoinKind::Left, "Category").using(["CategoryId"]))
        .join(Join::table(JoinKind::RightOuter, "Supplier").on(col("a").eq(col("b"))))
        .join(Join::table(JoinKind::FullOuter, "Stock").alias("s"))
        .build();
    assert_eq!(
        sql,
        "SELECT * FROM product LEFT JOIN category USING (category_id) \
         RIGHT OUTER JOIN supplier ON a = b FULL OUTER JOIN stock AS s"
    );
}

#[test]
fn test_join_before_from_is_kept() {
    let sql = Select::new()
        .join(Join::table(JoinKind::Cross, "B"))
        .from("A")
        .build();
    assert_eq!(sql, "SELECT * FROM a CROSS JOIN b");
}

#[test]
fn test_join_without_source_waits_for_from() {
    let pending = Select::new().join(Join::table(JoinKind::Inner, "Category").using(["Id"]));
    assert_eq!(pending.build(), "SELECT *");
    assert_eq!(
        pending.clone().from("").build(),
        "SELECT *",
        "an empty table name is not a source"
    );
    assert_eq!(
        pending.from("Product").build(),
        "SELECT * FROM product INNER JOIN category USING (id)"
    );
}

#[test]
fn test_replacing_source_keeps_joins() {
    let sql = Select::new()
        .from("A")
        .join(Join::table(JoinKind::Natural, "B"))
        .from_as("C", "c")
        .build();
    assert_eq!(sql, "SELECT * FROM c AS c NATURAL JOIN b");
}

#[test]
fn test_nested_subqueries() {
    let expensive = Select::new()
        .column(col("category_id"))
        .from("Product")
        .where_clause(col("price").gt(100));
    let sql = Select::new()
        .column(col("name"))
        .from("Category")
        .where_clause(col("id").expr().in_select(&expensive))
        .build();
    assert_eq!(
        sql,
        "SELECT name FROM category WHERE id IN (SELECT category_id FROM product WHERE price > 100)"
    );
}

#[test]
fn test_exists_and_scalar_subquery() {
    let lines = Select::new()
        .column(Expression::raw("1"))
        .from("OrderLine")
        .where_clause(col("product_id").eq(col("product.id")));
    let sql = Select::new()
        .column_as(
            Expression::subquery(&Select::new().column(Expression::raw("max(price)")).from("Product")),
            "top",
        )
        .from("Product")
        .where_clause(Expression::not_exists(&lines))
        .build();
    assert_eq!(
        sql,
        "SELECT (SELECT max(price) FROM product) AS top FROM product \
         WHERE NOT EXISTS (SELECT 1 FROM order_line WHERE product_id = product.id)"
    );
}

#[test]
fn test_with_clause() {
    let tree = Select::new()
        .column(col("id"))
        .from("Category")
        .where_clause(col("parent_id").is_null());
    let sql = Select::new()
        .with(
            With::new()
                .recursive()
                .table(CommonTableExpression::new("Roots", tree).columns(["Id"])),
        )
        .from("Roots")
        .build();
    assert_eq!(
        sql,
        "WITH RECURSIVE roots(id) AS (SELECT id FROM category WHERE parent_id IS NULL) SELECT * FROM roots"
    );
}

#[test]
fn test_literals_are_quoted() {
    assert_eq!(col("name").eq("O'Brien").as_str(), "name = 'O''Brien'");
    assert_eq!(lit(vec![0xCA_u8, 0xFE]).as_str(), "X'CAFE'");
    assert_eq!(lit(None::<i64>).as_str(), "NULL");
    assert_eq!(lit(1.0_f64).as_str(), "1.0");
}

#[test]
fn test_binding_parameters() {
    let expr = col("id")
        .eq(BindingParameter::Colon(String::from("id")))
        .or(col("code").eq(BindingParameter::Indexed(2)));
    assert_eq!(expr.as_str(), "id = :id OR code = ?2");
}

#[test]
fn test_operator_helpers() {
    assert_eq!(
        col("name").expr().like_escape("10\\%%", "\\").as_str(),
        "name LIKE '10\\%%' ESCAPE '\\'"
    );
    assert_eq!(col("qty").between(1, 10).as_str(), "qty BETWEEN 1 AND 10");
    assert_eq!(
        col("status").expr().not_in_list(vec!["a", "b"]).as_str(),
        "status NOT IN ('a', 'b')"
    );
    assert_eq!(
        col("a").expr().is_not_distinct_from(col("b")).as_str(),
        "a IS NOT DISTINCT FROM b"
    );
    assert_eq!(
        Expression::cast(col("price"), StorageType::Integer).as_str(),
        "CAST(price AS INTEGER)"
    );
    assert_eq!(
        col("name").expr().collate("NOCASE").glob("A*").as_str(),
        "name COLLATE NOCASE GLOB 'A*'"
    );
    assert_eq!(
        col("a").gt(1).and(col("b").lt(2).or(col("c").eq(3)).paren()).as_str(),
        "a > 1 AND (b < 2 OR c = 3)"
    );
}

#[test]
fn test_case_expressions() {
    let searched = Case::new()
        .when(col("qty").eq(0), "none")
        .when(col("qty").lt(10), "few")
        .otherwise("many")
        .build();
    assert_eq!(
        searched.as_str(),
        "CASE WHEN qty = 0 THEN 'none' WHEN qty < 10 THEN 'few' ELSE 'many' END"
    );
    let simple = Case::on(col("kind")).when(1, "one").build();
    assert_eq!(simple.as_str(), "CASE kind WHEN 1 THEN 'one' END");
}

#[test]
fn test_case_arity_mismatch() {
    let err = Case::from_branches(None, vec![col("a").eq(1)], vec![]).unwrap_err();
    assert_eq!(err, SchemaError::CaseArity { when: 1, then: 0 });
}

#[test]
fn test_raise() {
    assert_eq!(Expression::raise(&Raise::Ignore).as_str(), "RAISE(IGNORE)");
    assert_eq!(
        Expression::raise(&Raise::Abort(String::from("can't delete"))).as_str(),
        "RAISE(ABORT, 'can''t delete')"
    );
}
