//! Integration tests for the Snowflake introspection dialect.
//!
//! These tests drive the adapter through a scripted connection and check
//! the exact statements it issues.

use schemascope::dialect::{Dialect, ObjectName, SchemaDialect, Snowflake};
use schemascope::executor::testing::{ScriptedConnection, StatementKind};
use schemascope::executor::{ColumnType, ExecError, Rows, Value};
use sqlparser::dialect::SnowflakeDialect;
use sqlparser::parser::Parser;

fn assert_parses(sql: &str) {
    if let Err(e) = Parser::parse_sql(&SnowflakeDialect {}, sql) {
        panic!("SQL failed to parse: {}\n{}", e, sql);
    }
}

fn single_column(values: &[&str]) -> Rows {
    let mut rows = Rows::new(vec!["column_name".into()]);
    for v in values {
        rows.push_text([*v]);
    }
    rows
}

fn object_rows(pairs: &[(&str, &str)]) -> Rows {
    let mut rows = Rows::new(vec!["table_schema".into(), "table_name".into()]);
    for (schema, name) in pairs {
        rows.push_text([*schema, *name]);
    }
    rows
}

#[tokio::test]
async fn test_primary_key_preserves_key_sequence() {
    let mut conn = ScriptedConnection::new();
    conn.push_executed(0)
        .push_rows(single_column(&["REGION", "ORDER_ID"]));

    let keys = Snowflake
        .primary_key(&mut conn, "SALES", "ORDERS")
        .await
        .unwrap();

    insta::assert_debug_snapshot!(keys, @r#"
    [
        "REGION",
        "ORDER_ID",
    ]
    "#);

    let log = conn.statements();
    insta::assert_snapshot!(&log[0].sql, @r#"SHOW PRIMARY KEYS IN TABLE "SALES"."ORDERS""#);
    assert_eq!(log[1].kind, StatementKind::Query);
    assert!(log[1].sql.contains("ORDER BY"));
    assert!(log[1].sql.contains(r#""key_sequence""#));
    assert_parses(&log[1].sql);
}

#[tokio::test]
async fn test_primary_key_binds_by_schema_presence() {
    let mut conn = ScriptedConnection::new();
    conn.push_executed(0).push_rows(single_column(&["ID"]));
    conn.push_executed(0).push_rows(single_column(&["ID"]));

    Snowflake.primary_key(&mut conn, "", "T").await.unwrap();
    Snowflake.primary_key(&mut conn, "S", "T").await.unwrap();

    let log = conn.statements();
    assert_eq!(log.len(), 4);
    assert_eq!(log[1].args, vec![Value::from("T")]);
    assert!(log[1].sql.contains("CURRENT_SCHEMA()"));
    assert_eq!(log[3].args, vec![Value::from("S"), Value::from("T")]);
    assert!(!log[3].sql.contains("CURRENT_SCHEMA()"));
}

#[tokio::test]
async fn test_primary_key_failure_is_passed_through() {
    let mut conn = ScriptedConnection::new();
    conn.push_error(ExecError::database(
        "003001",
        "Insufficient privileges to operate on table 'ORDERS'",
    ));

    let err = Snowflake
        .primary_key(&mut conn, "SALES", "ORDERS")
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "database error: Insufficient privileges to operate on table 'ORDERS' (code: 003001)"
    );
    assert_eq!(conn.statements().len(), 1);
}

#[tokio::test]
async fn test_primary_key_scan_failure_is_passed_through() {
    let mut conn = ScriptedConnection::new();
    conn.push_executed(0)
        .push_error(ExecError::database("000709", "Statement not found"));

    let err = Snowflake
        .primary_key(&mut conn, "SALES", "ORDERS")
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Database { ref code, .. } if code == "000709"));
    assert_eq!(conn.statements().len(), 2);
}

#[tokio::test]
async fn test_column_types_quoting() {
    let mut conn = ScriptedConnection::new();
    conn.push_column_types(vec![
        ColumnType::new("ORDER_ID", "NUMBER").with_nullable(false),
        ColumnType::new("Region Name", "VARCHAR").with_nullable(true),
    ]);
    conn.push_column_types(vec![]);

    let columns = Snowflake
        .column_types(&mut conn, "My Schema", "a\"b")
        .await
        .unwrap();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[1].name, "Region Name");

    Snowflake.column_types(&mut conn, "", "orders").await.unwrap();

    let log = conn.statements();
    assert_eq!(log[0].sql, r#"SELECT * FROM "My Schema"."a""b" LIMIT 0"#);
    assert_eq!(log[1].sql, r#"SELECT * FROM "orders" LIMIT 0"#);
    assert!(log.iter().all(|s| s.kind == StatementKind::ColumnTypes));
    assert!(log.iter().all(|s| s.args.is_empty()));
    assert_parses(&log[0].sql);
}

#[tokio::test]
async fn test_table_names_keep_catalog_order() {
    let mut conn = ScriptedConnection::new();
    conn.push_rows(object_rows(&[
        ("HR", "PEOPLE"),
        ("SALES", "CUSTOMERS"),
        ("SALES", "ORDERS"),
    ]));

    let tables = Snowflake.table_names(&mut conn).await.unwrap();

    assert_eq!(
        tables,
        vec![
            ObjectName::new("HR", "PEOPLE"),
            ObjectName::new("SALES", "CUSTOMERS"),
            ObjectName::new("SALES", "ORDERS"),
        ]
    );
    assert!(tables.windows(2).all(|w| w[0] <= w[1]));

    let sql = &conn.statements()[0].sql;
    assert!(sql.contains("table_schema NOT IN ('INFORMATION_SCHEMA')"));
    assert!(sql.contains("table_type = 'BASE TABLE'"));
    assert_parses(sql);
}

#[tokio::test]
async fn test_view_names_query() {
    let mut conn = ScriptedConnection::new();
    conn.push_rows(object_rows(&[("SALES", "ORDER_SUMMARY")]));

    let views = Snowflake.view_names(&mut conn).await.unwrap();
    assert_eq!(views, vec![ObjectName::new("SALES", "ORDER_SUMMARY")]);

    let sql = &conn.statements()[0].sql;
    assert!(sql.contains("table_type = 'VIEW'"));
    assert!(sql.contains("table_schema NOT IN ('INFORMATION_SCHEMA')"));
    assert_parses(sql);
}

#[tokio::test]
async fn test_dispatch_through_dialect_enum() {
    let dialect: Dialect = "Snowflake".parse().unwrap();
    let mut conn = ScriptedConnection::new();
    conn.push_executed(0).push_rows(single_column(&["ID"]));

    let keys = dialect.primary_key(&mut conn, "S", "T").await.unwrap();
    assert_eq!(keys, vec!["ID"]);
    assert_eq!(conn.statements()[0].kind, StatementKind::Execute);
    assert_eq!(dialect.escape_ident("My Table"), "\"My Table\"");
}
