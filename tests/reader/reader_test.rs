//! Integration tests for the schema reader.

use schemascope::executor::testing::{ScriptedConnection, StatementKind};
use schemascope::executor::{ColumnType, ExecError, Rows};
use schemascope::{Dialect, SchemaReader};

fn object_rows(pairs: &[(&str, &str)]) -> Rows {
    let mut rows = Rows::new(vec!["table_schema".into(), "table_name".into()]);
    for (schema, name) in pairs {
        rows.push_text([*schema, *name]);
    }
    rows
}

fn single_column(values: &[&str]) -> Rows {
    let mut rows = Rows::new(vec!["column_name".into()]);
    for v in values {
        rows.push_text([*v]);
    }
    rows
}

#[tokio::test]
async fn test_snowflake_snapshot() {
    let mut conn = ScriptedConnection::new();
    conn.push_rows(object_rows(&[("SALES", "ORDERS"), ("SALES", "REGIONS")]))
        .push_rows(object_rows(&[("SALES", "ORDER_SUMMARY")]))
        // ORDERS: columns, then SHOW + RESULT_SCAN
        .push_column_types(vec![
            ColumnType::new("REGION", "VARCHAR"),
            ColumnType::new("ORDER_ID", "NUMBER"),
        ])
        .push_executed(0)
        .push_rows(single_column(&["REGION", "ORDER_ID"]))
        // REGIONS: no declared key
        .push_column_types(vec![ColumnType::new("REGION", "VARCHAR")])
        .push_executed(0)
        .push_rows(single_column(&[]))
        // ORDER_SUMMARY view: columns only
        .push_column_types(vec![ColumnType::new("TOTAL", "NUMBER")]);

    let mut reader = SchemaReader::new(Dialect::Snowflake, conn);
    let snapshot = reader.snapshot().await.unwrap();

    assert_eq!(snapshot.dialect, Dialect::Snowflake);
    assert_eq!(snapshot.tables.len(), 2);
    assert_eq!(snapshot.tables[0].primary_key, vec!["REGION", "ORDER_ID"]);
    assert!(snapshot.tables[1].primary_key.is_empty());
    assert_eq!(snapshot.views.len(), 1);
    assert_eq!(snapshot.views[0].name, "ORDER_SUMMARY");
    assert!(snapshot.views[0].primary_key.is_empty());

    let conn = reader.into_inner();
    assert_eq!(conn.remaining(), 0);

    // Each SHOW is immediately followed by its RESULT_SCAN.
    let log = conn.statements();
    for (i, stmt) in log.iter().enumerate() {
        if stmt.kind == StatementKind::Execute {
            assert!(log[i + 1].sql.contains("RESULT_SCAN(LAST_QUERY_ID())"));
        }
    }
}

#[tokio::test]
async fn test_snapshot_serializes_to_json() {
    let mut conn = ScriptedConnection::new();
    conn.push_rows(object_rows(&[("PUBLIC", "T")]))
        .push_rows(object_rows(&[]))
        .push_column_types(vec![ColumnType::new("ID", "NUMBER").with_nullable(false)])
        .push_executed(0)
        .push_rows(single_column(&["ID"]));

    let snapshot = SchemaReader::new(Dialect::Snowflake, conn)
        .snapshot()
        .await
        .unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "dialect": "snowflake",
            "tables": [{
                "schema": "PUBLIC",
                "name": "T",
                "columns": [{"name": "ID", "database_type": "NUMBER", "nullable": false}],
                "primary_key": ["ID"]
            }],
            "views": []
        })
    );
}

#[tokio::test]
async fn test_snapshot_aborts_on_first_error() {
    let mut conn = ScriptedConnection::new();
    conn.push_rows(object_rows(&[("SALES", "ORDERS")]))
        .push_rows(object_rows(&[]))
        .push_error(ExecError::database("002003", "does not exist"));

    let mut reader = SchemaReader::new(Dialect::Snowflake, conn);
    let err = reader.snapshot().await.unwrap_err();

    assert!(matches!(err, ExecError::Database { .. }));
    assert_eq!(reader.into_inner().statements().len(), 3);
}

#[tokio::test]
async fn test_postgres_reader_single_statement_primary_key() {
    let mut conn = ScriptedConnection::new();
    conn.push_rows(single_column(&["id"]));

    let mut reader = SchemaReader::new(Dialect::Postgres, conn);
    let keys = reader.primary_key("public", "accounts").await.unwrap();

    assert_eq!(keys, vec!["id"]);
    let conn = reader.into_inner();
    assert_eq!(conn.statements().len(), 1);
    assert!(conn.statements()[0].sql.contains("key_column_usage"));
}
