//! Integration tests for the PostgreSQL introspection dialect.

use schemascope::dialect::{ObjectName, Postgres, SchemaDialect};
use schemascope::executor::testing::ScriptedConnection;
use schemascope::executor::{Rows, Value};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

fn assert_parses(sql: &str) {
    if let Err(e) = Parser::parse_sql(&PostgreSqlDialect {}, sql) {
        panic!("SQL failed to parse: {}\n{}", e, sql);
    }
}

#[tokio::test]
async fn test_catalog_queries_parse() {
    let mut conn = ScriptedConnection::new();
    let mut tables = Rows::new(vec!["table_schema".into(), "table_name".into()]);
    tables.push_text(["public", "accounts"]);
    conn.push_rows(tables)
        .push_rows(Rows::default())
        .push_rows(Rows::default())
        .push_rows(Rows::default());

    let names = Postgres.table_names(&mut conn).await.unwrap();
    assert_eq!(names, vec![ObjectName::new("public", "accounts")]);
    Postgres.view_names(&mut conn).await.unwrap();
    Postgres.primary_key(&mut conn, "", "accounts").await.unwrap();
    Postgres.primary_key(&mut conn, "public", "accounts").await.unwrap();

    let log = conn.statements();
    assert_eq!(log.len(), 4);
    for stmt in log {
        assert_parses(&stmt.sql);
    }
    assert_eq!(log[3].args, vec![Value::from("public"), Value::from("accounts")]);
}

#[tokio::test]
async fn test_column_probe() {
    let mut conn = ScriptedConnection::new();
    conn.push_column_types(vec![]);

    Postgres
        .column_types(&mut conn, "public", "Order Lines")
        .await
        .unwrap();

    let sql = &conn.statements()[0].sql;
    assert_eq!(sql, r#"SELECT * FROM "public"."Order Lines" LIMIT 0"#);
    assert_parses(sql);
}
