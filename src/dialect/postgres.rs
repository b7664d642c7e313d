//! PostgreSQL introspection dialect.
//!
//! Primary keys come straight from the standard catalog views, so unlike
//! Snowflake a single query suffices.

use async_trait::async_trait;

use super::helpers;
use super::{ObjectName, SchemaDialect};
use crate::executor::fetch::{fetch_column_types, fetch_names, fetch_object_names};
use crate::executor::{ColumnType, Connection, ExecResult};

const ALL_COLUMNS: &str = "SELECT * FROM {} LIMIT 0";

const TABLE_NAMES: &str = "
    SELECT
        table_schema,
        table_name
    FROM
        information_schema.tables
    WHERE
        table_type = 'BASE TABLE' AND
        table_schema NOT IN ('information_schema', 'pg_catalog')
    ORDER BY
        table_schema,
        table_name
";

const VIEW_NAMES: &str = "
    SELECT
        table_schema,
        table_name
    FROM
        information_schema.tables
    WHERE
        table_type = 'VIEW' AND
        table_schema NOT IN ('information_schema', 'pg_catalog')
    ORDER BY
        table_schema,
        table_name
";

const PRIMARY_KEY_CURRENT_SCHEMA: &str = "
    SELECT
        kcu.column_name
    FROM
        information_schema.table_constraints tc
    JOIN
        information_schema.key_column_usage kcu
        ON tc.constraint_schema = kcu.constraint_schema
        AND tc.constraint_name = kcu.constraint_name
        AND tc.table_name = kcu.table_name
    WHERE
        tc.constraint_type = 'PRIMARY KEY' AND
        tc.table_schema = current_schema() AND
        tc.table_name = $1
    ORDER BY
        kcu.ordinal_position
";

const PRIMARY_KEY_WITH_SCHEMA: &str = "
    SELECT
        kcu.column_name
    FROM
        information_schema.table_constraints tc
    JOIN
        information_schema.key_column_usage kcu
        ON tc.constraint_schema = kcu.constraint_schema
        AND tc.constraint_name = kcu.constraint_name
        AND tc.table_name = kcu.table_name
    WHERE
        tc.constraint_type = 'PRIMARY KEY' AND
        tc.table_schema = $1 AND
        tc.table_name = $2
    ORDER BY
        kcu.ordinal_position
";

/// PostgreSQL introspection dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

#[async_trait]
impl SchemaDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn escape_ident(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    async fn column_types(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        name: &str,
    ) -> ExecResult<Vec<ColumnType>> {
        fetch_column_types(conn, ALL_COLUMNS, schema, name, |ident| {
            self.escape_ident(ident)
        })
        .await
    }

    async fn primary_key(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        name: &str,
    ) -> ExecResult<Vec<String>> {
        let sql = if schema.is_empty() {
            PRIMARY_KEY_CURRENT_SCHEMA
        } else {
            PRIMARY_KEY_WITH_SCHEMA
        };
        fetch_names(conn, sql, schema, name).await
    }

    async fn table_names(&self, conn: &mut dyn Connection) -> ExecResult<Vec<ObjectName>> {
        fetch_object_names(conn, TABLE_NAMES).await
    }

    async fn view_names(&self, conn: &mut dyn Connection) -> ExecResult<Vec<ObjectName>> {
        fetch_object_names(conn, VIEW_NAMES).await
    }
}
