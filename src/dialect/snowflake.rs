//! Snowflake introspection dialect.
//!
//! Snowflake features relevant here:
//! - ANSI identifier quoting (`"`), case-sensitive once quoted
//! - No `KEY_COLUMN_USAGE` view in the information schema
//! - `SHOW PRIMARY KEYS` output readable via `RESULT_SCAN(LAST_QUERY_ID())`

use async_trait::async_trait;
use tracing::debug;

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
        table_schema NOT IN ('INFORMATION_SCHEMA')
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
        table_schema NOT IN ('INFORMATION_SCHEMA')
    ORDER BY
        table_schema,
        table_name
";

// Reads the output of the SHOW PRIMARY KEYS issued just before it.
const PRIMARY_KEY_CURRENT_SCHEMA: &str = r#"
    SELECT
        "column_name"
    FROM
        TABLE(RESULT_SCAN(LAST_QUERY_ID()))
    WHERE
        "schema_name" = CURRENT_SCHEMA() AND
        "table_name" = ?
    ORDER BY
        "key_sequence"
"#;

const PRIMARY_KEY_WITH_SCHEMA: &str = r#"
    SELECT
        "column_name"
    FROM
        TABLE(RESULT_SCAN(LAST_QUERY_ID()))
    WHERE
        "schema_name" = ? AND
        "table_name" = ?
    ORDER BY
        "key_sequence"
"#;

/// Snowflake introspection dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Snowflake;

impl Snowflake {
    /// The `SHOW PRIMARY KEYS` command for a table.
    pub fn show_primary_keys(&self, schema: &str, name: &str) -> String {
        format!(
            "SHOW PRIMARY KEYS IN TABLE {}",
            helpers::qualified_name(schema, name, |ident| self.escape_ident(ident))
        )
    }
}

#[async_trait]
impl SchemaDialect for Snowflake {
    fn name(&self) -> &'static str {
        "snowflake"
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
        let show = self.show_primary_keys(schema, name);
        debug!(dialect = self.name(), phase = "show", sql = %show, "primary key lookup");
        conn.execute(&show, &[]).await?;

        // Must follow the SHOW directly on the same session.
        let scan = if schema.is_empty() {
            PRIMARY_KEY_CURRENT_SCHEMA
        } else {
            PRIMARY_KEY_WITH_SCHEMA
        };
        debug!(dialect = self.name(), phase = "result_scan", "primary key lookup");
        fetch_names(conn, scan, schema, name).await
    }

    async fn table_names(&self, conn: &mut dyn Connection) -> ExecResult<Vec<ObjectName>> {
        fetch_object_names(conn, TABLE_NAMES).await
    }

    async fn view_names(&self, conn: &mut dyn Connection) -> ExecResult<Vec<ObjectName>> {
        fetch_object_names(conn, VIEW_NAMES).await
    }
}
