//! Result marshalers shared by all dialect adapters.

use tracing::debug;

use super::{ColumnType, Connection, ExecError, ExecResult, Value};
use crate::dialect::helpers::qualified_name;
use crate::dialect::ObjectName;

/// Run `sql` and collect the first column of every row as a string.
///
/// When `schema` is empty only `name` is bound, otherwise `schema` and
/// `name` are bound in that order.
pub async fn fetch_names(
    conn: &mut dyn Connection,
    sql: &str,
    schema: &str,
    name: &str,
) -> ExecResult<Vec<String>> {
    let args: Vec<Value> = if schema.is_empty() {
        vec![name.into()]
    } else {
        vec![schema.into(), name.into()]
    };

    let rows = conn.query(sql, &args).await?;
    rows.rows
        .iter()
        .map(|row| {
            let first = row.first().ok_or(ExecError::RowShape {
                expected: 1,
                found: 0,
            })?;
            text_cell(first, 0)
        })
        .collect()
}

/// Run `sql` and decode every row as a `(schema, name)` pair.
///
/// Row order is preserved.
pub async fn fetch_object_names(
    conn: &mut dyn Connection,
    sql: &str,
) -> ExecResult<Vec<ObjectName>> {
    let rows = conn.query(sql, &[]).await?;
    debug!(rows = rows.len(), "fetched object names");

    rows.rows
        .iter()
        .map(|row| {
            if row.len() != 2 {
                return Err(ExecError::RowShape {
                    expected: 2,
                    found: row.len(),
                });
            }
            Ok(ObjectName::new(text_cell(&row[0], 0)?, text_cell(&row[1], 1)?))
        })
        .collect()
}

/// Format `template` with the escaped qualified name and probe its columns.
///
/// `template` must contain exactly one `{}` placeholder for the object name.
pub async fn fetch_column_types(
    conn: &mut dyn Connection,
    template: &str,
    schema: &str,
    name: &str,
    escape: impl Fn(&str) -> String,
) -> ExecResult<Vec<ColumnType>> {
    let sql = template.replacen("{}", &qualified_name(schema, name, escape), 1);
    conn.column_types(&sql, &[]).await
}

fn text_cell(cell: &serde_json::Value, column: usize) -> ExecResult<String> {
    match cell {
        serde_json::Value::String(s) => Ok(s.clone()),
        other => Err(ExecError::NotText {
            column,
            found: other.to_string(),
        }),
    }
}
