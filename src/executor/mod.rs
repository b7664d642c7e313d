//! Query executor abstraction.
//!
//! A [`Connection`] is one database session. Dialect adapters borrow it
//! mutably for the duration of an operation, so multi-statement protocols
//! (such as Snowflake's `SHOW` + `RESULT_SCAN`) run back to back on the same
//! session with nothing interleaved.
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────────┐
//! │  SchemaDialect op    │────▶│  &mut dyn Connection │
//! │  (SQL template)      │     │  execute / query /   │
//! └──────────────────────┘     │  column_types        │
//!            ▲                 └──────────────────────┘
//!            │ fetch_*                    │
//!            └────────────────────────────┘
//! ```

mod error;
pub mod fetch;
pub mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{ExecError, ExecResult};

/// A positional parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Metadata for one result column, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    /// Column name.
    pub name: String,
    /// Engine-specific type name (e.g. `NUMBER`, `VARCHAR`).
    pub database_type: String,
    /// Whether the column accepts NULL, if the driver knows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Declared length for variable-length types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<i64>,
    /// Declared precision for numeric types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i64>,
    /// Declared scale for numeric types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i64>,
}

impl ColumnType {
    pub fn new(name: impl Into<String>, database_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database_type: database_type.into(),
            nullable: None,
            length: None,
            precision: None,
            scale: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }
}

/// A fully materialized query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rows {
    /// Result column names, in select-list order.
    pub columns: Vec<String>,
    /// Row data, one JSON value per column.
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl Rows {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row of text cells.
    pub fn push_text<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(
            cells
                .into_iter()
                .map(|c| serde_json::Value::String(c.into()))
                .collect(),
        );
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One database session.
///
/// Implementations must run every call on the same underlying session, in
/// call order. Engine-side session state (last query id, current schema)
/// is observable across calls.
#[async_trait]
pub trait Connection: Send {
    /// Run a statement and discard any rows it produces.
    ///
    /// Returns the number of rows affected, or 0 if the driver does not say.
    async fn execute(&mut self, sql: &str, args: &[Value]) -> ExecResult<u64>;

    /// Run a query and collect its rows.
    async fn query(&mut self, sql: &str, args: &[Value]) -> ExecResult<Rows>;

    /// Run a probe query and return its result column metadata.
    async fn column_types(&mut self, sql: &str, args: &[Value]) -> ExecResult<Vec<ColumnType>>;
}
