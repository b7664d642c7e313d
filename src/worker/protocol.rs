//! Protocol types for worker communication.
//!
//! Every statement runs inside a worker session: `session.open` leases one
//! physical database connection, and the returned `session_id` pins all
//! subsequent `sql.*` requests to it until `session.close`.

use serde::{Deserialize, Serialize};

use crate::executor::{ColumnType, Rows, Value};

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "sql.query").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Sessions
// ============================================================================

/// Database connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Database driver name (e.g., "snowflake", "postgres").
    pub driver: String,
    /// Driver-specific connection string.
    pub connection_string: String,
}

/// Parameters for `session.open`.
#[derive(Debug, Clone, Serialize)]
pub struct OpenSessionParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
}

/// Response from `session.open`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenSessionResponse {
    /// Identifier of the leased connection.
    pub session_id: String,
}

/// Parameters for `session.close`.
#[derive(Debug, Clone, Serialize)]
pub struct CloseSessionParams {
    pub session_id: String,
}

// ============================================================================
// Statements
// ============================================================================

/// Parameters for `sql.execute`, `sql.query` and `sql.column_types`.
#[derive(Debug, Clone, Serialize)]
pub struct StatementParams<'a> {
    pub session_id: &'a str,
    pub sql: &'a str,
    /// Positional bind values.
    pub args: &'a [Value],
}

/// Response from `sql.execute`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteResponse {
    /// Rows affected, if the driver reports it.
    #[serde(default)]
    pub rows_affected: Option<i64>,
}

/// Column information in query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResultColumn {
    /// Column name or alias.
    pub name: String,
    /// Database-specific type.
    pub data_type: String,
}

/// Response from `sql.query`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    /// Result column descriptions.
    pub columns: Vec<QueryResultColumn>,
    /// Result data rows.
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl From<QueryResponse> for Rows {
    fn from(resp: QueryResponse) -> Self {
        Rows {
            columns: resp.columns.into_iter().map(|c| c.name).collect(),
            rows: resp.rows,
        }
    }
}

/// Response from `sql.column_types`.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnTypesResponse {
    pub columns: Vec<ColumnType>,
}

// ============================================================================
// Method Names
// ============================================================================

/// Worker method names.
pub mod methods {
    pub const OPEN_SESSION: &str = "session.open";
    pub const CLOSE_SESSION: &str = "session.close";
    pub const EXECUTE: &str = "sql.execute";
    pub const QUERY: &str = "sql.query";
    pub const COLUMN_TYPES: &str = "sql.column_types";
}
