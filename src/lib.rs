//! # schemascope
//!
//! Multi-dialect database schema introspection.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            SchemaReader (one dialect, one session)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [SchemaDialect]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Snowflake / Postgres adapters (SQL templates)          │
//! │   escape_ident · table_names · view_names ·              │
//! │   column_types · primary_key                             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [fetch_* marshalers]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Connection (execute / query / column_types)            │
//! │   WorkerConnection ── NDJSON ──▶ worker process          │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dialect;
pub mod executor;
pub mod reader;
pub mod worker;

pub use dialect::{Dialect, ObjectName, SchemaDialect};
pub use executor::{ColumnType, Connection, ExecError, ExecResult, Rows, Value};
pub use reader::{SchemaReader, SchemaSnapshot, TableSnapshot};
