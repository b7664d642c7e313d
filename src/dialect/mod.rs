//! Schema introspection dialects.
//!
//! Each dialect implements [`SchemaDialect`]: the same four catalog
//! operations expressed in one engine's metadata conventions.
//!
//! | Operation       | Snowflake                               | PostgreSQL                          |
//! |-----------------|-----------------------------------------|-------------------------------------|
//! | `table_names`   | `information_schema.tables`             | `information_schema.tables`         |
//! | `view_names`    | `information_schema.tables`             | `information_schema.tables`         |
//! | `column_types`  | `SELECT * ... LIMIT 0` probe            | `SELECT * ... LIMIT 0` probe        |
//! | `primary_key`   | `SHOW PRIMARY KEYS` + `RESULT_SCAN`     | `key_column_usage` join             |
//!
//! # Usage
//!
//! ```ignore
//! use schemascope::dialect::{Dialect, SchemaDialect};
//!
//! let dialect: Dialect = "snowflake".parse()?;
//! let tables = dialect.table_names(&mut conn).await?;
//! let pk = dialect.primary_key(&mut conn, "SALES", "ORDERS").await?;
//! ```

pub mod helpers;
mod postgres;
mod snowflake;

pub use postgres::Postgres;
pub use snowflake::Snowflake;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::executor::{ColumnType, Connection, ExecResult};

/// A schema-qualified object name.
///
/// An empty `schema` means the current schema. Ordering is by
/// `(schema, name)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectName {
    pub schema: String,
    pub name: String,
}

impl ObjectName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.schema.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.schema, self.name)
        }
    }
}

/// Schema introspection trait, one implementation per engine.
///
/// Adapters hold no state. Every operation runs on the connection it is
/// given and returns executor errors unchanged.
#[async_trait]
pub trait SchemaDialect: fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier (schema, table) for direct interpolation into SQL.
    ///
    /// Never use this on values; bind those as parameters.
    fn escape_ident(&self, ident: &str) -> String;

    /// Column metadata for a table or view, without fetching any rows.
    async fn column_types(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        name: &str,
    ) -> ExecResult<Vec<ColumnType>>;

    /// Primary-key column names in key-sequence order.
    ///
    /// A table without a primary key yields an empty list.
    async fn primary_key(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        name: &str,
    ) -> ExecResult<Vec<String>>;

    /// All base tables outside the information schema, ordered by
    /// `(schema, name)`.
    async fn table_names(&self, conn: &mut dyn Connection) -> ExecResult<Vec<ObjectName>>;

    /// All views outside the information schema, ordered by `(schema, name)`.
    async fn view_names(&self, conn: &mut dyn Connection) -> ExecResult<Vec<ObjectName>>;
}

/// Supported introspection dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Snowflake,
    Postgres,
}

impl Dialect {
    /// All dialects, for help text and tag listings.
    pub const ALL: [Dialect; 2] = [Dialect::Snowflake, Dialect::Postgres];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SchemaDialect {
        match self {
            Dialect::Snowflake => &Snowflake,
            Dialect::Postgres => &Postgres,
        }
    }
}

/// Error returned when a dialect tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported dialect: {0}. Supported: snowflake, postgres")]
pub struct DialectParseError(pub String);

impl FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snowflake" => Ok(Dialect::Snowflake),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            other => Err(DialectParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

// Implement SchemaDialect for Dialect enum by delegating to concrete types
#[async_trait]
impl SchemaDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn escape_ident(&self, ident: &str) -> String {
        self.dialect().escape_ident(ident)
    }

    async fn column_types(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        name: &str,
    ) -> ExecResult<Vec<ColumnType>> {
        self.dialect().column_types(conn, schema, name).await
    }

    async fn primary_key(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        name: &str,
    ) -> ExecResult<Vec<String>> {
        self.dialect().primary_key(conn, schema, name).await
    }

    async fn table_names(&self, conn: &mut dyn Connection) -> ExecResult<Vec<ObjectName>> {
        self.dialect().table_names(conn).await
    }

    async fn view_names(&self, conn: &mut dyn Connection) -> ExecResult<Vec<ObjectName>> {
        self.dialect().view_names(conn).await
    }
}
