//! Schema reader: one dialect driven over one connection.

use serde::Serialize;
use tracing::{debug, info};

use crate::dialect::{Dialect, ObjectName, SchemaDialect};
use crate::executor::{ColumnType, Connection, ExecResult};

/// Introspected description of one table or view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnType>,
    /// Key-sequence ordered; always empty for views.
    pub primary_key: Vec<String>,
}

/// Everything a reader can discover about a database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaSnapshot {
    pub dialect: Dialect,
    pub tables: Vec<TableSnapshot>,
    pub views: Vec<TableSnapshot>,
}

/// Reads schema metadata through a single connection.
///
/// All statements run sequentially on the owned connection.
pub struct SchemaReader<C> {
    dialect: Dialect,
    conn: C,
}

impl<C: Connection> SchemaReader<C> {
    pub fn new(dialect: Dialect, conn: C) -> Self {
        Self { dialect, conn }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Give back the connection.
    pub fn into_inner(self) -> C {
        self.conn
    }

    pub async fn tables(&mut self) -> ExecResult<Vec<ObjectName>> {
        self.dialect.table_names(&mut self.conn).await
    }

    pub async fn views(&mut self) -> ExecResult<Vec<ObjectName>> {
        self.dialect.view_names(&mut self.conn).await
    }

    pub async fn column_types(&mut self, schema: &str, name: &str) -> ExecResult<Vec<ColumnType>> {
        self.dialect.column_types(&mut self.conn, schema, name).await
    }

    pub async fn primary_key(&mut self, schema: &str, name: &str) -> ExecResult<Vec<String>> {
        self.dialect.primary_key(&mut self.conn, schema, name).await
    }

    /// Enumerate tables and views with their columns and primary keys.
    ///
    /// The first failing statement aborts the whole snapshot.
    pub async fn snapshot(&mut self) -> ExecResult<SchemaSnapshot> {
        let table_names = self.tables().await?;
        let view_names = self.views().await?;
        info!(
            dialect = %self.dialect,
            tables = table_names.len(),
            views = view_names.len(),
            "reading schema snapshot"
        );

        let mut tables = Vec::with_capacity(table_names.len());
        for object in table_names {
            let columns = self.column_types(&object.schema, &object.name).await?;
            let primary_key = self.primary_key(&object.schema, &object.name).await?;
            debug!(table = %object, columns = columns.len(), pk = primary_key.len(), "table read");
            tables.push(TableSnapshot {
                schema: object.schema,
                name: object.name,
                columns,
                primary_key,
            });
        }

        let mut views = Vec::with_capacity(view_names.len());
        for object in view_names {
            let columns = self.column_types(&object.schema, &object.name).await?;
            views.push(TableSnapshot {
                schema: object.schema,
                name: object.name,
                columns,
                primary_key: Vec::new(),
            });
        }

        Ok(SchemaSnapshot {
            dialect: self.dialect,
            tables,
            views,
        })
    }
}
