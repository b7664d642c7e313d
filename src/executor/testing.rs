//! Scripted in-memory connection.
//!
//! [`ScriptedConnection`] replays a queue of canned responses and records
//! every statement it receives, so adapter tests can assert on the exact
//! SQL, bind parameters, and statement order.
//!
//! ```ignore
//! let mut conn = ScriptedConnection::new();
//! conn.push_executed(0).push_rows(rows);
//!
//! let keys = Snowflake.primary_key(&mut conn, "SALES", "ORDERS").await?;
//! assert_eq!(conn.statements().len(), 2);
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;

use super::{ColumnType, Connection, ExecError, ExecResult, Rows, Value};

/// Which [`Connection`] method received a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Execute,
    Query,
    ColumnTypes,
}

/// A statement recorded by [`ScriptedConnection`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub sql: String,
    pub args: Vec<Value>,
}

/// A canned response.
#[derive(Debug)]
pub enum Scripted {
    Executed(u64),
    Rows(Rows),
    ColumnTypes(Vec<ColumnType>),
    Fail(ExecError),
}

/// A connection that answers from a script.
#[derive(Debug, Default)]
pub struct ScriptedConnection {
    script: VecDeque<Scripted>,
    log: Vec<Statement>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, response: Scripted) -> &mut Self {
        self.script.push_back(response);
        self
    }

    pub fn push_executed(&mut self, rows_affected: u64) -> &mut Self {
        self.push(Scripted::Executed(rows_affected))
    }

    pub fn push_rows(&mut self, rows: Rows) -> &mut Self {
        self.push(Scripted::Rows(rows))
    }

    pub fn push_column_types(&mut self, columns: Vec<ColumnType>) -> &mut Self {
        self.push(Scripted::ColumnTypes(columns))
    }

    pub fn push_error(&mut self, err: ExecError) -> &mut Self {
        self.push(Scripted::Fail(err))
    }

    /// Statements received so far, in order.
    pub fn statements(&self) -> &[Statement] {
        &self.log
    }

    /// Responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn next(&mut self, kind: StatementKind, sql: &str, args: &[Value]) -> ExecResult<Scripted> {
        self.log.push(Statement {
            kind,
            sql: sql.to_string(),
            args: args.to_vec(),
        });

        match self.script.pop_front() {
            Some(Scripted::Fail(err)) => Err(err),
            Some(response) => Ok(response),
            None => Err(ExecError::database(
                "SCRIPT_EXHAUSTED",
                format!("no scripted response for {:?}", kind),
            )),
        }
    }
}

fn mismatch(kind: StatementKind, got: &Scripted) -> ExecError {
    ExecError::database(
        "SCRIPT_MISMATCH",
        format!("{:?} call answered with {:?}", kind, got),
    )
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn execute(&mut self, sql: &str, args: &[Value]) -> ExecResult<u64> {
        match self.next(StatementKind::Execute, sql, args)? {
            Scripted::Executed(n) => Ok(n),
            // Statements like SHOW may be answered with rows; execute drops them.
            Scripted::Rows(rows) => Ok(rows.len() as u64),
            other => Err(mismatch(StatementKind::Execute, &other)),
        }
    }

    async fn query(&mut self, sql: &str, args: &[Value]) -> ExecResult<Rows> {
        match self.next(StatementKind::Query, sql, args)? {
            Scripted::Rows(rows) => Ok(rows),
            other => Err(mismatch(StatementKind::Query, &other)),
        }
    }

    async fn column_types(&mut self, sql: &str, args: &[Value]) -> ExecResult<Vec<ColumnType>> {
        match self.next(StatementKind::ColumnTypes, sql, args)? {
            Scripted::ColumnTypes(cols) => Ok(cols),
            other => Err(mismatch(StatementKind::ColumnTypes, &other)),
        }
    }
}
