//! Executor error types.

use thiserror::Error;

use crate::worker::WorkerError;

/// Result type for executor operations.
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors surfaced by a [`Connection`](super::Connection).
///
/// Dialect adapters return these unchanged.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The transport to the database failed.
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// The engine rejected the statement (syntax, privilege, missing object).
    #[error("database error: {message} (code: {code})")]
    Database {
        /// Engine or driver error code.
        code: String,
        /// Engine error message.
        message: String,
    },

    /// A result row had the wrong number of columns.
    #[error("expected {expected} column(s) per row, found {found}")]
    RowShape { expected: usize, found: usize },

    /// A result cell that should hold text held something else.
    #[error("column {column} is not a string: {found}")]
    NotText { column: usize, found: String },
}

impl ExecError {
    /// Create a database error.
    pub fn database(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Database {
            code: code.into(),
            message: message.into(),
        }
    }
}
