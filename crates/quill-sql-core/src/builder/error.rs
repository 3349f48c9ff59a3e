//! Errors raised while building or running a query.

use thiserror::Error;

use crate::executor::ExecError;

/// Query building and execution errors.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A constraint names a property the table does not have.
    #[error("unknown column `{column}` in table `{table}`")]
    UnknownColumn {
        /// Table name.
        table: String,
        /// Property or column name as given.
        column: String,
    },

    /// The executor failed.
    #[error("execution failed: {0}")]
    Execution(#[from] ExecError),

    /// The executor returned something a count query cannot produce.
    #[error("unexpected result: {0}")]
    UnexpectedResult(String),
}

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
