//! The seam to whatever actually runs SQL.
//!
//! The core never talks to a database. Query builders and validators hand
//! `(sql, args)` pairs to an [`Executor`] and read back [`Row`]s.

use thiserror::Error;

use crate::builder::SqlValue;

/// One result row: column names with their values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: SqlValue) -> Self {
        self.columns.push((column.into(), value));
        self
    }

    /// Value of a column by name (ASCII case-insensitive).
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    /// Value by position.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.columns.get(index).map(|(_, value)| value)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Error reported by an [`Executor`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExecError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ExecError {
    /// Creates an error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying driver error.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Runs a parameterized statement.
///
/// `args` align one to one with the `?` placeholders of `sql`, left to
/// right.
pub trait Executor {
    /// Executes `sql` with `args` bound and returns every row.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecError`] when the statement cannot be run.
    fn execute(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>, ExecError>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>, ExecError> {
        (**self).execute(sql, args)
    }
}

impl<E: Executor + ?Sized> Executor for std::sync::Arc<E> {
    fn execute(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>, ExecError> {
        (**self).execute(sql, args)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_row_lookup_ignores_case() {
        let row = Row::new()
            .with("id", SqlValue::Int(1))
            .with("Name", SqlValue::Text("x".into()));
        assert_eq!(row.get("NAME"), Some(&SqlValue::Text("x".into())));
        assert_eq!(row.get_index(0), Some(&SqlValue::Int(1)));
        assert!(row.get("missing").is_none());
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_exec_error_keeps_source() {
        let io = std::io::Error::other("socket closed");
        let err = ExecError::with_source("query failed", io);
        assert_eq!(err.to_string(), "query failed");
        assert!(err.source().is_some());
        assert!(ExecError::new("x").source().is_none());
    }
}
