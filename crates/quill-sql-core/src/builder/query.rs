//! SELECT descriptors over one table.

use tracing::debug;

use super::constraint::SqlConstraint;
use super::error::{QueryError, Result};
use super::value::SqlValue;
use crate::executor::{Executor, Row};
use crate::schema::TableSchema;

/// A query over one table, optionally filtered.
///
/// The builder only describes the query. Every call to [`QueryBuilder::iter`],
/// [`QueryBuilder::count`] or [`QueryBuilder::exists`] runs it again through
/// the executor; no result is cached.
#[derive(Debug, Clone)]
pub struct QueryBuilder<'t> {
    table: &'t TableSchema,
    filter: Option<SqlConstraint>,
}

impl<'t> QueryBuilder<'t> {
    /// Creates an unfiltered query over `table`.
    #[must_use]
    pub const fn new(table: &'t TableSchema) -> Self {
        Self {
            table,
            filter: None,
        }
    }

    /// Adds a predicate; repeated calls are combined with AND.
    #[must_use]
    pub fn filter(mut self, constraint: SqlConstraint) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(constraint),
            None => constraint,
        });
        self
    }

    /// The current predicate.
    #[must_use]
    pub const fn constraint(&self) -> Option<&SqlConstraint> {
        self.filter.as_ref()
    }

    /// The table being queried.
    #[must_use]
    pub const fn table(&self) -> &'t TableSchema {
        self.table
    }

    /// `SELECT * FROM t [WHERE ...]`
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownColumn`] for an unresolved property.
    pub fn build(&self) -> Result<(String, Vec<SqlValue>)> {
        self.render("*")
    }

    /// `SELECT COUNT(*) FROM t [WHERE ...]`
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownColumn`] for an unresolved property.
    pub fn build_count(&self) -> Result<(String, Vec<SqlValue>)> {
        self.render("COUNT(*)")
    }

    fn render(&self, projection: &str) -> Result<(String, Vec<SqlValue>)> {
        let mut sql = format!("SELECT {projection} FROM {}", self.table.qualified_name());
        let mut args = Vec::new();
        if let Some(filter) = &self.filter {
            let (where_sql, where_args) = filter.to_sql(self.table)?;
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
            args = where_args;
        }
        Ok((sql, args))
    }

    /// Runs the query and returns its rows.
    ///
    /// # Errors
    ///
    /// Returns an error when the query cannot be built or executed.
    pub fn iter<E: Executor>(&self, executor: &E) -> Result<impl Iterator<Item = Row>> {
        let (sql, args) = self.build()?;
        debug!(sql = %sql, args = args.len(), "executing query");
        Ok(executor.execute(&sql, &args)?.into_iter())
    }

    /// Runs the count query.
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails or does not yield one integer.
    pub fn count<E: Executor>(&self, executor: &E) -> Result<u64> {
        let (sql, args) = self.build_count()?;
        debug!(sql = %sql, args = args.len(), "executing count query");
        let rows = executor.execute(&sql, &args)?;
        let value = rows
            .first()
            .and_then(|row| row.get_index(0))
            .ok_or_else(|| QueryError::UnexpectedResult(String::from("count query returned no rows")))?;
        match value {
            SqlValue::Int(n) => u64::try_from(*n)
                .map_err(|_| QueryError::UnexpectedResult(format!("negative count {n}"))),
            other => Err(QueryError::UnexpectedResult(format!(
                "count query returned {other}"
            ))),
        }
    }

    /// True when at least one row matches.
    ///
    /// # Errors
    ///
    /// Same as [`QueryBuilder::count`].
    pub fn exists<E: Executor>(&self, executor: &E) -> Result<bool> {
        Ok(self.count(executor)? > 0)
    }
}
