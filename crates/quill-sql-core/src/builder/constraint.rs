//! Typed predicates over schema columns.
//!
//! Constraints name columns by property and are resolved against a
//! [`TableSchema`] only when rendered, so one constraint can be reused with
//! any table that maps the same properties. Only conjunction is supported.

use super::error::{QueryError, Result};
use super::value::{SqlValue, ToSqlValue};
use crate::schema::TableSchema;

/// Creates a column reference by property name.
#[must_use]
pub fn column(property: &str) -> ColumnRef {
    ColumnRef {
        property: String::from(property),
    }
}

/// A reference to a column by its property name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Property name, resolved through the schema at render time.
    pub property: String,
}

impl From<&str> for ColumnRef {
    fn from(property: &str) -> Self {
        column(property)
    }
}

impl From<String> for ColumnRef {
    fn from(property: String) -> Self {
        Self { property }
    }
}

impl ColumnRef {
    /// `column = value`
    #[must_use]
    pub fn is_equal_to<T: ToSqlValue>(self, value: T) -> SqlConstraint {
        SqlConstraint::is_equal_to(self, value)
    }

    /// `column <> value`
    #[must_use]
    pub fn is_not_equal_to<T: ToSqlValue>(self, value: T) -> SqlConstraint {
        SqlConstraint::is_not_equal_to(self, value)
    }

    /// `column IN (values)`
    #[must_use]
    pub fn is_in<T: ToSqlValue>(self, values: Vec<T>) -> SqlConstraint {
        SqlConstraint::is_in(self, values)
    }

    /// `column LIKE pattern`
    #[must_use]
    pub fn is_like<T: ToSqlValue>(self, pattern: T) -> SqlConstraint {
        SqlConstraint::is_like(self, pattern)
    }
}

/// A predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlConstraint {
    /// Equality, or inequality when `negated`.
    Equal {
        /// Column.
        column: ColumnRef,
        /// Compared value.
        value: SqlValue,
        /// `<>` instead of `=`.
        negated: bool,
    },
    /// Set membership.
    In {
        /// Column.
        column: ColumnRef,
        /// Members.
        values: Vec<SqlValue>,
    },
    /// Pattern match.
    Like {
        /// Column.
        column: ColumnRef,
        /// LIKE pattern.
        pattern: SqlValue,
    },
    /// Every member holds.
    And(Vec<SqlConstraint>),
}

impl SqlConstraint {
    /// `column = value`. A NULL value renders as `column IS NULL`.
    #[must_use]
    pub fn is_equal_to<T: ToSqlValue>(column: impl Into<ColumnRef>, value: T) -> Self {
        Self::Equal {
            column: column.into(),
            value: value.to_sql_value(),
            negated: false,
        }
    }

    /// `column <> value`. A NULL value renders as `column IS NOT NULL`.
    #[must_use]
    pub fn is_not_equal_to<T: ToSqlValue>(column: impl Into<ColumnRef>, value: T) -> Self {
        Self::Equal {
            column: column.into(),
            value: value.to_sql_value(),
            negated: true,
        }
    }

    /// `column IN (v1, v2, ...)`. An empty list matches nothing.
    #[must_use]
    pub fn is_in<T: ToSqlValue>(column: impl Into<ColumnRef>, values: Vec<T>) -> Self {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
        }
    }

    /// `column LIKE pattern`
    #[must_use]
    pub fn is_like<T: ToSqlValue>(column: impl Into<ColumnRef>, pattern: T) -> Self {
        Self::Like {
            column: column.into(),
            pattern: pattern.to_sql_value(),
        }
    }

    /// Conjunction. Nested conjunctions are flattened.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let mut parts = match self {
            Self::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Self::And(parts)
    }

    /// Renders the predicate against `table`.
    ///
    /// Returns the SQL fragment and the values for its `?` placeholders, in
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownColumn`] when a property does not resolve.
    pub fn to_sql(&self, table: &TableSchema) -> Result<(String, Vec<SqlValue>)> {
        let mut sql = String::new();
        let mut args = Vec::new();
        self.write_sql(table, &mut sql, &mut args)?;
        Ok((sql, args))
    }

    fn write_sql(
        &self,
        table: &TableSchema,
        sql: &mut String,
        args: &mut Vec<SqlValue>,
    ) -> Result<()> {
        match self {
            Self::Equal {
                column,
                value,
                negated,
            } => {
                sql.push_str(resolve(table, column)?);
                match (value.is_null(), negated) {
                    (true, false) => sql.push_str(" IS NULL"),
                    (true, true) => sql.push_str(" IS NOT NULL"),
                    (false, negated) => {
                        sql.push_str(if *negated { "<>?" } else { "=?" });
                        args.push(value.clone());
                    }
                }
            }
            Self::In { column, values } => {
                let name = resolve(table, column)?;
                if values.is_empty() {
                    sql.push_str("1=0");
                } else {
                    let marks = vec!["?"; values.len()].join(", ");
                    sql.push_str(&format!("{name} IN ({marks})"));
                    args.extend(values.iter().cloned());
                }
            }
            Self::Like { column, pattern } => {
                sql.push_str(resolve(table, column)?);
                sql.push_str(" LIKE ?");
                args.push(pattern.clone());
            }
            Self::And(parts) => {
                if parts.is_empty() {
                    sql.push_str("1=1");
                }
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(" AND ");
                    }
                    part.write_sql(table, sql, args)?;
                }
            }
        }
        Ok(())
    }
}

/// Property name first, then physical column name.
fn resolve<'t>(table: &'t TableSchema, column: &ColumnRef) -> Result<&'t str> {
    table
        .property(&column.property)
        .or_else(|| table.column(&column.property))
        .map(|meta| meta.name.as_str())
        .ok_or_else(|| QueryError::UnknownColumn {
            table: table.name.clone(),
            column: column.property.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ColumnDefinition, ColumnType, SqlType};
    use crate::lexer::Span;

    fn table() -> TableSchema {
        let mut t = TableSchema::new("t");
        for name in ["id", "name", "email_address"] {
            let ty = ColumnType {
                name: "INT".into(),
                sql_type: SqlType::Integer,
                length: None,
                scale: None,
            };
            t.add_column(&ColumnDefinition::new(name, ty, Span::default()));
        }
        t.map_property("email_address", "email");
        t
    }

    #[test]
    fn test_equality() {
        let (sql, args) = SqlConstraint::is_equal_to("id", 5).to_sql(&table()).unwrap();
        assert_eq!(sql, "id=?");
        assert_eq!(args, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn test_property_maps_to_physical_column() {
        let (sql, _) = column("email").is_like("%@x.org").to_sql(&table()).unwrap();
        assert_eq!(sql, "email_address LIKE ?");
    }

    #[test]
    fn test_membership() {
        let (sql, args) = column("id").is_in(vec![1, 2, 3]).to_sql(&table()).unwrap();
        assert_eq!(sql, "id IN (?, ?, ?)");
        assert_eq!(args.len(), 3);

        let (sql, args) = column("id").is_in(Vec::<i64>::new()).to_sql(&table()).unwrap();
        assert_eq!(sql, "1=0");
        assert!(args.is_empty());
    }

    #[test]
    fn test_conjunction_keeps_argument_order() {
        let c = column("name")
            .is_equal_to("bob")
            .and(column("id").is_in(vec![7, 8]))
            .and(column("id").is_not_equal_to(9));
        let (sql, args) = c.to_sql(&table()).unwrap();
        assert_eq!(sql, "name=? AND id IN (?, ?) AND id<>?");
        assert_eq!(
            args,
            vec![
                SqlValue::Text("bob".into()),
                SqlValue::Int(7),
                SqlValue::Int(8),
                SqlValue::Int(9)
            ]
        );
    }

    #[test]
    fn test_null_comparison() {
        let (sql, args) = column("name").is_equal_to(None::<String>).to_sql(&table()).unwrap();
        assert_eq!(sql, "name IS NULL");
        assert!(args.is_empty());
    }

    #[test]
    fn test_unknown_column() {
        let err = column("nope").is_equal_to(1).to_sql(&table()).unwrap_err();
        assert!(matches!(err, QueryError::UnknownColumn { ref column, .. } if column == "nope"));
    }
}
