//! Raw column values of one row under validation.

use quill_sql_core::builder::ToSqlValue;
use quill_sql_core::{Row, SqlValue};

static NULL: SqlValue = SqlValue::Null;

/// Values keyed by physical column name. Missing columns read as NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: Vec<(String, SqlValue)>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column, replacing an earlier value (ASCII case-insensitive).
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl ToSqlValue) -> Self {
        self.set(column, value);
        self
    }

    /// Sets a column in place.
    pub fn set(&mut self, column: impl Into<String>, value: impl ToSqlValue) {
        let column = column.into();
        let value = value.to_sql_value();
        match self
            .values
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&column))
        {
            Some(slot) => slot.1 = value,
            None => self.values.push((column, value)),
        }
    }

    /// The value of a column, NULL when absent.
    #[must_use]
    pub fn get(&self, column: &str) -> &SqlValue {
        self.values
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map_or(&NULL, |(_, value)| value)
    }

    /// Columns in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl From<&Row> for Record {
    fn from(row: &Row) -> Self {
        let mut record = Self::new();
        for (column, value) in row.iter() {
            record.set(column, value.clone());
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_is_null() {
        let r = Record::new().with("a", SqlValue::Int(1));
        assert_eq!(r.get("A"), &SqlValue::Int(1));
        assert!(r.get("b").is_null());
    }

    #[test]
    fn test_set_replaces() {
        let r = Record::new()
            .with("name", "a")
            .with("NAME", "b");
        assert_eq!(r.iter().count(), 1);
        assert_eq!(r.get("name").as_text(), Some("b"));
    }

    #[test]
    fn test_from_row() {
        let row = Row::new().with("id", SqlValue::Int(3));
        assert_eq!(Record::from(&row).get("id"), &SqlValue::Int(3));
    }
}
