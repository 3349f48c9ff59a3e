//! Error types for validation.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while configuring validators.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The format pattern does not compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Length bounds that cannot hold any value.
    #[error("invalid length range [{min}, {max}]")]
    InvalidLengthRange {
        /// Lower bound as given.
        min: i64,
        /// Upper bound as given.
        max: i64,
    },
}

/// Validation messages by column.
///
/// Columns appear in the order of their first message, which for
/// [`RecordValidator`](crate::RecordValidator) is registration order.
/// Column names compare ASCII case-insensitively. Serializes as a JSON
/// object with the same key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    columns: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` to the messages of `column`.
    pub fn add(&mut self, column: &str, message: impl Into<String>) {
        let message = message.into();
        match self.slot_mut(column) {
            Some(messages) => messages.push(message),
            None => self.columns.push((column.to_string(), vec![message])),
        }
    }

    /// Appends every message of `other`, keeping its column order for
    /// columns not seen yet.
    pub fn extend(&mut self, other: Self) {
        for (column, messages) in other.columns {
            match self.slot_mut(&column) {
                Some(existing) => existing.extend(messages),
                None => self.columns.push((column, messages)),
            }
        }
    }

    /// True when no column failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of failing columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Messages of one column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Vec<String>> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, messages)| messages)
    }

    /// Failing column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Every `(column, message)` pair in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().flat_map(|(column, messages)| {
            messages
                .iter()
                .map(move |message| (column.as_str(), message.as_str()))
        })
    }

    fn slot_mut(&mut self, column: &str) -> Option<&mut Vec<String>> {
        self.columns
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, messages)| messages)
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, messages) in &self.columns {
            map.serialize_entry(column, messages)?;
        }
        map.end()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (column, message) in self.iter() {
            writeln!(f, "{column}: {message}")?;
        }
        Ok(())
    }
}

/// Result type alias for validator configuration.
pub type Result<T> = std::result::Result<T, ValidateError>;
