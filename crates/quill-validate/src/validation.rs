//! Column validators.

use regex::Regex;
use tracing::warn;

use quill_sql_core::builder::{column, QueryBuilder};
use quill_sql_core::{Executor, SqlValue, TableSchema};

use crate::error::{Result, ValidateError};
use crate::record::Record;

/// Trait for column validators.
pub trait Validator: Send + Sync {
    /// Validates the value of `column` and returns an error message if
    /// invalid. `record` gives access to the other columns of the row.
    ///
    /// # Errors
    ///
    /// Returns the message describing why the value was rejected.
    fn validate(&self, column: &str, value: &SqlValue, record: &Record)
        -> std::result::Result<(), String>;

    /// Whether the validator also runs on NULL. Only presence checks do.
    fn checks_null(&self) -> bool {
        false
    }
}

/// Validator that rejects NULL.
#[derive(Debug, Clone)]
pub struct RequiredValidator {
    message: String,
}

impl RequiredValidator {
    /// Creates a new RequiredValidator with default message.
    #[must_use]
    pub fn new() -> Self {
        Self {
            message: "This field is required.".to_string(),
        }
    }

    /// Creates a new RequiredValidator with custom message.
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for RequiredValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for RequiredValidator {
    fn validate(&self, _: &str, value: &SqlValue, _: &Record) -> std::result::Result<(), String> {
        if value.is_null() {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn checks_null(&self) -> bool {
        true
    }
}

/// Inclusive length bounds in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthRange {
    /// Minimum length.
    pub min: usize,
    /// Maximum length; `None` is unbounded.
    pub max: Option<usize>,
}

impl LengthRange {
    /// Creates a range; `max = None` is unbounded.
    #[must_use]
    pub const fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// Creates a range from integer bounds where `max = -1` means
    /// unbounded.
    ///
    /// # Errors
    ///
    /// Fails for a negative `min`, a negative `max` other than `-1`, or
    /// `max < min`.
    pub fn from_bounds(min: i64, max: i64) -> Result<Self> {
        let invalid = || ValidateError::InvalidLengthRange { min, max };
        let lower = usize::try_from(min).map_err(|_| invalid())?;
        let upper = match max {
            -1 => None,
            n => Some(usize::try_from(n).map_err(|_| invalid())?),
        };
        if upper.is_some_and(|upper| upper < lower) {
            return Err(invalid());
        }
        Ok(Self::new(lower, upper))
    }

    /// Whether `len` lies inside the range.
    #[must_use]
    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && self.max.is_none_or(|max| len <= max)
    }
}

/// Validator for a regex and/or a length range.
#[derive(Debug, Clone)]
pub struct FormatValidator {
    pattern: Option<Regex>,
    length: Option<LengthRange>,
    message: Option<String>,
}

impl FormatValidator {
    /// A validator with no rule; add one with [`Self::pattern`] or
    /// [`Self::length`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pattern: None,
            length: None,
            message: None,
        }
    }

    /// Requires the whole text to match `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::InvalidPattern`] if the regex does not
    /// compile.
    pub fn pattern(mut self, pattern: &str) -> Result<Self> {
        self.pattern = Some(Regex::new(&format!("^(?:{pattern})$"))?);
        Ok(self)
    }

    /// Requires the length to be within `range`.
    #[must_use]
    pub const fn length(mut self, range: LengthRange) -> Self {
        self.length = Some(range);
        self
    }

    /// Replaces the default messages.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn length_message(range: LengthRange) -> String {
        match range.max {
            Some(max) if max == range.min => {
                format!("Ensure this value has exactly {max} characters.")
            }
            Some(max) => format!(
                "Ensure this value has between {} and {max} characters.",
                range.min
            ),
            None => format!("Ensure this value has at least {} characters.", range.min),
        }
    }
}

impl Default for FormatValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for FormatValidator {
    fn validate(&self, _: &str, value: &SqlValue, _: &Record) -> std::result::Result<(), String> {
        let Some(text) = value.to_plain_text() else {
            return Ok(());
        };

        if let Some(range) = self.length {
            if !range.contains(text.chars().count()) {
                return Err(self
                    .message
                    .clone()
                    .unwrap_or_else(|| Self::length_message(range)));
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(&text) {
                return Err(self
                    .message
                    .clone()
                    .unwrap_or_else(|| "Enter a valid value.".to_string()));
            }
        }

        Ok(())
    }
}

/// Validator requiring membership in a fixed set.
///
/// Values are compared by their text form, so `1` matches `"1"`.
#[derive(Debug, Clone)]
pub struct OneOfValidator {
    allowed: Vec<String>,
    message: String,
}

impl OneOfValidator {
    /// Creates a validator accepting exactly `allowed`.
    #[must_use]
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        let message = format!(
            "Select a valid choice. Expected one of: {}.",
            allowed.join(", ")
        );
        Self { allowed, message }
    }

    /// Replaces the default message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Validator for OneOfValidator {
    fn validate(&self, _: &str, value: &SqlValue, _: &Record) -> std::result::Result<(), String> {
        match value.to_plain_text() {
            Some(text) if self.allowed.iter().any(|a| *a == text) => Ok(()),
            None if value.is_null() => Ok(()),
            _ => Err(self.message.clone()),
        }
    }
}

/// Validator rejecting a value another row already holds.
///
/// Runs a count query through the executor. When the table has a
/// single-column primary key and the record carries it, the record's own
/// row is excluded.
pub struct UniqueValidator<E> {
    executor: E,
    table: TableSchema,
    message: String,
}

impl<E: Executor> UniqueValidator<E> {
    /// Creates a validator checking `table` through `executor`.
    #[must_use]
    pub fn new(executor: E, table: TableSchema) -> Self {
        Self {
            executor,
            table,
            message: "A record with this value already exists.".to_string(),
        }
    }

    /// Replaces the default message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    fn property_of<'a>(&'a self, column_name: &'a str) -> &'a str {
        self.table
            .column(column_name)
            .map_or(column_name, |meta| meta.property.as_str())
    }
}

impl<E: Executor + Send + Sync> Validator for UniqueValidator<E> {
    fn validate(
        &self,
        column_name: &str,
        value: &SqlValue,
        record: &Record,
    ) -> std::result::Result<(), String> {
        let mut query = QueryBuilder::new(&self.table)
            .filter(column(self.property_of(column_name)).is_equal_to(value.clone()));

        if let [key] = self.table.primary_key.as_slice() {
            let own = record.get(key);
            if !own.is_null() && !key.eq_ignore_ascii_case(column_name) {
                query = query.filter(column(self.property_of(key)).is_not_equal_to(own.clone()));
            }
        }

        match query.exists(&self.executor) {
            Ok(true) => Err(self.message.clone()),
            Ok(false) => Ok(()),
            Err(e) => {
                warn!(table = %self.table.name, column = column_name, error = %e, "uniqueness check failed");
                Err(format!("Could not verify uniqueness: {e}"))
            }
        }
    }
}

impl<E> std::fmt::Debug for UniqueValidator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniqueValidator")
            .field("table", &self.table.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(v: &dyn Validator, value: SqlValue) -> std::result::Result<(), String> {
        v.validate("c", &value, &Record::new())
    }

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn test_required_validator() {
        let v = RequiredValidator::new();
        assert!(check(&v, text("hello")).is_ok());
        assert!(check(&v, text("")).is_ok());
        assert!(check(&v, SqlValue::Null).is_err());
        assert!(v.checks_null());
    }

    #[test]
    fn test_length_range_from_bounds() {
        let r = LengthRange::from_bounds(1, 5).unwrap();
        assert!(!r.contains(0));
        assert!(r.contains(3));
        assert!(!r.contains(6));

        let open = LengthRange::from_bounds(2, -1).unwrap();
        assert_eq!(open.max, None);
        assert!(open.contains(10_000));

        assert!(LengthRange::from_bounds(5, 1).is_err());
        assert!(LengthRange::from_bounds(-1, 3).is_err());
        assert!(LengthRange::from_bounds(0, -2).is_err());
    }

    #[test]
    fn test_format_length() {
        let v = FormatValidator::new().length(LengthRange::from_bounds(1, 5).unwrap());
        assert!(check(&v, text("")).is_err());
        assert!(check(&v, text("abcdef")).is_err());
        assert!(check(&v, text("abc")).is_ok());
        assert!(check(&v, text("héllo")).is_ok());
        assert_eq!(
            check(&v, text("")).unwrap_err(),
            "Ensure this value has between 1 and 5 characters."
        );
    }

    #[test]
    fn test_format_pattern_matches_whole_value() {
        let v = FormatValidator::new().pattern(r"\d{4}-\d{2}-\d{2}").unwrap();
        assert!(check(&v, text("2024-01-15")).is_ok());
        assert!(check(&v, text("x2024-01-15")).is_err());
        assert!(check(&v, SqlValue::Int(12)).is_err());
    }

    #[test]
    fn test_format_bad_pattern() {
        let err = FormatValidator::new().pattern("(").unwrap_err();
        assert!(matches!(err, ValidateError::InvalidPattern(_)));
    }

    #[test]
    fn test_one_of() {
        let v = OneOfValidator::new(["draft", "sent", "1"]);
        assert!(check(&v, text("sent")).is_ok());
        assert!(check(&v, SqlValue::Int(1)).is_ok());
        assert!(check(&v, text("lost")).is_err());
        assert!(!v.checks_null());
    }
}
