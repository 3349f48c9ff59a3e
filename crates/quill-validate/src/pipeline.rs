//! Per-column validator registry.

use tracing::debug;

use crate::error::ValidationErrors;
use crate::record::Record;
use crate::validation::Validator;

/// Validators attached to physical column names.
///
/// Columns are kept in first-registration order and each column runs its
/// validators in registration order. A failing validator never stops the
/// ones after it.
#[derive(Default)]
pub struct RecordValidator {
    columns: Vec<(String, Vec<Box<dyn Validator>>)>,
}

impl RecordValidator {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `validator` to `column`.
    pub fn register(&mut self, column: impl Into<String>, validator: impl Validator + 'static) {
        let column = column.into();
        let validator: Box<dyn Validator> = Box::new(validator);
        match self
            .columns
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&column))
        {
            Some((_, validators)) => validators.push(validator),
            None => self.columns.push((column, vec![validator])),
        }
    }

    /// Builder form of [`Self::register`].
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.register(column, validator);
        self
    }

    /// Number of validators attached to `column`.
    #[must_use]
    pub fn validator_count(&self, column: &str) -> usize {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map_or(0, |(_, validators)| validators.len())
    }

    /// Runs every validator and collects the messages.
    #[must_use]
    pub fn validate(&self, record: &Record) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for (column, validators) in &self.columns {
            let value = record.get(column);
            for validator in validators {
                if value.is_null() && !validator.checks_null() {
                    continue;
                }
                if let Err(message) = validator.validate(column, value, record) {
                    debug!(column = %column, message = %message, "validation failed");
                    errors.add(column, message);
                }
            }
        }
        debug!(columns = errors.len(), "record validated");
        errors
    }

    /// True when [`Self::validate`] reports nothing.
    #[must_use]
    pub fn is_valid(&self, record: &Record) -> bool {
        self.validate(record).is_empty()
    }
}

impl std::fmt::Debug for RecordValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.columns
                    .iter()
                    .map(|(name, validators)| (name, validators.len())),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use quill_sql_core::SqlValue;

    use super::*;
    use crate::validation::{FormatValidator, LengthRange, OneOfValidator, RequiredValidator};

    #[test]
    fn test_accumulates_in_registration_order() {
        let pipeline = RecordValidator::new()
            .with(
                "code",
                FormatValidator::new()
                    .length(LengthRange::new(3, Some(3)))
                    .with_message("bad length"),
            )
            .with("code", OneOfValidator::new(["abc"]).with_message("not allowed"))
            .with("code", FormatValidator::new().pattern("[0-9]+").unwrap().with_message("digits"));

        let errors = pipeline.validate(&Record::new().with("code", "toolong"));
        assert_eq!(
            errors.get("code").unwrap(),
            &vec![
                "bad length".to_string(),
                "not allowed".to_string(),
                "digits".to_string()
            ]
        );
        assert_eq!(pipeline.validator_count("CODE"), 3);
    }

    #[test]
    fn test_null_only_reaches_required() {
        let pipeline = RecordValidator::new()
            .with("name", FormatValidator::new().length(LengthRange::new(1, None)))
            .with("name", RequiredValidator::new());

        let errors = pipeline.validate(&Record::new().with("name", SqlValue::Null));
        assert_eq!(errors.get("name").unwrap().len(), 1);
        assert_eq!(errors.get("name").unwrap()[0], "This field is required.");
    }

    #[test]
    fn test_errors_follow_registration_order() {
        let pipeline = RecordValidator::new()
            .with("zip", RequiredValidator::new())
            .with("city", RequiredValidator::new())
            .with("zip", FormatValidator::new().length(LengthRange::new(5, Some(5))));

        let errors = pipeline.validate(&Record::new());
        assert_eq!(errors.columns().collect::<Vec<_>>(), vec!["zip", "city"]);
        assert_eq!(errors.get("zip").map(Vec::len), Some(1));
    }

    #[test]
    fn test_is_valid() {
        let mut pipeline = RecordValidator::new();
        pipeline.register("status", OneOfValidator::new(["open", "closed"]));
        assert!(pipeline.is_valid(&Record::new().with("status", "open")));
        assert!(!pipeline.is_valid(&Record::new().with("status", "lost")));
        assert!(pipeline.is_valid(&Record::new()));
    }
}
