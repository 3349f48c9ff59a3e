//! # quill-validate
//!
//! Declarative per-column validation of raw record values.
//!
//! This crate provides:
//! - A [`Record`] of column values, read from an executor [`Row`](quill_sql_core::Row)
//!   or built by hand
//! - Format, length, required, set-membership and uniqueness validators
//! - A [`RecordValidator`] pipeline collecting every message per column
//!
//! ## Quick Start
//!
//! ```rust
//! use quill_validate::{Record, RecordValidator};
//! use quill_validate::validation::{FormatValidator, LengthRange, RequiredValidator};
//!
//! let pipeline = RecordValidator::new()
//!     .with("username", RequiredValidator::new())
//!     .with(
//!         "username",
//!         FormatValidator::new().length(LengthRange::from_bounds(1, 5).unwrap()),
//!     );
//!
//! assert!(pipeline.is_valid(&Record::new().with("username", "bob")));
//!
//! let errors = pipeline.validate(&Record::new().with("username", "robert"));
//! assert_eq!(
//!     errors.get("username").unwrap()[0],
//!     "Ensure this value has between 1 and 5 characters."
//! );
//! ```
//!
//! ## Uniqueness
//!
//! [`UniqueValidator`](validation::UniqueValidator) runs a count query
//! through any [`Executor`](quill_sql_core::Executor):
//!
//! ```rust
//! use quill_sql_core::{ExecError, Executor, Parser, Row, Schema, SqlValue};
//! use quill_validate::validation::UniqueValidator;
//! use quill_validate::{Record, RecordValidator};
//!
//! struct Taken;
//!
//! impl Executor for Taken {
//!     fn execute(&self, _sql: &str, _args: &[SqlValue]) -> Result<Vec<Row>, ExecError> {
//!         Ok(vec![Row::new().with("count", SqlValue::Int(1))])
//!     }
//! }
//!
//! let out = Parser::new("CREATE TABLE users (id INT PRIMARY KEY, email TEXT)").parse();
//! let schema = Schema::from_statements(&out.statements);
//! let users = schema.table("users").unwrap().clone();
//!
//! let pipeline = RecordValidator::new().with("email", UniqueValidator::new(Taken, users));
//! assert!(!pipeline.is_valid(&Record::new().with("email", "a@b.c")));
//! ```

mod error;
mod pipeline;
mod record;
pub mod validation;

pub use error::{Result, ValidateError, ValidationErrors};
pub use pipeline::RecordValidator;
pub use record::Record;
