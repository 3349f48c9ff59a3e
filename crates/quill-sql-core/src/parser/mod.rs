//! SQL Parser
//!
//! A hand-written recursive descent parser. Each grammar production is one
//! method on [`Parser`]; the productions are split by statement family.
//! Errors are collected rather than returned, so one session reports every
//! broken statement and still yields the well-formed ones.

mod ddl;
mod dml;
mod error;
mod expr;
mod options;
#[allow(clippy::module_inception)]
mod parser;
mod query;

pub use error::{ParseError, ParseErrorKind};
pub use options::{ParamScope, ParserOptions, Retention};
pub use parser::{ParseOutput, Parser};
