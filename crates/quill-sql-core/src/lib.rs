//! # quill-sql-core
//!
//! A hand-written SQL front end.
//!
//! This crate provides:
//! - A lexer producing positioned tokens; it never fails, unknown input
//!   becomes an `Unknown` token
//! - A recursive descent parser for CREATE/ALTER/DROP TABLE, INSERT,
//!   UPDATE, DELETE and SELECT that collects errors and recovers at
//!   statement boundaries
//! - A schema model extracted from the parsed DDL
//! - A parameterized query/constraint builder handing `(sql, args)` to an
//!   external [`Executor`]
//!
//! ## Parsing
//!
//! ```rust
//! let out = quill_sql_core::parse("CREATE TABLE a(id int); CREATE TABLE b(id int)");
//! assert!(out.is_ok());
//! assert_eq!(out.create_tables().count(), 2);
//! ```
//!
//! ## Error recovery
//!
//! One broken statement does not hide the others:
//!
//! ```rust
//! let out = quill_sql_core::parse("CREATE TABLE contacts; CREATE TABLE b(id int)");
//! assert_eq!(out.errors.len(), 1);
//! assert_eq!(out.errors[0].to_string(), "1, 22: Expecting '(' but found ;");
//! assert_eq!(out.statements.len(), 1);
//! ```

pub mod ast;
pub mod builder;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod schema;

pub use ast::Statement;
pub use builder::{column, QueryBuilder, QueryError, SqlConstraint, SqlValue};
pub use executor::{ExecError, Executor, Row};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseError, ParseOutput, Parser, ParserOptions};
pub use schema::{Schema, TableSchema};

/// Parses `sql` with default options.
#[must_use]
pub fn parse(sql: &str) -> ParseOutput {
    Parser::new(sql).parse()
}
