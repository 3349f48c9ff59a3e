//! Parser error types.

use serde::Serialize;
use thiserror::Error;

use crate::lexer::{Span, Token};

/// Whether an error comes from the grammar or from name/type rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseErrorKind {
    /// A token did not match the grammar.
    Syntax,
    /// Well-formed input that breaks a semantic rule.
    Semantic,
}

/// A positioned parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{line}, {column}: {message}")]
pub struct ParseError {
    /// Error kind.
    pub kind: ParseErrorKind,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    /// Byte offset.
    pub offset: usize,
    /// The error message.
    pub message: String,
    /// What the parser expected (syntax errors only).
    pub expected: Option<String>,
    /// The text of the token found instead.
    pub found: Option<String>,
}

impl ParseError {
    /// Creates an "Expecting X but found Y" error at an explicit position.
    #[must_use]
    pub fn expecting(expected: &str, found: &Token, position: (usize, usize), offset: usize) -> Self {
        let found = found.describe();
        Self {
            kind: ParseErrorKind::Syntax,
            line: position.0,
            column: position.1,
            offset,
            message: format!("Expecting {expected} but found {found}"),
            expected: Some(String::from(expected)),
            found: Some(found),
        }
    }

    /// Creates a semantic error at the start of `span`.
    #[must_use]
    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::Semantic,
            line: span.line,
            column: span.column,
            offset: span.start,
            message: message.into(),
            expected: None,
            found: None,
        }
    }
}
