//! SQL Parser implementation: statement loop, error recovery and the token
//! helpers shared by the grammar modules.

use std::collections::HashMap;

use tracing::debug;

use super::error::ParseError;
use super::options::{ParamScope, ParserOptions, Retention};
use crate::ast::{CreateTable, QualifiedName, Statement};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// Result of one parse session.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    /// Statements that parsed without error, in source order.
    pub statements: Vec<Statement>,
    /// Best-effort trees of statements that reported an error.
    pub recovered: Vec<Statement>,
    /// Errors in source order, at most one per statement.
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    /// True when no error was reported.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The well-formed CREATE TABLE statements.
    pub fn create_tables(&self) -> impl Iterator<Item = &CreateTable> {
        self.statements.iter().filter_map(Statement::as_create_table)
    }
}

/// SQL Parser.
///
/// One parser handles one input; [`Parser::parse`] consumes it. Syntax
/// errors never abort the session: the first error of a statement is
/// recorded, the rest of that statement is skipped up to the next `;`, and
/// parsing resumes with the following statement.
pub struct Parser<'a> {
    pub(super) lexer: Lexer<'a>,
    pub(super) current: Token,
    pub(super) previous: Token,
    options: ParserOptions,
    errors: Vec<ParseError>,
    /// Set once the current statement has reported an error.
    panicking: bool,
    /// Declared named parameter types, keyed by lowercase name.
    pub(super) params: HashMap<String, String>,
    /// `?` placeholders seen in the current statement.
    pub(super) placeholder_count: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser with default options.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, ParserOptions::default())
    }

    /// Creates a new parser with the given options.
    #[must_use]
    pub fn with_options(input: &'a str, options: ParserOptions) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: Token::new(TokenKind::Eof, Span::default(), ""),
            options,
            errors: Vec::new(),
            panicking: false,
            params: HashMap::new(),
            placeholder_count: 0,
        }
    }

    /// Parses every `;`-separated statement of the input.
    #[must_use]
    pub fn parse(mut self) -> ParseOutput {
        let mut output = ParseOutput::default();

        loop {
            while self.eat(&TokenKind::Semicolon) {}
            if self.current.is_eof() {
                break;
            }

            self.begin_statement();
            let statement = self.parse_statement();
            if !self.check(&TokenKind::Semicolon) && !self.current.is_eof() {
                self.error_expecting("';'");
            }

            let failed = self.panicking;
            if failed {
                self.synchronize();
            }

            if self.options.retention == Retention::DdlOnly
                && !matches!(statement, Statement::CreateTable(_))
            {
                debug!(kind = statement.kind_name(), "statement not retained");
                continue;
            }
            if failed {
                output.recovered.push(statement);
            } else {
                output.statements.push(statement);
            }
        }

        output.errors = core::mem::take(&mut self.errors);
        debug!(
            statements = output.statements.len(),
            recovered = output.recovered.len(),
            errors = output.errors.len(),
            "parsed SQL batch"
        );
        output
    }

    fn begin_statement(&mut self) {
        self.panicking = false;
        self.placeholder_count = 0;
        if self.options.param_scope == ParamScope::Statement {
            self.params.clear();
        }
    }

    /// Skips to the next statement boundary.
    fn synchronize(&mut self) {
        while !self.check(&TokenKind::Semicolon) && !self.current.is_eof() {
            self.advance();
        }
    }

    fn parse_statement(&mut self) -> Statement {
        match self.current.as_keyword() {
            Some(Keyword::Create) => Statement::CreateTable(self.parse_create_table()),
            Some(Keyword::Alter) => Statement::AlterTable(self.parse_alter_table()),
            Some(Keyword::Drop) => Statement::DropTable(self.parse_drop_table()),
            Some(Keyword::Insert | Keyword::Replace) => Statement::Insert(self.parse_insert()),
            Some(Keyword::Update) => Statement::Update(self.parse_update()),
            Some(Keyword::Delete) => Statement::Delete(self.parse_delete()),
            _ => Statement::Select(self.parse_select()),
        }
    }

    // Error reporting

    /// Records "Expecting `expected` but found ..." at the current token.
    ///
    /// Only the first error of a statement is kept. At end of input the
    /// position is the one right after the previous token.
    pub(super) fn error_expecting(&mut self, expected: &str) {
        if self.panicking {
            return;
        }
        self.panicking = true;

        let (position, offset) = if self.current.is_eof() {
            (self.previous.span.end_position(), self.previous.span.end)
        } else {
            (
                (self.current.span.line, self.current.span.column),
                self.current.span.start,
            )
        };
        let error = ParseError::expecting(expected, &self.current, position, offset);
        debug!(
            line = error.line,
            column = error.column,
            message = %error.message,
            "syntax error"
        );
        self.errors.push(error);
    }

    /// Records a semantic error; it fails the current statement.
    pub(super) fn error_semantic(&mut self, message: String, span: Span) {
        if self.panicking {
            return;
        }
        self.panicking = true;
        let error = ParseError::semantic(message, span);
        debug!(
            line = error.line,
            column = error.column,
            message = %error.message,
            "semantic error"
        );
        self.errors.push(error);
    }

    // Token helpers

    pub(super) fn advance(&mut self) {
        self.previous = core::mem::replace(&mut self.current, self.lexer.next_token());
    }

    /// The token after the current one.
    pub(super) fn peek(&mut self) -> &Token {
        self.lexer.peek()
    }

    /// The token `n + 1` positions after the current one.
    pub(super) fn peek_nth(&mut self, n: usize) -> &Token {
        self.lexer.peek_nth(n)
    }

    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    pub(super) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current.as_keyword() == Some(keyword)
    }

    /// Consumes the token if it matches.
    pub(super) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the keyword if it matches.
    pub(super) fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the token or records an error.
    pub(super) fn expect(&mut self, kind: &TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error_expecting(&format!("'{kind}'"));
            false
        }
    }

    /// Consumes the keyword or records an error.
    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> bool {
        if self.eat_keyword(keyword) {
            true
        } else {
            self.error_expecting(keyword.as_str());
            false
        }
    }

    /// Identifiers and non-reserved keywords can name things.
    pub(super) fn check_identifier(&self) -> bool {
        match &self.current.kind {
            TokenKind::Identifier(_) => true,
            TokenKind::Keyword(kw) => !kw.is_reserved(),
            _ => false,
        }
    }

    /// Consumes a name and returns it in source case.
    ///
    /// On mismatch records an error and returns an empty placeholder.
    pub(super) fn expect_identifier(&mut self, what: &str) -> String {
        let name = match &self.current.kind {
            TokenKind::Identifier(ident) => ident.original.clone(),
            TokenKind::Keyword(kw) if !kw.is_reserved() => self.current.text.clone(),
            _ => {
                self.error_expecting(what);
                return String::new();
            }
        };
        self.advance();
        name
    }

    /// `name` or `schema.name`.
    pub(super) fn parse_qualified_name(&mut self, what: &str) -> QualifiedName {
        let first = self.expect_identifier(what);
        if self.eat(&TokenKind::Dot) {
            let name = self.expect_identifier(what);
            QualifiedName {
                schema: Some(first),
                name,
            }
        } else {
            QualifiedName::new(first)
        }
    }

    /// `( name [ASC|DESC], ... )`
    pub(super) fn parse_name_list(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        if !self.expect(&TokenKind::LeftParen) {
            return names;
        }
        loop {
            names.push(self.expect_identifier("column name"));
            if !self.eat_keyword(Keyword::Asc) {
                self.eat_keyword(Keyword::Desc);
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen);
        names
    }

    /// A non-negative integer literal that fits in `u32`.
    pub(super) fn expect_unsigned(&mut self, what: &str) -> u32 {
        if let TokenKind::Integer(n) = self.current.kind {
            if let Ok(n) = u32::try_from(n) {
                self.advance();
                return n;
            }
        }
        self.error_expecting(what);
        0
    }

    /// An optionally signed integer literal.
    pub(super) fn expect_signed(&mut self, what: &str) -> i64 {
        let negative = self.eat(&TokenKind::Minus);
        if let TokenKind::Integer(n) = self.current.kind {
            self.advance();
            return if negative { -n } else { n };
        }
        self.error_expecting(what);
        0
    }

    /// Span from `start` through the previous token.
    pub(super) fn span_from(&self, start: Span) -> Span {
        if self.previous.span.start < start.start {
            start
        } else {
            start.merge(self.previous.span)
        }
    }
}
