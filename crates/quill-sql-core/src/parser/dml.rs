//! INSERT / UPDATE / DELETE grammar.

use super::parser::Parser;
use crate::ast::{
    Assignment, ConflictResolution, DeleteStatement, Expression, InsertSource, InsertStatement,
    UpdateStatement,
};
use crate::lexer::{Keyword, TokenKind};

impl Parser<'_> {
    /// `INSERT [OR action] INTO t [(cols)] source` or `REPLACE INTO ...`
    pub(super) fn parse_insert(&mut self) -> InsertStatement {
        let start = self.current.span;
        let replace = self.eat_keyword(Keyword::Replace);
        let or_action = if replace {
            None
        } else {
            self.expect_keyword(Keyword::Insert);
            self.parse_conflict_resolution()
        };
        self.expect_keyword(Keyword::Into);
        let table = self.parse_qualified_name("table name");

        let columns = if self.check(&TokenKind::LeftParen) {
            self.parse_name_list()
        } else {
            Vec::new()
        };

        let source = if self.eat_keyword(Keyword::Values) {
            InsertSource::Values(self.parse_value_rows())
        } else if self.eat_keyword(Keyword::Default) {
            self.expect_keyword(Keyword::Values);
            InsertSource::DefaultValues
        } else {
            InsertSource::Query(Box::new(self.parse_select()))
        };

        InsertStatement {
            replace,
            or_action,
            table,
            columns,
            source,
            span: self.span_from(start),
        }
    }

    /// `(a, b), (c, d), ...` after VALUES.
    pub(super) fn parse_value_rows(&mut self) -> Vec<Vec<Expression>> {
        let mut rows = Vec::new();
        loop {
            self.expect(&TokenKind::LeftParen);
            rows.push(self.parse_expression_list());
            self.expect(&TokenKind::RightParen);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        rows
    }

    /// `OR (ROLLBACK | ABORT | FAIL | IGNORE | REPLACE)`
    fn parse_conflict_resolution(&mut self) -> Option<ConflictResolution> {
        if !self.eat_keyword(Keyword::Or) {
            return None;
        }
        let action = match self.current.as_keyword() {
            Some(Keyword::Rollback) => ConflictResolution::Rollback,
            Some(Keyword::Abort) => ConflictResolution::Abort,
            Some(Keyword::Fail) => ConflictResolution::Fail,
            Some(Keyword::Ignore) => ConflictResolution::Ignore,
            Some(Keyword::Replace) => ConflictResolution::Replace,
            _ => {
                self.error_expecting("ROLLBACK, ABORT, FAIL, IGNORE or REPLACE");
                return None;
            }
        };
        self.advance();
        Some(action)
    }

    /// `UPDATE [OR action] t SET col = expr, ... [WHERE expr]`
    pub(super) fn parse_update(&mut self) -> UpdateStatement {
        let start = self.current.span;
        self.expect_keyword(Keyword::Update);
        let or_action = self.parse_conflict_resolution();
        let table = self.parse_qualified_name("table name");
        self.expect_keyword(Keyword::Set);

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier("column name");
            self.expect(&TokenKind::Eq);
            let value = self.parse_expression();
            assignments.push(Assignment { column, value });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_expression())
        } else {
            None
        };

        UpdateStatement {
            or_action,
            table,
            assignments,
            where_clause,
            span: self.span_from(start),
        }
    }

    /// `DELETE FROM t [WHERE expr]`
    pub(super) fn parse_delete(&mut self) -> DeleteStatement {
        let start = self.current.span;
        self.expect_keyword(Keyword::Delete);
        self.expect_keyword(Keyword::From);
        let table = self.parse_qualified_name("table name");

        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_expression())
        } else {
            None
        };

        DeleteStatement {
            table,
            where_clause,
            span: self.span_from(start),
        }
    }
}
