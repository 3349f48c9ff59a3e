//! CREATE / ALTER / DROP TABLE grammar.

use super::parser::Parser;
use crate::ast::{
    AlterAction, AlterTable, ColumnChange, ColumnDefinition, ColumnType, Constraint,
    ConstraintKind, CreateTable, DropBehavior, DropTable, ForeignKeyRef, ReferentialAction,
    Sequence, SqlType, TableElement,
};
use crate::lexer::{Keyword, Span, TokenKind};

impl Parser<'_> {
    /// `CREATE [TEMP|TEMPORARY] TABLE [IF NOT EXISTS] [schema.]name
    /// ( element, ... ) [WITHOUT ROWID]`
    pub(super) fn parse_create_table(&mut self) -> CreateTable {
        let start = self.current.span;
        self.expect_keyword(Keyword::Create);
        let temporary = self.eat_keyword(Keyword::Temp) || self.eat_keyword(Keyword::Temporary);
        self.expect_keyword(Keyword::Table);

        let if_not_exists = if self.eat_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Not);
            self.expect_keyword(Keyword::Exists);
            true
        } else {
            false
        };

        let name = self.parse_qualified_name("table name");

        let mut elements = Vec::new();
        if self.expect(&TokenKind::LeftParen) {
            loop {
                elements.push(self.parse_table_element());
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RightParen);
        }

        let without_rowid = if self.eat_keyword(Keyword::Without) {
            self.expect_keyword(Keyword::Rowid);
            true
        } else {
            false
        };

        CreateTable {
            temporary,
            if_not_exists,
            name,
            elements,
            without_rowid,
            span: self.span_from(start),
        }
    }

    /// A column when the entry starts with a name, a constraint otherwise.
    fn parse_table_element(&mut self) -> TableElement {
        if self.check_identifier() {
            TableElement::Column(self.parse_column_definition())
        } else {
            TableElement::Constraint(self.parse_table_constraint())
        }
    }

    fn starts_table_constraint(&self) -> bool {
        matches!(
            self.current.as_keyword(),
            Some(
                Keyword::Constraint
                    | Keyword::Primary
                    | Keyword::Unique
                    | Keyword::Check
                    | Keyword::Foreign
            )
        )
    }

    pub(super) fn parse_column_definition(&mut self) -> ColumnDefinition {
        let start = self.current.span;
        let name = self.expect_identifier("column name");
        self.parse_column_rest(name, start)
    }

    /// Everything after the column name, in the fixed order: type, DEFAULT,
    /// NOT NULL / NULL, AUTO_INCREMENT / IDENTITY, UNIQUE, PRIMARY KEY,
    /// CHECK.
    fn parse_column_rest(&mut self, name: String, start: Span) -> ColumnDefinition {
        let column_type = self.parse_column_type();
        let implied_identity = SqlType::from_name(&column_type.name).1;
        let mut column = ColumnDefinition::new(name, column_type, start);
        column.auto_increment = implied_identity;

        if self.eat_keyword(Keyword::Default) {
            column.default = Some(self.parse_term());
        }

        if self.eat_keyword(Keyword::Not) {
            self.expect_keyword(Keyword::Null);
            column.not_null = true;
        } else if self.eat_keyword(Keyword::Null) {
            column.null = true;
        }

        if self.eat_keyword(Keyword::Autoincrement) || self.eat_keyword(Keyword::Identity) {
            column.auto_increment = true;
            if self.eat(&TokenKind::LeftParen) {
                let start = self.expect_signed("start value");
                let increment = if self.eat(&TokenKind::Comma) {
                    self.expect_signed("increment")
                } else {
                    1
                };
                self.expect(&TokenKind::RightParen);
                column.sequence = Some(Sequence { start, increment });
            }
        }

        if self.eat_keyword(Keyword::Unique) {
            column.unique = true;
        }

        if self.eat_keyword(Keyword::Primary) {
            self.expect_keyword(Keyword::Key);
            column.primary_key = true;
            column.primary_key_hash = self.eat_keyword(Keyword::Hash);
        }

        if self.eat_keyword(Keyword::Check) {
            self.expect(&TokenKind::LeftParen);
            column.check = Some(self.parse_expression());
            self.expect(&TokenKind::RightParen);
        }

        column.span = self.span_from(start);
        column
    }

    /// Type name plus `(length[, scale])` for types that take one.
    pub(super) fn parse_column_type(&mut self) -> ColumnType {
        let mut name = self.expect_identifier("type name");

        let second = match (name.to_ascii_lowercase().as_str(), &self.current.kind) {
            ("double", TokenKind::Identifier(next)) if next.lower == "precision" => Some(()),
            ("character", TokenKind::Identifier(next)) if next.lower == "varying" => Some(()),
            _ => None,
        };
        if second.is_some() {
            name = format!("{name} {}", self.current.text);
            self.advance();
        }

        let (sql_type, _) = SqlType::from_name(&name);
        let mut column_type = ColumnType {
            name,
            sql_type,
            length: None,
            scale: None,
        };

        if sql_type.accepts_length() && self.eat(&TokenKind::LeftParen) {
            column_type.length = Some(self.expect_unsigned("length"));
            if self.eat(&TokenKind::Comma) {
                column_type.scale = Some(self.expect_unsigned("scale"));
            }
            self.expect(&TokenKind::RightParen);
        }

        column_type
    }

    /// `[CONSTRAINT name] (PRIMARY KEY [HASH] | UNIQUE | CHECK | FOREIGN KEY) ...`
    fn parse_table_constraint(&mut self) -> Constraint {
        let start = self.current.span;
        let name = if self.eat_keyword(Keyword::Constraint) {
            Some(self.expect_identifier("constraint name"))
        } else {
            None
        };

        let mut constraint = match self.current.as_keyword() {
            Some(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key);
                let kind = if self.eat_keyword(Keyword::Hash) {
                    ConstraintKind::PrimaryHash
                } else {
                    ConstraintKind::Primary
                };
                Constraint::new(kind, self.parse_name_list(), start)
            }
            Some(Keyword::Unique) => {
                self.advance();
                self.eat_keyword(Keyword::Key);
                Constraint::new(ConstraintKind::Unique, self.parse_name_list(), start)
            }
            Some(Keyword::Check) => {
                self.advance();
                self.expect(&TokenKind::LeftParen);
                let expr = self.parse_expression();
                self.expect(&TokenKind::RightParen);
                let mut constraint = Constraint::new(ConstraintKind::Check, Vec::new(), start);
                constraint.check = Some(expr);
                constraint
            }
            Some(Keyword::Foreign) => {
                self.advance();
                self.expect_keyword(Keyword::Key);
                let columns = self.parse_name_list();
                let mut constraint = Constraint::new(ConstraintKind::Foreign, columns, start);
                constraint.references = Some(self.parse_references());
                constraint
            }
            _ => {
                self.error_expecting("PRIMARY, UNIQUE, CHECK or FOREIGN");
                Constraint::new(ConstraintKind::Check, Vec::new(), start)
            }
        };

        constraint.name = name;
        constraint.span = self.span_from(start);
        constraint
    }

    /// `REFERENCES t [(cols)] [ON (DELETE|UPDATE) action]*`
    ///
    /// A repeated ON clause for the same event overwrites the earlier one.
    fn parse_references(&mut self) -> ForeignKeyRef {
        self.expect_keyword(Keyword::References);
        let table = self.parse_qualified_name("table name");
        let columns = if self.check(&TokenKind::LeftParen) {
            self.parse_name_list()
        } else {
            Vec::new()
        };

        let mut fk = ForeignKeyRef {
            table,
            columns,
            on_delete: None,
            on_update: None,
        };

        while self.eat_keyword(Keyword::On) {
            if self.eat_keyword(Keyword::Delete) {
                fk.on_delete = Some(self.parse_referential_action());
            } else if self.expect_keyword(Keyword::Update) {
                fk.on_update = Some(self.parse_referential_action());
            }
        }
        fk
    }

    fn parse_referential_action(&mut self) -> ReferentialAction {
        match self.current.as_keyword() {
            Some(Keyword::Cascade) => {
                self.advance();
                ReferentialAction::Cascade
            }
            Some(Keyword::Restrict) => {
                self.advance();
                ReferentialAction::Restrict
            }
            Some(Keyword::No) => {
                self.advance();
                self.expect_keyword(Keyword::Action);
                ReferentialAction::NoAction
            }
            Some(Keyword::Set) => {
                self.advance();
                if self.eat_keyword(Keyword::Default) {
                    ReferentialAction::SetDefault
                } else {
                    self.expect_keyword(Keyword::Null);
                    ReferentialAction::SetNull
                }
            }
            _ => {
                self.error_expecting("CASCADE, RESTRICT, NO ACTION, SET NULL or SET DEFAULT");
                ReferentialAction::Restrict
            }
        }
    }

    /// `ALTER TABLE name (ADD | ALTER | DROP | RENAME) ...`
    pub(super) fn parse_alter_table(&mut self) -> AlterTable {
        let start = self.current.span;
        self.expect_keyword(Keyword::Alter);
        self.expect_keyword(Keyword::Table);
        let table = self.parse_qualified_name("table name");

        let action = match self.current.as_keyword() {
            Some(Keyword::Add) => {
                self.advance();
                if self.starts_table_constraint() {
                    AlterAction::AddConstraint(self.parse_table_constraint())
                } else {
                    self.eat_keyword(Keyword::Column);
                    AlterAction::AddColumn(self.parse_column_definition())
                }
            }
            Some(Keyword::Alter) => {
                self.advance();
                self.parse_alter_column()
            }
            Some(Keyword::Drop) => {
                self.advance();
                if self.eat_keyword(Keyword::Constraint) {
                    AlterAction::DropConstraint(self.expect_identifier("constraint name"))
                } else if self.eat_keyword(Keyword::Primary) {
                    self.expect_keyword(Keyword::Key);
                    AlterAction::DropPrimaryKey
                } else {
                    self.eat_keyword(Keyword::Column);
                    AlterAction::DropColumn(self.expect_identifier("column name"))
                }
            }
            Some(Keyword::Rename) => {
                self.advance();
                if self.eat_keyword(Keyword::To) {
                    AlterAction::RenameTable(self.expect_identifier("table name"))
                } else {
                    self.eat_keyword(Keyword::Column);
                    let from = self.expect_identifier("column name");
                    self.expect_keyword(Keyword::To);
                    let to = self.expect_identifier("column name");
                    AlterAction::RenameColumn { from, to }
                }
            }
            _ => {
                self.error_expecting("ADD, ALTER, DROP or RENAME");
                AlterAction::RenameTable(String::new())
            }
        };

        AlterTable {
            table,
            action,
            span: self.span_from(start),
        }
    }

    /// After `ALTER`: `[COLUMN] name` then a change or a full redefinition.
    ///
    /// `ALTER COLUMN` followed by two names is a column literally called
    /// `column`, told apart by looking one token ahead.
    fn parse_alter_column(&mut self) -> AlterAction {
        if self.check_keyword(Keyword::Column) && self.peek_starts_name() {
            self.advance();
        }
        let start = self.current.span;
        let column = self.expect_identifier("column name");

        let change = match self.current.as_keyword() {
            Some(Keyword::Rename) => {
                self.advance();
                self.expect_keyword(Keyword::To);
                ColumnChange::Rename(self.expect_identifier("column name"))
            }
            Some(Keyword::Set) => {
                self.advance();
                if self.eat_keyword(Keyword::Default) {
                    ColumnChange::SetDefault(self.parse_term())
                } else if self.eat_keyword(Keyword::Not) {
                    self.expect_keyword(Keyword::Null);
                    ColumnChange::SetNotNull
                } else {
                    self.expect_keyword(Keyword::Null);
                    ColumnChange::SetNull
                }
            }
            Some(Keyword::Drop) => {
                self.advance();
                if self.eat_keyword(Keyword::Default) {
                    ColumnChange::DropDefault
                } else {
                    self.expect_keyword(Keyword::Not);
                    self.expect_keyword(Keyword::Null);
                    ColumnChange::DropNotNull
                }
            }
            _ => ColumnChange::Redefine(self.parse_column_rest(column.clone(), start)),
        };

        AlterAction::AlterColumn { column, change }
    }

    fn peek_starts_name(&mut self) -> bool {
        match &self.peek().kind {
            TokenKind::Identifier(_) => true,
            TokenKind::Keyword(kw) => !kw.is_reserved(),
            _ => false,
        }
    }

    /// `DROP TABLE [IF EXISTS] name, ... [CASCADE | RESTRICT]`
    pub(super) fn parse_drop_table(&mut self) -> DropTable {
        let start = self.current.span;
        self.expect_keyword(Keyword::Drop);
        self.expect_keyword(Keyword::Table);

        let if_exists = if self.eat_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Exists);
            true
        } else {
            false
        };

        let mut names = vec![self.parse_qualified_name("table name")];
        while self.eat(&TokenKind::Comma) {
            names.push(self.parse_qualified_name("table name"));
        }

        let behavior = if self.eat_keyword(Keyword::Cascade) {
            Some(DropBehavior::Cascade)
        } else if self.eat_keyword(Keyword::Restrict) {
            Some(DropBehavior::Restrict)
        } else {
            None
        };

        DropTable {
            if_exists,
            names,
            behavior,
            span: self.span_from(start),
        }
    }
}
