//! Expression grammar.
//!
//! One method per precedence level; each loops while its operator class
//! keeps matching. CASE arms are collected in a loop rather than by
//! recursing once per WHEN.

use super::parser::Parser;
use crate::ast::{
    AddOp, AndCondition, CaseExpression, CompareOp, Condition, Expression, Factor, FunctionCall,
    InList, Literal, MulOp, NamedParam, Operand, Path, Placeholder, Predicate, Summand, Term,
    WhenClause,
};
use crate::lexer::{Keyword, TokenKind};

impl Parser<'_> {
    /// `AndCondition (OR AndCondition)*`
    pub(super) fn parse_expression(&mut self) -> Expression {
        let mut terms = vec![self.parse_and_condition()];
        while self.eat_keyword(Keyword::Or) {
            terms.push(self.parse_and_condition());
        }
        Expression { terms }
    }

    /// Comma-separated expressions.
    pub(super) fn parse_expression_list(&mut self) -> Vec<Expression> {
        let mut exprs = vec![self.parse_expression()];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_expression());
        }
        exprs
    }

    fn parse_and_condition(&mut self) -> AndCondition {
        let mut conditions = vec![self.parse_condition()];
        while self.eat_keyword(Keyword::And) || self.eat(&TokenKind::AndAnd) {
            conditions.push(self.parse_condition());
        }
        AndCondition { conditions }
    }

    fn parse_condition(&mut self) -> Condition {
        let mut negations = 0usize;
        while self.eat_keyword(Keyword::Not) {
            negations += 1;
        }

        let mut condition = if self.eat_keyword(Keyword::Exists) {
            self.expect(&TokenKind::LeftParen);
            let query = self.parse_select();
            self.expect(&TokenKind::RightParen);
            Condition::Exists(Box::new(query))
        } else {
            let left = self.parse_operand();
            let predicate = self.parse_predicate();
            Condition::Test { left, predicate }
        };

        for _ in 0..negations {
            condition = Condition::Not(Box::new(condition));
        }
        condition
    }

    fn parse_predicate(&mut self) -> Option<Predicate> {
        let op = match self.current.kind {
            TokenKind::Eq => Some(CompareOp::Eq),
            TokenKind::NotEq => Some(CompareOp::NotEq),
            TokenKind::Lt => Some(CompareOp::Lt),
            TokenKind::LtEq => Some(CompareOp::LtEq),
            TokenKind::Gt => Some(CompareOp::Gt),
            TokenKind::GtEq => Some(CompareOp::GtEq),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let right = self.parse_operand();
            return Some(Predicate::Comparison { op, right });
        }

        if self.eat_keyword(Keyword::Is) {
            let negated = self.eat_keyword(Keyword::Not);
            if self.eat_keyword(Keyword::Null) {
                return Some(Predicate::IsNull { negated });
            }
            let right = self.parse_operand();
            return Some(Predicate::Is { negated, right });
        }

        // NOT only belongs to the predicate when one of its keywords follows
        let negated = self.check_keyword(Keyword::Not)
            && matches!(
                self.peek().as_keyword(),
                Some(Keyword::Between | Keyword::In | Keyword::Like | Keyword::Regexp)
            );
        if negated {
            self.advance();
        }

        match self.current.as_keyword() {
            Some(Keyword::Between) => {
                self.advance();
                let low = self.parse_operand();
                self.expect_keyword(Keyword::And);
                let high = self.parse_operand();
                Some(Predicate::Between { negated, low, high })
            }
            Some(Keyword::In) => {
                self.advance();
                let list = self.parse_in_list();
                Some(Predicate::In { negated, list })
            }
            Some(Keyword::Like) => {
                self.advance();
                let pattern = self.parse_operand();
                let escape = if self.eat_keyword(Keyword::Escape) {
                    Some(self.parse_operand())
                } else {
                    None
                };
                Some(Predicate::Like {
                    negated,
                    pattern,
                    escape,
                })
            }
            Some(Keyword::Regexp) => {
                self.advance();
                let pattern = self.parse_operand();
                Some(Predicate::Regexp { negated, pattern })
            }
            _ => None,
        }
    }

    fn parse_in_list(&mut self) -> InList {
        self.expect(&TokenKind::LeftParen);
        let list = if self.starts_query() {
            InList::Subquery(Box::new(self.parse_select()))
        } else if self.check(&TokenKind::RightParen) {
            InList::Values(Vec::new())
        } else {
            InList::Values(self.parse_expression_list())
        };
        self.expect(&TokenKind::RightParen);
        list
    }

    /// `Summand (|| Summand)*`
    pub(super) fn parse_operand(&mut self) -> Operand {
        let mut parts = vec![self.parse_summand()];
        while self.eat(&TokenKind::Concat) {
            parts.push(self.parse_summand());
        }
        Operand { parts }
    }

    fn parse_summand(&mut self) -> Summand {
        let first = self.parse_factor();
        let mut rest = Vec::new();
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => AddOp::Add,
                TokenKind::Minus => AddOp::Sub,
                _ => break,
            };
            self.advance();
            rest.push((op, self.parse_factor()));
        }
        Summand { first, rest }
    }

    fn parse_factor(&mut self) -> Factor {
        let first = self.parse_term();
        let mut rest = Vec::new();
        loop {
            let op = match self.current.kind {
                TokenKind::Star => MulOp::Mul,
                TokenKind::Slash => MulOp::Div,
                TokenKind::Percent => MulOp::Mod,
                _ => break,
            };
            self.advance();
            rest.push((op, self.parse_term()));
        }
        Factor { first, rest }
    }

    /// Whether the current token opens a subquery (`SELECT`, `WITH`, `VALUES`).
    pub(super) fn starts_query(&self) -> bool {
        matches!(
            self.current.as_keyword(),
            Some(Keyword::Select | Keyword::With | Keyword::Values)
        )
    }

    /// The innermost level. On a token that cannot start a term, records an
    /// error and returns a NULL literal without consuming anything.
    pub(super) fn parse_term(&mut self) -> Term {
        match self.current.kind.clone() {
            TokenKind::Integer(n) => {
                self.advance();
                Term::Literal(Literal::Integer(n))
            }
            TokenKind::Float(x) => {
                self.advance();
                Term::Literal(Literal::Float(x))
            }
            TokenKind::String(s) => {
                self.advance();
                Term::Literal(Literal::String(s))
            }
            TokenKind::Minus | TokenKind::Plus => self.parse_signed_term(),
            TokenKind::Question => self.parse_placeholder(),
            TokenKind::At => self.parse_named_param(),
            TokenKind::LeftParen => {
                self.advance();
                let term = if self.starts_query() {
                    Term::Subquery(Box::new(self.parse_select()))
                } else {
                    Term::Paren(Box::new(self.parse_expression()))
                };
                self.expect(&TokenKind::RightParen);
                term
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Term::Literal(Literal::Null)
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Term::Literal(Literal::Boolean(true))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Term::Literal(Literal::Boolean(false))
            }
            TokenKind::Keyword(Keyword::Case) => self.parse_case(),
            TokenKind::Keyword(Keyword::Cast) => self.parse_cast(),
            _ if self.check_identifier() => self.parse_path_or_call(),
            _ => {
                self.error_expecting("expression");
                Term::Literal(Literal::Null)
            }
        }
    }

    /// `-term` / `+term`; signs directly on numeric literals are folded.
    ///
    /// A run of signs is read in one pass and applied innermost first.
    fn parse_signed_term(&mut self) -> Term {
        let mut signs = Vec::new();
        while self.check(&TokenKind::Minus) || self.check(&TokenKind::Plus) {
            signs.push(self.check(&TokenKind::Minus));
            self.advance();
        }

        let mut term = self.parse_term();
        for negative in signs.into_iter().rev() {
            term = match (negative, term) {
                (true, Term::Literal(Literal::Integer(n))) => Term::Literal(Literal::Integer(-n)),
                (true, Term::Literal(Literal::Float(x))) => Term::Literal(Literal::Float(-x)),
                (false, term @ Term::Literal(Literal::Integer(_) | Literal::Float(_))) => term,
                (negative, term) => Term::Unary {
                    negative,
                    term: Box::new(term),
                },
            };
        }
        term
    }

    /// `?` or `?N` (the number must touch the `?`).
    fn parse_placeholder(&mut self) -> Term {
        let question = self.current.span;
        self.advance();
        let mut number = None;
        if let TokenKind::Integer(n) = self.current.kind {
            if self.current.span.start == question.end {
                if let Ok(n) = u32::try_from(n) {
                    self.advance();
                    number = Some(n);
                }
            }
        }
        self.placeholder_count += 1;
        Term::Placeholder(Placeholder {
            number,
            position: self.placeholder_count,
        })
    }

    /// `@name[:dotted.Type]`.
    ///
    /// A typed occurrence (re)binds the name; an untyped one must find an
    /// earlier binding.
    fn parse_named_param(&mut self) -> Term {
        let at = self.current.span;
        self.advance();
        let name = self.expect_identifier("parameter name");

        let key = name.to_ascii_lowercase();
        let (type_name, declared) = if self.eat(&TokenKind::Colon) {
            let mut parts = vec![self.expect_identifier("type name")];
            while self.eat(&TokenKind::Dot) {
                parts.push(self.expect_identifier("type name"));
            }
            let type_name = parts.join(".");
            self.params.insert(key, type_name.clone());
            (type_name, true)
        } else if let Some(type_name) = self.params.get(&key) {
            (type_name.clone(), false)
        } else {
            let span = self.span_from(at);
            self.error_semantic(
                format!("Named parameter @{name} needs a type on first use"),
                span,
            );
            (String::new(), false)
        };

        Term::NamedParam(NamedParam {
            name,
            type_name,
            declared,
            span: self.span_from(at),
        })
    }

    fn parse_path_or_call(&mut self) -> Term {
        let name = self.expect_identifier("identifier");

        if self.eat(&TokenKind::LeftParen) {
            return Term::Function(self.parse_call_args(name));
        }

        let mut parts = vec![name];
        while self.eat(&TokenKind::Dot) {
            parts.push(self.expect_identifier("identifier"));
        }
        Term::Path(Path { parts })
    }

    /// Arguments after `name(`, through the closing paren.
    fn parse_call_args(&mut self, name: String) -> FunctionCall {
        let mut call = FunctionCall {
            name,
            args: Vec::new(),
            distinct: false,
            star: false,
        };
        if self.eat(&TokenKind::Star) {
            call.star = true;
        } else if !self.check(&TokenKind::RightParen) {
            call.distinct = self.eat_keyword(Keyword::Distinct);
            call.args = self.parse_expression_list();
        }
        self.expect(&TokenKind::RightParen);
        call
    }

    fn parse_case(&mut self) -> Term {
        self.advance();

        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(self.parse_expression())
        };

        let mut branches = Vec::new();
        if !self.check_keyword(Keyword::When) {
            self.error_expecting("WHEN");
        }
        while self.eat_keyword(Keyword::When) {
            let condition = self.parse_expression();
            self.expect_keyword(Keyword::Then);
            let result = self.parse_expression();
            branches.push(WhenClause { condition, result });
        }

        let else_result = if self.eat_keyword(Keyword::Else) {
            Some(self.parse_expression())
        } else {
            None
        };
        self.expect_keyword(Keyword::End);

        Term::Case(Box::new(CaseExpression {
            operand,
            branches,
            else_result,
        }))
    }

    fn parse_cast(&mut self) -> Term {
        self.advance();
        self.expect(&TokenKind::LeftParen);
        let expr = self.parse_expression();
        self.expect_keyword(Keyword::As);
        let target = self.parse_column_type();
        self.expect(&TokenKind::RightParen);
        Term::Cast {
            expr: Box::new(expr),
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{
        CompareOp, Condition, Expression, Literal, Predicate, QueryCore, ResultColumn,
        SelectCore, Statement, Term,
    };
    use crate::parser::Parser;

    fn where_of(sql: &str) -> Expression {
        let out = Parser::new(sql).parse();
        assert!(out.is_ok(), "{sql}: {:?}", out.errors);
        match out.statements.into_iter().next() {
            Some(Statement::Select(select)) => match select.body {
                SelectCore::Select(QueryCore {
                    where_clause: Some(expr),
                    ..
                }) => expr,
                other => panic!("no WHERE in {other:?}"),
            },
            other => panic!("Expected SELECT, got {other:?}"),
        }
    }

    fn column_of(sql: &str) -> Expression {
        let out = Parser::new(sql).parse();
        assert!(out.is_ok(), "{sql}: {:?}", out.errors);
        match out.statements.into_iter().next() {
            Some(Statement::Select(select)) => match select.body {
                SelectCore::Select(mut core) => match core.columns.remove(0) {
                    ResultColumn::Expr { expr, .. } => expr,
                    other => panic!("unexpected column {other:?}"),
                },
                SelectCore::Values(_) => panic!("unexpected VALUES"),
            },
            other => panic!("Expected SELECT, got {other:?}"),
        }
    }

    #[test]
    fn test_or_of_ands() {
        let expr = where_of("SELECT * FROM t WHERE a = 1 AND b = 2 OR c = 3 && d = 4");
        assert_eq!(expr.terms.len(), 2);
        assert_eq!(expr.terms[0].conditions.len(), 2);
        assert_eq!(expr.terms[1].conditions.len(), 2);
    }

    #[test]
    fn test_arithmetic_precedence() {
        let expr = column_of("SELECT 1 + 2 * 3 || 'x'");
        assert_eq!(expr.to_string(), "1 + 2 * 3 || 'x'");
        let Some(Condition::Test { left, .. }) = expr.as_condition() else {
            panic!("expected test");
        };
        assert_eq!(left.parts.len(), 2);
        assert_eq!(left.parts[0].rest.len(), 1);
        assert_eq!(left.parts[0].rest[0].1.rest.len(), 1);
    }

    #[test]
    fn test_negative_literal_is_folded() {
        let expr = column_of("SELECT -5");
        assert_eq!(expr.as_term(), Some(&Term::Literal(Literal::Integer(-5))));
        let expr = column_of("SELECT -x");
        assert!(matches!(expr.as_term(), Some(Term::Unary { negative: true, .. })));
    }

    #[test]
    fn test_sign_runs_fold_innermost_first() {
        let expr = column_of("SELECT - - 5");
        assert_eq!(expr.as_term(), Some(&Term::Literal(Literal::Integer(5))));
        let expr = column_of("SELECT - + x");
        match expr.as_term() {
            Some(Term::Unary {
                negative: true,
                term,
            }) => assert!(matches!(**term, Term::Unary { negative: false, .. })),
            other => panic!("{other:?}"),
        }

        let sql = format!("SELECT {}7", "- ".repeat(5_001));
        let expr = column_of(&sql);
        assert_eq!(expr.as_term(), Some(&Term::Literal(Literal::Integer(-7))));
    }

    #[test]
    fn test_long_not_chain() {
        let sql = format!("SELECT * FROM t WHERE {}a = 1", "NOT ".repeat(5_000));
        let expr = where_of(&sql);
        let mut depth = 0;
        let mut cond = expr.as_condition().expect("condition");
        while let Condition::Not(inner) = cond {
            depth += 1;
            cond = &**inner;
        }
        assert_eq!(depth, 5_000);
        assert!(matches!(cond, Condition::Test { .. }));
    }

    #[test]
    fn test_predicates() {
        let cases = [
            ("a IS NULL", "IS NULL"),
            ("a IS NOT NULL", "IS NOT NULL"),
            ("a NOT BETWEEN 1 AND 5", "NOT BETWEEN"),
            ("a IN (1, 2, 3)", "IN"),
            ("a NOT IN (SELECT id FROM u)", "NOT IN"),
            ("a LIKE 'x%' ESCAPE '!'", "LIKE"),
            ("a REGEXP '^x'", "REGEXP"),
            ("a <> 1", "<>"),
            ("a != 1", "<>"),
            ("a == 1", "="),
        ];
        for (cond, op) in cases {
            let expr = where_of(&format!("SELECT * FROM t WHERE {cond}"));
            match expr.as_condition() {
                Some(Condition::Test {
                    predicate: Some(p),
                    ..
                }) => assert_eq!(p.operator(), op, "{cond}"),
                other => panic!("{cond}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_not_and_exists() {
        let expr = where_of("SELECT * FROM t WHERE NOT EXISTS (SELECT 1 FROM u)");
        match expr.as_condition() {
            Some(Condition::Not(inner)) => assert!(matches!(**inner, Condition::Exists(_))),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_comparison_has_second_operand() {
        let expr = where_of("SELECT * FROM t WHERE a >= b");
        let cond = expr.as_condition().expect("condition");
        assert!(cond.second_operand().is_some());
        assert!(matches!(
            cond,
            Condition::Test {
                predicate: Some(Predicate::Comparison {
                    op: CompareOp::GtEq,
                    ..
                }),
                ..
            }
        ));
    }

    #[test]
    fn test_case_with_many_arms() {
        let expr = column_of(
            "SELECT CASE WHEN a = 1 THEN 'one' WHEN a = 2 THEN 'two' WHEN a = 3 THEN 'three' ELSE 'many' END",
        );
        match expr.as_term() {
            Some(Term::Case(case)) => {
                assert!(case.operand.is_none());
                assert_eq!(case.branches.len(), 3);
                assert!(case.else_result.is_some());
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_simple_case() {
        let expr = column_of("SELECT CASE kind WHEN 1 THEN 'a' END");
        assert_eq!(expr.to_string(), "CASE kind WHEN 1 THEN 'a' END");
    }

    #[test]
    fn test_placeholders_are_numbered_by_position() {
        let expr = where_of("SELECT * FROM t WHERE a = ? AND b = ?2 AND c = ?");
        let rendered = expr.to_string();
        assert_eq!(rendered, "a = ? AND b = ?2 AND c = ?");
        let positions: Vec<usize> = expr.terms[0]
            .conditions
            .iter()
            .filter_map(|c| c.second_operand())
            .filter_map(|o| match o.as_term() {
                Some(Term::Placeholder(p)) => Some(p.position),
                _ => None,
            })
            .collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn test_named_params() {
        let expr = where_of("SELECT * FROM t WHERE a = @id:java.lang.Long AND b = @Id");
        let params: Vec<(String, bool)> = expr.terms[0]
            .conditions
            .iter()
            .filter_map(|c| c.second_operand())
            .filter_map(|o| match o.as_term() {
                Some(Term::NamedParam(p)) => Some((p.type_name.clone(), p.declared)),
                _ => None,
            })
            .collect();
        assert_eq!(
            params,
            vec![
                (String::from("java.lang.Long"), true),
                (String::from("java.lang.Long"), false),
            ]
        );
    }

    #[test]
    fn test_untyped_first_use_is_semantic_error() {
        let out = Parser::new("SELECT * FROM t WHERE a = @id").parse();
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.contains("@id"));
    }

    #[test]
    fn test_function_calls_and_cast() {
        let expr = column_of("SELECT count(DISTINCT a)");
        assert_eq!(expr.to_string(), "count(DISTINCT a)");
        let expr = column_of("SELECT COUNT(*)");
        assert_eq!(expr.to_string(), "COUNT(*)");
        let expr = column_of("SELECT CAST(a AS varchar(10))");
        assert_eq!(expr.to_string(), "CAST(a AS varchar(10))");
    }
}
