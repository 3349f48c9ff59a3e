//! SELECT grammar.

use super::parser::Parser;
use crate::ast::{
    CommonTableExpression, CompoundOperator, Join, JoinClause, JoinConstraint, JoinKind,
    JoinOperator, Limit, NullOrdering, OrderDirection, OrderingTerm, QueryCore, ResultColumn,
    SelectCore, SelectStatement, TableOrSubquery, WithClause,
};
use crate::lexer::{Keyword, TokenKind};

impl Parser<'_> {
    /// `[WITH ...] core (compound-op core)* [ORDER BY ...] [LIMIT ...]`
    ///
    /// ORDER BY and LIMIT apply to the whole compound.
    pub(super) fn parse_select(&mut self) -> SelectStatement {
        let start = self.current.span;

        let with = if self.eat_keyword(Keyword::With) {
            Some(self.parse_with_clause())
        } else {
            None
        };

        let body = self.parse_select_core();

        let mut compounds = Vec::new();
        loop {
            let op = match self.current.as_keyword() {
                Some(Keyword::Union) => {
                    self.advance();
                    if self.eat_keyword(Keyword::All) {
                        CompoundOperator::UnionAll
                    } else {
                        CompoundOperator::Union
                    }
                }
                Some(Keyword::Intersect) => {
                    self.advance();
                    CompoundOperator::Intersect
                }
                Some(Keyword::Except) => {
                    self.advance();
                    CompoundOperator::Except
                }
                _ => break,
            };
            compounds.push((op, self.parse_select_core()));
        }

        let order_by = if self.eat_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By);
            self.parse_ordering_terms()
        } else {
            Vec::new()
        };

        let limit = if self.eat_keyword(Keyword::Limit) {
            Some(self.parse_limit())
        } else {
            None
        };

        SelectStatement {
            with,
            body,
            compounds,
            order_by,
            limit,
            span: self.span_from(start),
        }
    }

    fn parse_with_clause(&mut self) -> WithClause {
        let recursive = self.eat_keyword(Keyword::Recursive);
        let mut ctes = Vec::new();
        loop {
            let name = self.expect_identifier("table name");
            let columns = if self.check(&TokenKind::LeftParen) {
                self.parse_name_list()
            } else {
                Vec::new()
            };
            self.expect_keyword(Keyword::As);
            self.expect(&TokenKind::LeftParen);
            let query = self.parse_select();
            self.expect(&TokenKind::RightParen);
            ctes.push(CommonTableExpression {
                name,
                columns,
                query: Box::new(query),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        WithClause { recursive, ctes }
    }

    fn parse_select_core(&mut self) -> SelectCore {
        if self.eat_keyword(Keyword::Values) {
            return SelectCore::Values(self.parse_value_rows());
        }

        self.expect_keyword(Keyword::Select);

        let distinct = if self.eat_keyword(Keyword::Distinct) {
            true
        } else {
            self.eat_keyword(Keyword::All);
            false
        };

        let mut columns = vec![self.parse_result_column()];
        while self.eat(&TokenKind::Comma) {
            columns.push(self.parse_result_column());
        }

        let from = if self.eat_keyword(Keyword::From) {
            Some(self.parse_join_clause())
        } else {
            None
        };

        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_expression())
        } else {
            None
        };

        let group_by = if self.eat_keyword(Keyword::Group) {
            self.expect_keyword(Keyword::By);
            self.parse_expression_list()
        } else {
            Vec::new()
        };

        let having = if self.eat_keyword(Keyword::Having) {
            Some(self.parse_expression())
        } else {
            None
        };

        SelectCore::Select(QueryCore {
            distinct,
            columns,
            from,
            where_clause,
            group_by,
            having,
        })
    }

    fn parse_result_column(&mut self) -> ResultColumn {
        if self.eat(&TokenKind::Star) {
            return ResultColumn::Star;
        }

        // table.*
        if self.check_identifier()
            && self.peek().kind == TokenKind::Dot
            && self.peek_nth(1).kind == TokenKind::Star
        {
            let table = self.expect_identifier("table name");
            self.advance();
            self.advance();
            return ResultColumn::TableStar(table);
        }

        let expr = self.parse_expression();
        let alias = self.parse_alias();
        ResultColumn::Expr { expr, alias }
    }

    /// `AS name`, or a bare identifier. Keywords only count after AS.
    fn parse_alias(&mut self) -> Option<String> {
        if self.eat_keyword(Keyword::As) {
            return Some(self.expect_identifier("alias"));
        }
        if matches!(self.current.kind, TokenKind::Identifier(_)) {
            return Some(self.expect_identifier("alias"));
        }
        None
    }

    pub(super) fn parse_join_clause(&mut self) -> JoinClause {
        let first = self.parse_table_or_subquery();
        let mut joins = Vec::new();

        while let Some(operator) = self.parse_join_operator() {
            let source = self.parse_table_or_subquery();
            let constraint = if self.eat_keyword(Keyword::On) {
                JoinConstraint::On(self.parse_expression())
            } else if self.eat_keyword(Keyword::Using) {
                JoinConstraint::Using(self.parse_name_list())
            } else {
                JoinConstraint::None
            };
            joins.push(Join {
                operator,
                source,
                constraint,
            });
        }

        JoinClause { first, joins }
    }

    /// `,` | `[NATURAL] [LEFT|RIGHT|FULL [OUTER] | INNER | CROSS] JOIN`
    ///
    /// Returns `None` without consuming when no join follows.
    fn parse_join_operator(&mut self) -> Option<JoinOperator> {
        if self.eat(&TokenKind::Comma) {
            return Some(JoinOperator::comma());
        }

        let natural = self.eat_keyword(Keyword::Natural);
        let kind = match self.current.as_keyword() {
            Some(Keyword::Left) => JoinKind::Left,
            Some(Keyword::Right) => JoinKind::Right,
            Some(Keyword::Full) => JoinKind::Full,
            Some(Keyword::Inner) => JoinKind::Inner,
            Some(Keyword::Cross) => JoinKind::Cross,
            _ => JoinKind::Plain,
        };

        if kind == JoinKind::Plain && !natural && !self.check_keyword(Keyword::Join) {
            return None;
        }
        if kind != JoinKind::Plain {
            self.advance();
        }
        let outer = matches!(kind, JoinKind::Left | JoinKind::Right | JoinKind::Full)
            && self.eat_keyword(Keyword::Outer);
        self.expect_keyword(Keyword::Join);

        Some(JoinOperator {
            natural,
            kind,
            outer,
        })
    }

    fn parse_table_or_subquery(&mut self) -> TableOrSubquery {
        if self.eat(&TokenKind::LeftParen) {
            if self.starts_query() {
                let query = self.parse_select();
                self.expect(&TokenKind::RightParen);
                let alias = self.parse_alias();
                return TableOrSubquery::Subquery {
                    query: Box::new(query),
                    alias,
                };
            }
            let inner = self.parse_join_clause();
            self.expect(&TokenKind::RightParen);
            return TableOrSubquery::Nested(Box::new(inner));
        }

        let name = self.parse_qualified_name("table name");
        let alias = self.parse_alias();
        TableOrSubquery::Table { name, alias }
    }

    fn parse_ordering_terms(&mut self) -> Vec<OrderingTerm> {
        let mut terms = Vec::new();
        loop {
            let expr = self.parse_expression();
            let direction = if self.eat_keyword(Keyword::Desc) {
                OrderDirection::Desc
            } else {
                self.eat_keyword(Keyword::Asc);
                OrderDirection::Asc
            };
            let nulls = if self.eat_keyword(Keyword::Nulls) {
                if self.eat_keyword(Keyword::First) {
                    Some(NullOrdering::First)
                } else {
                    self.expect_keyword(Keyword::Last);
                    Some(NullOrdering::Last)
                }
            } else {
                None
            };
            terms.push(OrderingTerm {
                expr,
                direction,
                nulls,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        terms
    }

    /// `LIMIT n [OFFSET m]` or `LIMIT m, n` where the first value is the
    /// offset.
    fn parse_limit(&mut self) -> Limit {
        let first = self.parse_expression();
        if self.eat_keyword(Keyword::Offset) {
            Limit {
                limit: first,
                offset: Some(self.parse_expression()),
            }
        } else if self.eat(&TokenKind::Comma) {
            Limit {
                limit: self.parse_expression(),
                offset: Some(first),
            }
        } else {
            Limit {
                limit: first,
                offset: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{
        CompoundOperator, JoinConstraint, JoinKind, NullOrdering, OrderDirection, ResultColumn,
        SelectCore, SelectStatement, Statement, TableOrSubquery,
    };
    use crate::parser::Parser;

    fn select(sql: &str) -> SelectStatement {
        let out = Parser::new(sql).parse();
        assert!(out.is_ok(), "{sql}: {:?}", out.errors);
        match out.statements.into_iter().next() {
            Some(Statement::Select(select)) => select,
            other => panic!("Expected SELECT, got {other:?}"),
        }
    }

    #[test]
    fn test_result_columns() {
        let stmt = select("SELECT *, u.*, u.name, count(*) AS n, age years FROM users u");
        let SelectCore::Select(core) = &stmt.body else {
            panic!("expected SELECT core");
        };
        assert_eq!(core.columns.len(), 5);
        assert_eq!(core.columns[0], ResultColumn::Star);
        assert_eq!(core.columns[1], ResultColumn::TableStar("u".into()));
        match &core.columns[3] {
            ResultColumn::Expr { alias, .. } => assert_eq!(alias.as_deref(), Some("n")),
            other => panic!("unexpected {other:?}"),
        }
        match &core.columns[4] {
            ResultColumn::Expr { alias, .. } => assert_eq!(alias.as_deref(), Some("years")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_join_operators() {
        let stmt = select(
            "SELECT * FROM a NATURAL LEFT OUTER JOIN b INNER JOIN c ON c.id = b.id \
             CROSS JOIN d, e JOIN f USING (id, kind)",
        );
        let SelectCore::Select(core) = &stmt.body else {
            panic!("expected SELECT core");
        };
        let from = core.from.as_ref().expect("FROM");
        let ops: Vec<String> = from.joins.iter().map(|j| j.operator.to_string()).collect();
        assert_eq!(
            ops,
            vec!["NATURAL LEFT OUTER JOIN", "INNER JOIN", "CROSS JOIN", ",", "JOIN"]
        );
        assert!(matches!(from.joins[1].constraint, JoinConstraint::On(_)));
        assert_eq!(
            from.joins[4].constraint,
            JoinConstraint::Using(vec!["id".into(), "kind".into()])
        );
        assert_eq!(from.joins[3].operator.kind, JoinKind::Comma);
    }

    #[test]
    fn test_subquery_and_nested_sources() {
        let stmt = select("SELECT * FROM (SELECT id FROM a) x JOIN (b JOIN c) ON 1 = 1");
        let SelectCore::Select(core) = &stmt.body else {
            panic!("expected SELECT core");
        };
        let from = core.from.as_ref().expect("FROM");
        match &from.first {
            TableOrSubquery::Subquery { alias, .. } => assert_eq!(alias.as_deref(), Some("x")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(from.joins[0].source, TableOrSubquery::Nested(_)));
        assert_eq!(from.sources().len(), 3);
    }

    #[test]
    fn test_compound_with_shared_tail() {
        let stmt = select(
            "SELECT a FROM t UNION ALL SELECT a FROM u EXCEPT VALUES (1) \
             ORDER BY a DESC NULLS LAST, 2 LIMIT 10 OFFSET 5",
        );
        let ops: Vec<CompoundOperator> = stmt.compounds.iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, vec![CompoundOperator::UnionAll, CompoundOperator::Except]);
        assert!(matches!(stmt.compounds[1].1, SelectCore::Values(_)));
        assert_eq!(stmt.order_by.len(), 2);
        assert_eq!(stmt.order_by[0].direction, OrderDirection::Desc);
        assert_eq!(stmt.order_by[0].nulls, Some(NullOrdering::Last));
        assert_eq!(stmt.order_by[1].direction, OrderDirection::Asc);
        let limit = stmt.limit.expect("LIMIT");
        assert_eq!(limit.limit.to_string(), "10");
        assert_eq!(limit.offset.map(|o| o.to_string()).as_deref(), Some("5"));
    }

    #[test]
    fn test_limit_comma_puts_offset_first() {
        let limit = select("SELECT * FROM t LIMIT 20, 10").limit.expect("LIMIT");
        assert_eq!(limit.limit.to_string(), "10");
        assert_eq!(limit.offset.map(|o| o.to_string()).as_deref(), Some("20"));
    }

    #[test]
    fn test_recursive_cte() {
        let stmt = select(
            "WITH RECURSIVE cnt(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM cnt WHERE x < 10) \
             SELECT x FROM cnt",
        );
        let with = stmt.with.expect("WITH");
        assert!(with.recursive);
        assert_eq!(with.ctes.len(), 1);
        assert_eq!(with.ctes[0].name, "cnt");
        assert_eq!(with.ctes[0].columns, vec!["x".to_string()]);
        assert_eq!(with.ctes[0].query.compounds.len(), 1);
    }

    #[test]
    fn test_group_by_having_distinct() {
        let stmt = select("SELECT DISTINCT dept, count(*) FROM emp GROUP BY dept HAVING count(*) > 2");
        let SelectCore::Select(core) = &stmt.body else {
            panic!("expected SELECT core");
        };
        assert!(core.distinct);
        assert_eq!(core.group_by.len(), 1);
        assert!(core.having.is_some());
    }

    #[test]
    fn test_display_round_trip_is_stable() {
        let sql = "SELECT a AS x FROM t LEFT JOIN u ON t.id = u.id WHERE a > 1 ORDER BY a ASC LIMIT 3";
        let printed = select(sql).to_string();
        assert_eq!(select(&printed).to_string(), printed);
    }

    #[test]
    fn test_missing_join_reports_error() {
        let out = Parser::new("SELECT * FROM a LEFT b").parse();
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.starts_with("Expecting JOIN"), "{}", out.errors[0].message);
    }
}
