//! Expression AST types.
//!
//! Expressions follow a strict precedence chain where each layer owns the
//! next one down:
//!
//! ```text
//! Expression   := AndCondition (OR AndCondition)*
//! AndCondition := Condition ((AND | &&) Condition)*
//! Condition    := NOT Condition | EXISTS (select) | Operand [predicate]
//! Operand      := Summand (|| Summand)*
//! Summand      := Factor ((+ | -) Factor)*
//! Factor       := Term ((* | / | %) Term)*
//! ```

use core::fmt;

use super::ddl::ColumnType;
use super::statement::SelectStatement;
use crate::lexer::Span;

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
    /// Boolean literal.
    Boolean(bool),
    /// NULL literal.
    Null,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

/// A dotted identifier path such as `name`, `t.name` or `s.t.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    /// Path segments in source case.
    pub parts: Vec<String>,
}

impl Path {
    /// The last segment (the column name for `t.col`).
    #[must_use]
    pub fn name(&self) -> &str {
        self.parts.last().map_or("", String::as_str)
    }

    /// The qualifier before the last segment, if any.
    #[must_use]
    pub fn qualifier(&self) -> Option<&str> {
        match self.parts.len() {
            0 | 1 => None,
            n => Some(self.parts[n - 2].as_str()),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

/// A typed named parameter: `@name:java.lang.String`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedParam {
    /// Parameter name as written.
    pub name: String,
    /// Fully qualified type, declared here or on an earlier use.
    pub type_name: String,
    /// Whether this occurrence carried the type annotation.
    pub declared: bool,
    /// Location of the `@`.
    pub span: Span,
}

impl fmt::Display for NamedParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.declared {
            write!(f, "@{}:{}", self.name, self.type_name)
        } else {
            write!(f, "@{}", self.name)
        }
    }
}

/// A positional placeholder: `?` or `?3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    /// Explicit number for `?N`.
    pub number: Option<u32>,
    /// 1-based occurrence within the statement.
    pub position: usize,
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "?{n}"),
            None => f.write_str("?"),
        }
    }
}

/// One `WHEN ... THEN ...` arm of a CASE expression.
#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    /// Condition (or value to compare for simple CASE).
    pub condition: Expression,
    /// Result when the condition matches.
    pub result: Expression,
}

/// `CASE [operand] WHEN ... THEN ... [ELSE ...] END`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpression {
    /// Operand of a simple CASE.
    pub operand: Option<Expression>,
    /// WHEN arms in source order.
    pub branches: Vec<WhenClause>,
    /// ELSE result.
    pub else_result: Option<Expression>,
}

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Function name as written.
    pub name: String,
    /// Arguments.
    pub args: Vec<Expression>,
    /// `DISTINCT` inside the argument list.
    pub distinct: bool,
    /// `name(*)`.
    pub star: bool,
}

/// The innermost expression layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Column reference.
    Path(Path),
    /// Literal value.
    Literal(Literal),
    /// `@name[:Type]`.
    NamedParam(NamedParam),
    /// `?` or `?N`.
    Placeholder(Placeholder),
    /// Parenthesized expression.
    Paren(Box<Expression>),
    /// Scalar subquery.
    Subquery(Box<SelectStatement>),
    /// CASE expression.
    Case(Box<CaseExpression>),
    /// `CAST(expr AS type)`.
    Cast {
        /// Expression being converted.
        expr: Box<Expression>,
        /// Target type.
        target: ColumnType,
    },
    /// Function call.
    Function(FunctionCall),
    /// Signed term that could not be folded into a literal.
    Unary {
        /// `-` when true, `+` otherwise.
        negative: bool,
        /// Operand.
        term: Box<Term>,
    },
}

impl Term {
    /// Wraps a term into a full expression.
    #[must_use]
    pub fn into_expression(self) -> Expression {
        Expression::from(self)
    }
}

/// Multiplicative operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MulOp {
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl MulOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }
}

/// Additive operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOp {
    /// `+`
    Add,
    /// `-`
    Sub,
}

impl AddOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
        }
    }
}

/// `Term ((* | / | %) Term)*`
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    /// Leading term.
    pub first: Term,
    /// Following operator/term pairs.
    pub rest: Vec<(MulOp, Term)>,
}

/// `Factor ((+ | -) Factor)*`
#[derive(Debug, Clone, PartialEq)]
pub struct Summand {
    /// Leading factor.
    pub first: Factor,
    /// Following operator/factor pairs.
    pub rest: Vec<(AddOp, Factor)>,
}

/// `Summand (|| Summand)*`
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    /// Concatenated parts; a single entry means no `||`.
    pub parts: Vec<Summand>,
}

impl Operand {
    /// Returns the bare term when the operand is a single term.
    #[must_use]
    pub fn as_term(&self) -> Option<&Term> {
        match self.parts.as_slice() {
            [summand] if summand.rest.is_empty() && summand.first.rest.is_empty() => {
                Some(&summand.first.first)
            }
            _ => None,
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=` / `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
}

impl CompareOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// Right-hand side of `IN`.
#[derive(Debug, Clone, PartialEq)]
pub enum InList {
    /// `IN (a, b, c)`
    Values(Vec<Expression>),
    /// `IN (SELECT ...)`
    Subquery(Box<SelectStatement>),
}

/// What follows the left operand of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `op right`
    Comparison {
        /// Operator.
        op: CompareOp,
        /// Right operand.
        right: Operand,
    },
    /// `IS [NOT] NULL`
    IsNull {
        /// IS NOT NULL.
        negated: bool,
    },
    /// `IS [NOT] right`
    Is {
        /// IS NOT.
        negated: bool,
        /// Right operand.
        right: Operand,
    },
    /// `[NOT] BETWEEN low AND high`
    Between {
        /// NOT BETWEEN.
        negated: bool,
        /// Lower bound.
        low: Operand,
        /// Upper bound.
        high: Operand,
    },
    /// `[NOT] IN (...)`
    In {
        /// NOT IN.
        negated: bool,
        /// Values or subquery.
        list: InList,
    },
    /// `[NOT] LIKE pattern [ESCAPE e]`
    Like {
        /// NOT LIKE.
        negated: bool,
        /// Pattern.
        pattern: Operand,
        /// Escape character expression.
        escape: Option<Operand>,
    },
    /// `[NOT] REGEXP pattern`
    Regexp {
        /// NOT REGEXP.
        negated: bool,
        /// Pattern.
        pattern: Operand,
    },
}

impl Predicate {
    /// Operator text used in dumps and rendering.
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Comparison { op, .. } => op.as_str(),
            Self::IsNull { negated: false } => "IS NULL",
            Self::IsNull { negated: true } => "IS NOT NULL",
            Self::Is { negated: false, .. } => "IS",
            Self::Is { negated: true, .. } => "IS NOT",
            Self::Between { negated: false, .. } => "BETWEEN",
            Self::Between { negated: true, .. } => "NOT BETWEEN",
            Self::In { negated: false, .. } => "IN",
            Self::In { negated: true, .. } => "NOT IN",
            Self::Like { negated: false, .. } => "LIKE",
            Self::Like { negated: true, .. } => "NOT LIKE",
            Self::Regexp { negated: false, .. } => "REGEXP",
            Self::Regexp { negated: true, .. } => "NOT REGEXP",
        }
    }
}

/// A single boolean condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `NOT condition`
    Not(Box<Condition>),
    /// `EXISTS (select)`
    Exists(Box<SelectStatement>),
    /// An operand, optionally tested by a predicate.
    Test {
        /// Left operand.
        left: Operand,
        /// Predicate; `None` for a bare operand.
        predicate: Option<Predicate>,
    },
}

impl Condition {
    /// The second operand of a binary condition.
    ///
    /// `None` for unary forms (`EXISTS`, `IS NULL`, bare operands) and for
    /// `IN`, whose right side is a list.
    #[must_use]
    pub fn second_operand(&self) -> Option<&Operand> {
        match self {
            Self::Test {
                predicate: Some(predicate),
                ..
            } => match predicate {
                Predicate::Comparison { right, .. } | Predicate::Is { right, .. } => Some(right),
                Predicate::Between { low, .. } => Some(low),
                Predicate::Like { pattern, .. } | Predicate::Regexp { pattern, .. } => {
                    Some(pattern)
                }
                Predicate::IsNull { .. } | Predicate::In { .. } => None,
            },
            _ => None,
        }
    }
}

/// Conditions joined by `AND` or `&&`.
#[derive(Debug, Clone, PartialEq)]
pub struct AndCondition {
    /// Conjuncts in source order.
    pub conditions: Vec<Condition>,
}

/// Top of the chain: conditions joined by `OR`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// Disjuncts in source order.
    pub terms: Vec<AndCondition>,
}

impl Expression {
    /// Returns the bare term when the expression is a single term.
    #[must_use]
    pub fn as_term(&self) -> Option<&Term> {
        match self.terms.as_slice() {
            [and] => match and.conditions.as_slice() {
                [Condition::Test {
                    left,
                    predicate: None,
                }] => left.as_term(),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns the single condition when there is no AND/OR.
    #[must_use]
    pub fn as_condition(&self) -> Option<&Condition> {
        match self.terms.as_slice() {
            [and] => match and.conditions.as_slice() {
                [condition] => Some(condition),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<Term> for Operand {
    fn from(term: Term) -> Self {
        Self {
            parts: vec![Summand {
                first: Factor {
                    first: term,
                    rest: Vec::new(),
                },
                rest: Vec::new(),
            }],
        }
    }
}

impl From<Condition> for Expression {
    fn from(condition: Condition) -> Self {
        Self {
            terms: vec![AndCondition {
                conditions: vec![condition],
            }],
        }
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Self::from(Condition::Test {
            left: Operand::from(term),
            predicate: None,
        })
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{path}"),
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::NamedParam(param) => write!(f, "{param}"),
            Self::Placeholder(p) => write!(f, "{p}"),
            Self::Paren(expr) => write!(f, "({expr})"),
            Self::Subquery(query) => write!(f, "({query})"),
            Self::Case(case) => {
                f.write_str("CASE")?;
                if let Some(operand) = &case.operand {
                    write!(f, " {operand}")?;
                }
                for branch in &case.branches {
                    write!(f, " WHEN {} THEN {}", branch.condition, branch.result)?;
                }
                if let Some(else_result) = &case.else_result {
                    write!(f, " ELSE {else_result}")?;
                }
                f.write_str(" END")
            }
            Self::Cast { expr, target } => write!(f, "CAST({expr} AS {target})"),
            Self::Function(call) => {
                write!(f, "{}(", call.name)?;
                if call.distinct {
                    f.write_str("DISTINCT ")?;
                }
                if call.star {
                    f.write_str("*")?;
                } else {
                    write_list(f, &call.args, ", ")?;
                }
                f.write_str(")")
            }
            Self::Unary { negative, term } => {
                write!(f, "{}{term}", if *negative { "-" } else { "+" })
            }
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (op, term) in &self.rest {
            write!(f, " {} {term}", op.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Display for Summand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (op, factor) in &self.rest {
            write!(f, " {} {factor}", op.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.parts, " || ")
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.operator();
        match self {
            Self::Comparison { right, .. } | Self::Is { right, .. } => write!(f, "{op} {right}"),
            Self::IsNull { .. } => f.write_str(op),
            Self::Between { low, high, .. } => write!(f, "{op} {low} AND {high}"),
            Self::In { list, .. } => match list {
                InList::Values(values) => {
                    write!(f, "{op} (")?;
                    write_list(f, values, ", ")?;
                    f.write_str(")")
                }
                InList::Subquery(query) => write!(f, "{op} ({query})"),
            },
            Self::Like {
                pattern, escape, ..
            } => {
                write!(f, "{op} {pattern}")?;
                match escape {
                    Some(escape) => write!(f, " ESCAPE {escape}"),
                    None => Ok(()),
                }
            }
            Self::Regexp { pattern, .. } => write!(f, "{op} {pattern}"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Not(inner) => write!(f, "NOT {inner}"),
            Self::Exists(query) => write!(f, "EXISTS ({query})"),
            Self::Test { left, predicate } => match predicate {
                Some(predicate) => write!(f, "{left} {predicate}"),
                None => write!(f, "{left}"),
            },
        }
    }
}

impl fmt::Display for AndCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.conditions, " AND ")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.terms, " OR ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(name: &str) -> Term {
        Term::Path(Path {
            parts: vec![String::from(name)],
        })
    }

    #[test]
    fn test_term_wraps_into_expression() {
        let expr = path("id").into_expression();
        assert_eq!(expr.as_term(), Some(&path("id")));
        assert_eq!(expr.to_string(), "id");
    }

    #[test]
    fn test_second_operand_only_for_binary_forms() {
        let compare = Condition::Test {
            left: Operand::from(path("a")),
            predicate: Some(Predicate::Comparison {
                op: CompareOp::Eq,
                right: Operand::from(Term::Literal(Literal::Integer(1))),
            }),
        };
        assert!(compare.second_operand().is_some());
        assert_eq!(compare.to_string(), "a = 1");

        let is_null = Condition::Test {
            left: Operand::from(path("a")),
            predicate: Some(Predicate::IsNull { negated: true }),
        };
        assert!(is_null.second_operand().is_none());
        assert_eq!(is_null.to_string(), "a IS NOT NULL");
    }

    #[test]
    fn test_path_parts() {
        let p = Path {
            parts: vec![String::from("t"), String::from("Name")],
        };
        assert_eq!(p.name(), "Name");
        assert_eq!(p.qualifier(), Some("t"));
        assert_eq!(p.to_string(), "t.Name");
    }

    #[test]
    fn test_string_literal_escaping() {
        assert_eq!(Literal::String(String::from("it's")).to_string(), "'it''s'");
    }
}
