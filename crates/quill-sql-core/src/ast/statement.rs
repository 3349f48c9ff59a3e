//! SQL statement AST types.

use core::fmt;

use super::ddl::{AlterTable, CreateTable, DropTable};
use super::expression::Expression;
use crate::lexer::Span;

/// A possibly schema-qualified name: `name` or `schema.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    /// Schema qualifier.
    pub schema: Option<String>,
    /// Object name as written.
    pub name: String,
}

impl QualifiedName {
    /// Creates an unqualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// Compares the object name ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Null ordering for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrdering {
    /// NULLs come first.
    First,
    /// NULLs come last.
    Last,
}

impl NullOrdering {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingTerm {
    /// The expression to order by.
    pub expr: Expression,
    /// The direction (ASC or DESC).
    pub direction: OrderDirection,
    /// Null ordering (optional).
    pub nulls: Option<NullOrdering>,
}

/// `LIMIT n [OFFSET m]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    /// Row count.
    pub limit: Expression,
    /// Rows skipped.
    pub offset: Option<Expression>,
}

/// Join kinds. `Comma` is the implicit cross join of `FROM a, b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Comma,
    Plain,
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// A join operator such as `NATURAL LEFT OUTER JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOperator {
    /// NATURAL.
    pub natural: bool,
    /// Kind.
    pub kind: JoinKind,
    /// OUTER (only meaningful for LEFT/RIGHT/FULL).
    pub outer: bool,
}

impl JoinOperator {
    /// The comma join.
    #[must_use]
    pub const fn comma() -> Self {
        Self {
            natural: false,
            kind: JoinKind::Comma,
            outer: false,
        }
    }
}

impl fmt::Display for JoinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == JoinKind::Comma {
            return f.write_str(",");
        }
        if self.natural {
            f.write_str("NATURAL ")?;
        }
        let kind = match self.kind {
            JoinKind::Comma | JoinKind::Plain => "",
            JoinKind::Inner => "INNER ",
            JoinKind::Left => "LEFT ",
            JoinKind::Right => "RIGHT ",
            JoinKind::Full => "FULL ",
            JoinKind::Cross => "CROSS ",
        };
        f.write_str(kind)?;
        if self.outer {
            f.write_str("OUTER ")?;
        }
        f.write_str("JOIN")
    }
}

/// Constraint on a join edge.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    /// No constraint.
    None,
    /// `ON expr`
    On(Expression),
    /// `USING (cols)`
    Using(Vec<String>),
}

/// A FROM source.
#[derive(Debug, Clone, PartialEq)]
pub enum TableOrSubquery {
    /// A table reference.
    Table {
        /// Table name.
        name: QualifiedName,
        /// Alias.
        alias: Option<String>,
    },
    /// `(select) [alias]`
    Subquery {
        /// The subquery.
        query: Box<SelectStatement>,
        /// Alias.
        alias: Option<String>,
    },
    /// `(join-clause)`
    Nested(Box<JoinClause>),
}

/// One join edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Operator.
    pub operator: JoinOperator,
    /// Right-hand source.
    pub source: TableOrSubquery,
    /// Constraint.
    pub constraint: JoinConstraint,
}

/// The FROM clause: a first source followed by join edges.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Leftmost source.
    pub first: TableOrSubquery,
    /// Joins in source order.
    pub joins: Vec<Join>,
}

impl JoinClause {
    /// Every table or subquery source, nested clauses flattened.
    #[must_use]
    pub fn sources(&self) -> Vec<&TableOrSubquery> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(clause) = pending.pop() {
            let all = core::iter::once(&clause.first).chain(clause.joins.iter().map(|j| &j.source));
            for source in all {
                match source {
                    TableOrSubquery::Nested(inner) => pending.push(inner.as_ref()),
                    other => out.push(other),
                }
            }
        }
        out
    }
}

/// A column in the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultColumn {
    /// `*`
    Star,
    /// `table.*`
    TableStar(String),
    /// `expr [AS alias]`
    Expr {
        /// The expression.
        expr: Expression,
        /// Column alias.
        alias: Option<String>,
    },
}

/// The SELECT part of a select core.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCore {
    /// Whether to select DISTINCT values.
    pub distinct: bool,
    /// The columns to select.
    pub columns: Vec<ResultColumn>,
    /// The FROM clause.
    pub from: Option<JoinClause>,
    /// The WHERE clause.
    pub where_clause: Option<Expression>,
    /// GROUP BY expressions.
    pub group_by: Vec<Expression>,
    /// HAVING clause.
    pub having: Option<Expression>,
}

/// One body of a (possibly compound) select.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectCore {
    /// `SELECT ...`
    Select(QueryCore),
    /// `VALUES (...), (...)`
    Values(Vec<Vec<Expression>>),
}

/// Set operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOperator {
    Union,
    UnionAll,
    Intersect,
    Except,
}

impl CompoundOperator {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

/// A common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpression {
    /// CTE name.
    pub name: String,
    /// Optional column names.
    pub columns: Vec<String>,
    /// Body.
    pub query: Box<SelectStatement>,
}

/// `WITH [RECURSIVE] cte, ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct WithClause {
    /// RECURSIVE.
    pub recursive: bool,
    /// CTEs in order.
    pub ctes: Vec<CommonTableExpression>,
}

/// A SELECT statement.
///
/// ORDER BY and LIMIT apply to the whole compound result.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// WITH clause.
    pub with: Option<WithClause>,
    /// First body.
    pub body: SelectCore,
    /// UNION / INTERSECT / EXCEPT chain.
    pub compounds: Vec<(CompoundOperator, SelectCore)>,
    /// ORDER BY.
    pub order_by: Vec<OrderingTerm>,
    /// LIMIT / OFFSET.
    pub limit: Option<Limit>,
    /// Location.
    pub span: Span,
}

/// Conflict resolution for `INSERT OR ...` / `UPDATE OR ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    Rollback,
    Abort,
    Fail,
    Ignore,
    Replace,
}

/// Source of data for INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// VALUES (...), (...), ...
    Values(Vec<Vec<Expression>>),
    /// SELECT ...
    Query(Box<SelectStatement>),
    /// DEFAULT VALUES
    DefaultValues,
}

/// An INSERT or REPLACE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Written as `REPLACE INTO`.
    pub replace: bool,
    /// `INSERT OR action`.
    pub or_action: Option<ConflictResolution>,
    /// Target table.
    pub table: QualifiedName,
    /// Column names (optional).
    pub columns: Vec<String>,
    /// Values to insert.
    pub source: InsertSource,
    /// Location.
    pub span: Span,
}

/// An assignment in UPDATE SET.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column name.
    pub column: String,
    /// Value expression.
    pub value: Expression,
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// `UPDATE OR action`.
    pub or_action: Option<ConflictResolution>,
    /// Target table.
    pub table: QualifiedName,
    /// SET assignments.
    pub assignments: Vec<Assignment>,
    /// WHERE clause.
    pub where_clause: Option<Expression>,
    /// Location.
    pub span: Span,
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table.
    pub table: QualifiedName,
    /// WHERE clause.
    pub where_clause: Option<Expression>,
    /// Location.
    pub span: Span,
}

/// A SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    AlterTable(AlterTable),
    DropTable(DropTable),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Select(SelectStatement),
}

impl Statement {
    /// Short name of the statement kind.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "CREATE TABLE",
            Self::AlterTable(_) => "ALTER TABLE",
            Self::DropTable(_) => "DROP TABLE",
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
            Self::Select(_) => "SELECT",
        }
    }

    /// Location of the whole statement.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::CreateTable(s) => s.span,
            Self::AlterTable(s) => s.span,
            Self::DropTable(s) => s.span,
            Self::Insert(s) => s.span,
            Self::Update(s) => s.span,
            Self::Delete(s) => s.span,
            Self::Select(s) => s.span,
        }
    }

    /// Returns the CREATE TABLE if this is one.
    #[must_use]
    pub const fn as_create_table(&self) -> Option<&CreateTable> {
        match self {
            Self::CreateTable(create) => Some(create),
            _ => None,
        }
    }
}

fn write_exprs(f: &mut fmt::Formatter<'_>, exprs: &[Expression]) -> fmt::Result {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{expr}")?;
    }
    Ok(())
}

impl fmt::Display for TableOrSubquery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alias = match self {
            Self::Table { name, alias } => {
                write!(f, "{name}")?;
                alias
            }
            Self::Subquery { query, alias } => {
                write!(f, "({query})")?;
                alias
            }
            Self::Nested(inner) => return write!(f, "({inner})"),
        };
        match alias {
            Some(alias) => write!(f, " AS {alias}"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for JoinClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for join in &self.joins {
            if join.operator.kind == JoinKind::Comma {
                write!(f, ", {}", join.source)?;
            } else {
                write!(f, " {} {}", join.operator, join.source)?;
            }
            match &join.constraint {
                JoinConstraint::None => {}
                JoinConstraint::On(expr) => write!(f, " ON {expr}")?,
                JoinConstraint::Using(cols) => write!(f, " USING ({})", cols.join(", "))?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for SelectCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Values(rows) => {
                f.write_str("VALUES ")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("(")?;
                    write_exprs(f, row)?;
                    f.write_str(")")?;
                }
                Ok(())
            }
            Self::Select(core) => {
                f.write_str("SELECT ")?;
                if core.distinct {
                    f.write_str("DISTINCT ")?;
                }
                for (i, column) in core.columns.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match column {
                        ResultColumn::Star => f.write_str("*")?,
                        ResultColumn::TableStar(table) => write!(f, "{table}.*")?,
                        ResultColumn::Expr { expr, alias } => {
                            write!(f, "{expr}")?;
                            if let Some(alias) = alias {
                                write!(f, " AS {alias}")?;
                            }
                        }
                    }
                }
                if let Some(from) = &core.from {
                    write!(f, " FROM {from}")?;
                }
                if let Some(where_clause) = &core.where_clause {
                    write!(f, " WHERE {where_clause}")?;
                }
                if !core.group_by.is_empty() {
                    f.write_str(" GROUP BY ")?;
                    write_exprs(f, &core.group_by)?;
                }
                if let Some(having) = &core.having {
                    write!(f, " HAVING {having}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(with) = &self.with {
            f.write_str("WITH ")?;
            if with.recursive {
                f.write_str("RECURSIVE ")?;
            }
            for (i, cte) in with.ctes.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(&cte.name)?;
                if !cte.columns.is_empty() {
                    write!(f, "({})", cte.columns.join(", "))?;
                }
                write!(f, " AS ({})", cte.query)?;
            }
            f.write_str(" ")?;
        }
        write!(f, "{}", self.body)?;
        for (op, core) in &self.compounds {
            write!(f, " {} {core}", op.as_str())?;
        }
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            for (i, term) in self.order_by.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{} {}", term.expr, term.direction.as_str())?;
                if let Some(nulls) = term.nulls {
                    write!(f, " {}", nulls.as_str())?;
                }
            }
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {}", limit.limit)?;
            if let Some(offset) = &limit.offset {
                write!(f, " OFFSET {offset}")?;
            }
        }
        Ok(())
    }
}
