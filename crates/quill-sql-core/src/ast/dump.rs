//! Generic tree dump over the AST.
//!
//! Every node type implements [`Node`]; [`walk`] and [`dump`] work on the
//! trait alone and use an explicit stack, so deep trees do not recurse.
//! Single-element expression chains are collapsed so `a = 1` dumps as one
//! comparison rather than seven nested layers.

use core::fmt::Write;

use super::ddl::{
    AlterAction, AlterTable, ColumnChange, ColumnDefinition, Constraint, CreateTable, DropBehavior,
    DropTable, TableElement,
};
use super::expression::{
    AndCondition, Condition, Expression, Factor, InList, Operand, Predicate, Summand, Term,
};
use super::statement::{
    Assignment, CommonTableExpression, DeleteStatement, InsertSource, InsertStatement, Join,
    JoinClause, JoinConstraint, OrderingTerm, QueryCore, ResultColumn, SelectCore,
    SelectStatement, Statement, TableOrSubquery, UpdateStatement,
};

/// A child edge, optionally tagged with the role it plays in the parent.
pub struct Child<'a> {
    /// Role such as `where` or `default`.
    pub role: Option<&'static str>,
    /// The child node.
    pub node: &'a dyn Node,
}

impl<'a> Child<'a> {
    fn plain(node: &'a dyn Node) -> Self {
        Self { role: None, node }
    }

    fn tagged(role: &'static str, node: &'a dyn Node) -> Self {
        Self {
            role: Some(role),
            node,
        }
    }
}

/// A node of the syntax tree.
pub trait Node {
    /// One-line description of this node.
    fn label(&self) -> String;

    /// Direct children in source order.
    fn children(&self) -> Vec<Child<'_>> {
        Vec::new()
    }
}

/// Visits `root` and its descendants depth-first, pre-order.
pub fn walk<'a>(root: &'a dyn Node, mut visit: impl FnMut(Option<&'static str>, &'a dyn Node, usize)) {
    let mut stack = vec![(None, root, 0)];
    while let Some((role, node, depth)) = stack.pop() {
        visit(role, node, depth);
        for child in node.children().into_iter().rev() {
            stack.push((child.role, child.node, depth + 1));
        }
    }
}

/// Renders `root` as an indented tree, one node per line.
#[must_use]
pub fn dump(root: &dyn Node) -> String {
    let mut out = String::new();
    walk(root, |role, node, depth| {
        let indent = "  ".repeat(depth);
        let _ = match role {
            Some(role) => writeln!(out, "{indent}{role}: {}", node.label()),
            None => writeln!(out, "{indent}{}", node.label()),
        };
    });
    out
}

fn opt<'a, T: Node>(out: &mut Vec<Child<'a>>, role: &'static str, node: Option<&'a T>) {
    if let Some(node) = node {
        out.push(Child::tagged(role, node));
    }
}

fn all<'a, T: Node>(out: &mut Vec<Child<'a>>, nodes: &'a [T]) {
    out.extend(nodes.iter().map(|n| Child::plain(n)));
}

impl Node for Statement {
    fn label(&self) -> String {
        self.inner().label()
    }

    fn children(&self) -> Vec<Child<'_>> {
        self.inner().children()
    }
}

impl Statement {
    fn inner(&self) -> &dyn Node {
        match self {
            Self::CreateTable(s) => s,
            Self::AlterTable(s) => s,
            Self::DropTable(s) => s,
            Self::Insert(s) => s,
            Self::Update(s) => s,
            Self::Delete(s) => s,
            Self::Select(s) => s,
        }
    }
}

// DDL

impl Node for CreateTable {
    fn label(&self) -> String {
        let mut label = String::from("CreateTable");
        if self.temporary {
            label.push_str(" TEMPORARY");
        }
        if self.if_not_exists {
            label.push_str(" IF NOT EXISTS");
        }
        let _ = write!(label, " {}", self.name);
        if self.without_rowid {
            label.push_str(" WITHOUT ROWID");
        }
        label
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = Vec::new();
        all(&mut out, &self.elements);
        out
    }
}

impl Node for TableElement {
    fn label(&self) -> String {
        match self {
            Self::Column(c) => c.label(),
            Self::Constraint(c) => c.label(),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        match self {
            Self::Column(c) => c.children(),
            Self::Constraint(c) => c.children(),
        }
    }
}

impl Node for ColumnDefinition {
    fn label(&self) -> String {
        let mut label = format!("Column {} {}", self.name, self.column_type);
        if self.not_null {
            label.push_str(" NOT NULL");
        }
        if self.null {
            label.push_str(" NULL");
        }
        if self.auto_increment {
            label.push_str(" AUTO_INCREMENT");
            if let Some(seq) = self.sequence {
                let _ = write!(label, "({}, {})", seq.start, seq.increment);
            }
        }
        if self.unique {
            label.push_str(" UNIQUE");
        }
        if self.primary_key {
            label.push_str(" PRIMARY KEY");
            if self.primary_key_hash {
                label.push_str(" HASH");
            }
        }
        label
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = Vec::new();
        opt(&mut out, "default", self.default.as_ref());
        opt(&mut out, "check", self.check.as_ref());
        out
    }
}

impl Node for Constraint {
    fn label(&self) -> String {
        let mut label = String::from("Constraint");
        if let Some(name) = &self.name {
            let _ = write!(label, " {name}");
        }
        let _ = write!(label, " {}", self.kind.as_str());
        if !self.columns.is_empty() {
            let _ = write!(label, " ({})", self.columns.join(", "));
        }
        if let Some(fk) = &self.references {
            let _ = write!(label, " REFERENCES {}", fk.table);
            if !fk.columns.is_empty() {
                let _ = write!(label, "({})", fk.columns.join(", "));
            }
            if let Some(action) = fk.on_delete {
                let _ = write!(label, " ON DELETE {action}");
            }
            if let Some(action) = fk.on_update {
                let _ = write!(label, " ON UPDATE {action}");
            }
        }
        label
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = Vec::new();
        opt(&mut out, "check", self.check.as_ref());
        out
    }
}

impl Node for AlterTable {
    fn label(&self) -> String {
        format!("AlterTable {}", self.table)
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![Child::plain(&self.action)]
    }
}

impl Node for AlterAction {
    fn label(&self) -> String {
        match self {
            Self::AddColumn(_) => String::from("AddColumn"),
            Self::AddConstraint(_) => String::from("AddConstraint"),
            Self::AlterColumn { column, change } => {
                let change = match change {
                    ColumnChange::Rename(to) => format!("RENAME TO {to}"),
                    ColumnChange::SetDefault(_) => String::from("SET DEFAULT"),
                    ColumnChange::DropDefault => String::from("DROP DEFAULT"),
                    ColumnChange::SetNotNull => String::from("SET NOT NULL"),
                    ColumnChange::DropNotNull => String::from("DROP NOT NULL"),
                    ColumnChange::SetNull => String::from("SET NULL"),
                    ColumnChange::Redefine(_) => String::from("REDEFINE"),
                };
                format!("AlterColumn {column} {change}")
            }
            Self::DropColumn(column) => format!("DropColumn {column}"),
            Self::DropConstraint(name) => format!("DropConstraint {name}"),
            Self::DropPrimaryKey => String::from("DropPrimaryKey"),
            Self::RenameTable(to) => format!("RenameTable TO {to}"),
            Self::RenameColumn { from, to } => format!("RenameColumn {from} TO {to}"),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        match self {
            Self::AddColumn(def)
            | Self::AlterColumn {
                change: ColumnChange::Redefine(def),
                ..
            } => vec![Child::plain(def)],
            Self::AddConstraint(c) => vec![Child::plain(c)],
            Self::AlterColumn {
                change: ColumnChange::SetDefault(term),
                ..
            } => vec![Child::tagged("default", term)],
            _ => Vec::new(),
        }
    }
}

impl Node for DropTable {
    fn label(&self) -> String {
        let names: Vec<String> = self.names.iter().map(ToString::to_string).collect();
        let mut label = String::from("DropTable");
        if self.if_exists {
            label.push_str(" IF EXISTS");
        }
        let _ = write!(label, " {}", names.join(", "));
        match self.behavior {
            Some(DropBehavior::Cascade) => label.push_str(" CASCADE"),
            Some(DropBehavior::Restrict) => label.push_str(" RESTRICT"),
            None => {}
        }
        label
    }
}

// DML

impl Node for Vec<Expression> {
    fn label(&self) -> String {
        String::from("Row")
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = Vec::new();
        all(&mut out, self);
        out
    }
}

impl Node for InsertStatement {
    fn label(&self) -> String {
        let verb = if self.replace { "Replace" } else { "Insert" };
        let mut label = format!("{verb} INTO {}", self.table);
        if !self.columns.is_empty() {
            let _ = write!(label, " ({})", self.columns.join(", "));
        }
        if matches!(self.source, InsertSource::DefaultValues) {
            label.push_str(" DEFAULT VALUES");
        }
        label
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = Vec::new();
        match &self.source {
            InsertSource::Values(rows) => all(&mut out, rows),
            InsertSource::Query(query) => out.push(Child::plain(query.as_ref())),
            InsertSource::DefaultValues => {}
        }
        out
    }
}

impl Node for Assignment {
    fn label(&self) -> String {
        format!("Set {}", self.column)
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![Child::plain(&self.value)]
    }
}

impl Node for UpdateStatement {
    fn label(&self) -> String {
        format!("Update {}", self.table)
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = Vec::new();
        all(&mut out, &self.assignments);
        opt(&mut out, "where", self.where_clause.as_ref());
        out
    }
}

impl Node for DeleteStatement {
    fn label(&self) -> String {
        format!("Delete FROM {}", self.table)
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = Vec::new();
        opt(&mut out, "where", self.where_clause.as_ref());
        out
    }
}

// Queries

impl Node for SelectStatement {
    fn label(&self) -> String {
        match &self.with {
            Some(with) if with.recursive => String::from("Select WITH RECURSIVE"),
            Some(_) => String::from("Select WITH"),
            None => String::from("Select"),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = Vec::new();
        if let Some(with) = &self.with {
            all(&mut out, &with.ctes);
        }
        out.push(Child::plain(&self.body));
        for (op, core) in &self.compounds {
            out.push(Child::tagged(op.as_str(), core));
        }
        all(&mut out, &self.order_by);
        if let Some(limit) = &self.limit {
            out.push(Child::tagged("limit", &limit.limit));
            opt(&mut out, "offset", limit.offset.as_ref());
        }
        out
    }
}

impl Node for CommonTableExpression {
    fn label(&self) -> String {
        if self.columns.is_empty() {
            format!("Cte {}", self.name)
        } else {
            format!("Cte {}({})", self.name, self.columns.join(", "))
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![Child::plain(self.query.as_ref())]
    }
}

impl Node for SelectCore {
    fn label(&self) -> String {
        match self {
            Self::Select(core) => core.label(),
            Self::Values(_) => String::from("Values"),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        match self {
            Self::Select(core) => core.children(),
            Self::Values(rows) => {
                let mut out = Vec::new();
                all(&mut out, rows);
                out
            }
        }
    }
}

impl Node for QueryCore {
    fn label(&self) -> String {
        if self.distinct {
            String::from("Query DISTINCT")
        } else {
            String::from("Query")
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = Vec::new();
        all(&mut out, &self.columns);
        opt(&mut out, "from", self.from.as_ref());
        opt(&mut out, "where", self.where_clause.as_ref());
        for expr in &self.group_by {
            out.push(Child::tagged("group by", expr));
        }
        opt(&mut out, "having", self.having.as_ref());
        out
    }
}

impl Node for ResultColumn {
    fn label(&self) -> String {
        match self {
            Self::Star => String::from("Column *"),
            Self::TableStar(table) => format!("Column {table}.*"),
            Self::Expr { alias: Some(a), .. } => format!("Column AS {a}"),
            Self::Expr { alias: None, .. } => String::from("Column"),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        match self {
            Self::Expr { expr, .. } => vec![Child::plain(expr)],
            _ => Vec::new(),
        }
    }
}

impl Node for OrderingTerm {
    fn label(&self) -> String {
        match self.nulls {
            Some(nulls) => format!("OrderBy {} {}", self.direction.as_str(), nulls.as_str()),
            None => format!("OrderBy {}", self.direction.as_str()),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![Child::plain(&self.expr)]
    }
}

impl Node for JoinClause {
    fn label(&self) -> String {
        String::from("JoinClause")
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![Child::plain(&self.first)];
        all(&mut out, &self.joins);
        out
    }
}

impl Node for Join {
    fn label(&self) -> String {
        match &self.constraint {
            JoinConstraint::Using(cols) => format!("{} USING ({})", self.operator, cols.join(", ")),
            _ => self.operator.to_string(),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![Child::plain(&self.source)];
        if let JoinConstraint::On(expr) = &self.constraint {
            out.push(Child::tagged("on", expr));
        }
        out
    }
}

impl Node for TableOrSubquery {
    fn label(&self) -> String {
        match self {
            Self::Table { name, alias } => match alias {
                Some(alias) => format!("Table {name} AS {alias}"),
                None => format!("Table {name}"),
            },
            Self::Subquery { alias, .. } => match alias {
                Some(alias) => format!("Subquery AS {alias}"),
                None => String::from("Subquery"),
            },
            Self::Nested(inner) => inner.label(),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        match self {
            Self::Table { .. } => Vec::new(),
            Self::Subquery { query, .. } => vec![Child::plain(query.as_ref())],
            Self::Nested(inner) => inner.children(),
        }
    }
}

// Expressions

impl Node for Expression {
    fn label(&self) -> String {
        match self.terms.as_slice() {
            [single] => single.label(),
            _ => String::from("OR"),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        match self.terms.as_slice() {
            [single] => single.children(),
            terms => {
                let mut out = Vec::new();
                all(&mut out, terms);
                out
            }
        }
    }
}

impl Node for AndCondition {
    fn label(&self) -> String {
        match self.conditions.as_slice() {
            [single] => single.label(),
            _ => String::from("AND"),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        match self.conditions.as_slice() {
            [single] => single.children(),
            conditions => {
                let mut out = Vec::new();
                all(&mut out, conditions);
                out
            }
        }
    }
}

impl Node for Condition {
    fn label(&self) -> String {
        match self {
            Self::Not(_) => String::from("NOT"),
            Self::Exists(_) => String::from("EXISTS"),
            Self::Test {
                left,
                predicate: None,
            } => left.label(),
            Self::Test {
                predicate: Some(predicate),
                ..
            } => predicate.operator().to_string(),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        match self {
            Self::Not(inner) => vec![Child::plain(inner.as_ref())],
            Self::Exists(query) => vec![Child::plain(query.as_ref())],
            Self::Test {
                left,
                predicate: None,
            } => left.children(),
            Self::Test {
                left,
                predicate: Some(predicate),
            } => {
                let mut out = vec![Child::plain(left)];
                match predicate {
                    Predicate::Comparison { right, .. } | Predicate::Is { right, .. } => {
                        out.push(Child::plain(right));
                    }
                    Predicate::IsNull { .. } => {}
                    Predicate::Between { low, high, .. } => {
                        out.push(Child::tagged("low", low));
                        out.push(Child::tagged("high", high));
                    }
                    Predicate::In { list, .. } => match list {
                        InList::Values(values) => all(&mut out, values),
                        InList::Subquery(query) => out.push(Child::plain(query.as_ref())),
                    },
                    Predicate::Like {
                        pattern, escape, ..
                    } => {
                        out.push(Child::plain(pattern));
                        opt(&mut out, "escape", escape.as_ref());
                    }
                    Predicate::Regexp { pattern, .. } => out.push(Child::plain(pattern)),
                }
                out
            }
        }
    }
}

impl Node for Operand {
    fn label(&self) -> String {
        match self.parts.as_slice() {
            [single] => single.label(),
            _ => String::from("||"),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        match self.parts.as_slice() {
            [single] => single.children(),
            parts => {
                let mut out = Vec::new();
                all(&mut out, parts);
                out
            }
        }
    }
}

impl Node for Summand {
    fn label(&self) -> String {
        if self.rest.is_empty() {
            return self.first.label();
        }
        let ops: Vec<&str> = self.rest.iter().map(|(op, _)| op.as_str()).collect();
        ops.join(" ")
    }

    fn children(&self) -> Vec<Child<'_>> {
        if self.rest.is_empty() {
            return self.first.children();
        }
        let mut out = vec![Child::plain(&self.first)];
        out.extend(self.rest.iter().map(|(_, f)| Child::plain(f)));
        out
    }
}

impl Node for Factor {
    fn label(&self) -> String {
        if self.rest.is_empty() {
            return self.first.label();
        }
        let ops: Vec<&str> = self.rest.iter().map(|(op, _)| op.as_str()).collect();
        ops.join(" ")
    }

    fn children(&self) -> Vec<Child<'_>> {
        if self.rest.is_empty() {
            return self.first.children();
        }
        let mut out = vec![Child::plain(&self.first)];
        out.extend(self.rest.iter().map(|(_, t)| Child::plain(t)));
        out
    }
}

impl Node for Term {
    fn label(&self) -> String {
        match self {
            Self::Path(path) => format!("Path {path}"),
            Self::Literal(lit) => format!("Literal {lit}"),
            Self::NamedParam(param) => format!("Param {param}"),
            Self::Placeholder(p) => format!("Placeholder {p} #{}", p.position),
            Self::Paren(inner) => inner.label(),
            Self::Subquery(_) => String::from("Subquery"),
            Self::Case(_) => String::from("Case"),
            Self::Cast { target, .. } => format!("Cast AS {target}"),
            Self::Function(call) => {
                let mut label = format!("Function {}", call.name);
                if call.distinct {
                    label.push_str(" DISTINCT");
                }
                if call.star {
                    label.push_str(" (*)");
                }
                label
            }
            Self::Unary { negative: true, .. } => String::from("Negate"),
            Self::Unary { negative: false, .. } => String::from("Plus"),
        }
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut out = Vec::new();
        match self {
            Self::Path(_) | Self::Literal(_) | Self::NamedParam(_) | Self::Placeholder(_) => {}
            Self::Paren(inner) => return inner.children(),
            Self::Subquery(query) => out.push(Child::plain(query.as_ref())),
            Self::Case(case) => {
                opt(&mut out, "operand", case.operand.as_ref());
                for branch in &case.branches {
                    out.push(Child::tagged("when", &branch.condition));
                    out.push(Child::tagged("then", &branch.result));
                }
                opt(&mut out, "else", case.else_result.as_ref());
            }
            Self::Cast { expr, .. } => out.push(Child::plain(expr.as_ref())),
            Self::Function(call) => all(&mut out, &call.args),
            Self::Unary { term, .. } => out.push(Child::plain(term.as_ref())),
        }
        out
    }
}
