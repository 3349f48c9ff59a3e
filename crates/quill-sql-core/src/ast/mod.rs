//! Abstract Syntax Tree (AST) types for SQL statements.
//!
//! Nodes are plain data: names keep their source case and every list keeps
//! declaration order. Presentation lives in [`dump`].

mod ddl;
pub mod dump;
mod expression;
mod statement;

pub use ddl::{
    AlterAction, AlterTable, ColumnChange, ColumnDefinition, ColumnType, Constraint,
    ConstraintKind, CreateTable, DropBehavior, DropTable, ForeignKeyRef, ReferentialAction,
    Sequence, SqlType, TableElement,
};
pub use dump::{dump, walk, Node};
pub use expression::{
    AddOp, AndCondition, CaseExpression, CompareOp, Condition, Expression, Factor, FunctionCall,
    InList, Literal, MulOp, NamedParam, Operand, Path, Placeholder, Predicate, Summand, Term,
    WhenClause,
};
pub use statement::{
    Assignment, CommonTableExpression, CompoundOperator, ConflictResolution, DeleteStatement,
    InsertSource, InsertStatement, Join, JoinClause, JoinConstraint, JoinKind, JoinOperator, Limit,
    NullOrdering, OrderDirection, OrderingTerm, QualifiedName, QueryCore, ResultColumn,
    SelectCore, SelectStatement, Statement, TableOrSubquery, UpdateStatement, WithClause,
};
