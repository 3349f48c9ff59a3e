//! DDL AST types: CREATE/ALTER/DROP TABLE and the column/constraint model.

use core::fmt;

use serde::Serialize;

use super::expression::{Expression, Term};
use super::statement::QualifiedName;
use crate::lexer::Span;

/// SQL type codes, numbered like `java.sql.Types`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    VarChar,
    LongVarChar,
    NChar,
    NVarChar,
    Date,
    Time,
    Timestamp,
    TimestampWithTimezone,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Clob,
    Boolean,
    Array,
    Other,
}

impl SqlType {
    /// Resolves a type name (case-insensitive).
    ///
    /// Returns the type plus whether the name implies auto-increment
    /// (`IDENTITY`, `SERIAL`). Unknown names map to [`SqlType::Other`].
    #[must_use]
    pub fn from_name(name: &str) -> (Self, bool) {
        let ty = match name.to_ascii_lowercase().as_str() {
            "bit" => Self::Bit,
            "tinyint" => Self::TinyInt,
            "smallint" | "int2" | "year" => Self::SmallInt,
            "int" | "integer" | "mediumint" | "int4" | "signed" => Self::Integer,
            "bigint" | "int8" | "long" => Self::BigInt,
            "identity" | "serial" | "bigserial" => return (Self::BigInt, true),
            "real" | "float4" => Self::Real,
            "float" => Self::Float,
            "float8" | "double" | "double precision" => Self::Double,
            "number" | "numeric" => Self::Numeric,
            "decimal" | "dec" => Self::Decimal,
            "char" | "character" => Self::Char,
            "varchar" | "varchar2" | "character varying" | "varchar_ignorecase"
            | "varchar_casesensitive" => Self::VarChar,
            "longvarchar" => Self::LongVarChar,
            "nchar" => Self::NChar,
            "nvarchar" | "nvarchar2" => Self::NVarChar,
            "date" => Self::Date,
            "time" => Self::Time,
            "timestamp" | "datetime" | "smalldatetime" => Self::Timestamp,
            "timestamptz" => Self::TimestampWithTimezone,
            "binary" => Self::Binary,
            "varbinary" | "raw" | "bytea" => Self::VarBinary,
            "longvarbinary" => Self::LongVarBinary,
            "blob" | "tinyblob" | "mediumblob" | "longblob" | "image" | "oid" => Self::Blob,
            "clob" | "text" | "tinytext" | "mediumtext" | "longtext" | "ntext" | "nclob" => {
                Self::Clob
            }
            "bool" | "boolean" => Self::Boolean,
            "array" => Self::Array,
            _ => Self::Other,
        };
        (ty, false)
    }

    /// The `java.sql.Types` integer code.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::Bit => -7,
            Self::TinyInt => -6,
            Self::SmallInt => 5,
            Self::Integer => 4,
            Self::BigInt => -5,
            Self::Float => 6,
            Self::Real => 7,
            Self::Double => 8,
            Self::Numeric => 2,
            Self::Decimal => 3,
            Self::Char => 1,
            Self::VarChar => 12,
            Self::LongVarChar => -1,
            Self::NChar => -15,
            Self::NVarChar => -9,
            Self::Date => 91,
            Self::Time => 92,
            Self::Timestamp => 93,
            Self::TimestampWithTimezone => 2014,
            Self::Binary => -2,
            Self::VarBinary => -3,
            Self::LongVarBinary => -4,
            Self::Blob => 2004,
            Self::Clob => 2005,
            Self::Boolean => 16,
            Self::Array => 2003,
            Self::Other => 1111,
        }
    }

    /// Character, decimal and binary types take `(length[, scale])`.
    #[must_use]
    pub const fn accepts_length(&self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::VarChar
                | Self::LongVarChar
                | Self::NChar
                | Self::NVarChar
                | Self::Numeric
                | Self::Decimal
                | Self::Binary
                | Self::VarBinary
                | Self::LongVarBinary
        )
    }
}

/// A column type as written, with its resolved code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    /// Type name in source case (`VARCHAR`, `double precision`, ...).
    pub name: String,
    /// Resolved type.
    pub sql_type: SqlType,
    /// Length or precision.
    pub length: Option<u32>,
    /// Scale.
    pub scale: Option<u32>,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match (self.length, self.scale) {
            (Some(len), Some(scale)) => write!(f, "({len}, {scale})"),
            (Some(len), None) => write!(f, "({len})"),
            _ => Ok(()),
        }
    }
}

/// `AUTO_INCREMENT (start, increment)` seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequence {
    /// First value.
    pub start: i64,
    /// Step.
    pub increment: i64,
}

/// A column definition inside CREATE TABLE or ALTER TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name as written.
    pub name: String,
    /// Declared type.
    pub column_type: ColumnType,
    /// DEFAULT term.
    pub default: Option<Term>,
    /// Explicit `NOT NULL`.
    pub not_null: bool,
    /// Explicit `NULL`.
    pub null: bool,
    /// AUTO_INCREMENT / IDENTITY, or an identity type.
    pub auto_increment: bool,
    /// `(start, increment)` after AUTO_INCREMENT / IDENTITY.
    pub sequence: Option<Sequence>,
    /// Column-level UNIQUE.
    pub unique: bool,
    /// Column-level PRIMARY KEY.
    pub primary_key: bool,
    /// `PRIMARY KEY HASH`.
    pub primary_key_hash: bool,
    /// Column-level CHECK.
    pub check: Option<Expression>,
    /// Location of the whole definition.
    pub span: Span,
}

impl ColumnDefinition {
    /// Creates a bare definition with no modifiers.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType, span: Span) -> Self {
        Self {
            name: name.into(),
            column_type,
            default: None,
            not_null: false,
            null: false,
            auto_increment: false,
            sequence: None,
            unique: false,
            primary_key: false,
            primary_key_hash: false,
            check: None,
            span,
        }
    }

    /// Whether the column accepts NULL. Primary key columns never do.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        !self.not_null && !self.primary_key
    }

    /// The resolved type code.
    #[must_use]
    pub const fn sql_type(&self) -> SqlType {
        self.column_type.sql_type
    }
}

/// Table constraint kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Check,
    Unique,
    Foreign,
    Primary,
    PrimaryHash,
}

impl ConstraintKind {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Check => "CHECK",
            Self::Unique => "UNIQUE",
            Self::Foreign => "FOREIGN KEY",
            Self::Primary => "PRIMARY KEY",
            Self::PrimaryHash => "PRIMARY KEY HASH",
        }
    }
}

/// What happens to referencing rows on delete/update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferentialAction {
    Cascade,
    #[default]
    Restrict,
    NoAction,
    SetDefault,
    SetNull,
}

impl ReferentialAction {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
            Self::SetDefault => "SET DEFAULT",
            Self::SetNull => "SET NULL",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `REFERENCES` part of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    /// Referenced table.
    pub table: QualifiedName,
    /// Referenced columns; empty means the referenced primary key.
    pub columns: Vec<String>,
    /// Explicit `ON DELETE` action.
    pub on_delete: Option<ReferentialAction>,
    /// Explicit `ON UPDATE` action.
    pub on_update: Option<ReferentialAction>,
}

impl ForeignKeyRef {
    /// Effective ON DELETE action (RESTRICT when unspecified).
    #[must_use]
    pub fn on_delete(&self) -> ReferentialAction {
        self.on_delete.unwrap_or_default()
    }

    /// Effective ON UPDATE action (RESTRICT when unspecified).
    #[must_use]
    pub fn on_update(&self) -> ReferentialAction {
        self.on_update.unwrap_or_default()
    }
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// `CONSTRAINT name`.
    pub name: Option<String>,
    /// Kind.
    pub kind: ConstraintKind,
    /// Constrained columns (empty for CHECK).
    pub columns: Vec<String>,
    /// CHECK expression.
    pub check: Option<Expression>,
    /// REFERENCES clause of a foreign key.
    pub references: Option<ForeignKeyRef>,
    /// Location.
    pub span: Span,
}

impl Constraint {
    /// Creates a constraint without CHECK or REFERENCES parts.
    #[must_use]
    pub const fn new(kind: ConstraintKind, columns: Vec<String>, span: Span) -> Self {
        Self {
            name: None,
            kind,
            columns,
            check: None,
            references: None,
            span,
        }
    }
}

/// One entry in the CREATE TABLE body.
#[derive(Debug, Clone, PartialEq)]
pub enum TableElement {
    Column(ColumnDefinition),
    Constraint(Constraint),
}

/// `CREATE [TEMP] TABLE [IF NOT EXISTS] name (...) [WITHOUT ROWID]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    /// TEMP / TEMPORARY.
    pub temporary: bool,
    /// IF NOT EXISTS.
    pub if_not_exists: bool,
    /// Table name.
    pub name: QualifiedName,
    /// Columns and constraints in declaration order.
    pub elements: Vec<TableElement>,
    /// WITHOUT ROWID.
    pub without_rowid: bool,
    /// Location.
    pub span: Span,
}

impl CreateTable {
    /// Column definitions in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.elements.iter().filter_map(|e| match e {
            TableElement::Column(c) => Some(c),
            TableElement::Constraint(_) => None,
        })
    }

    /// Table constraints in declaration order.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.elements.iter().filter_map(|e| match e {
            TableElement::Constraint(c) => Some(c),
            TableElement::Column(_) => None,
        })
    }

    /// Looks a column up by name, ignoring ASCII case.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// `ALTER TABLE t ALTER COLUMN c ...` changes.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnChange {
    /// RENAME TO n
    Rename(String),
    /// SET DEFAULT term
    SetDefault(Term),
    /// DROP DEFAULT
    DropDefault,
    /// SET NOT NULL
    SetNotNull,
    /// DROP NOT NULL
    DropNotNull,
    /// SET NULL
    SetNull,
    /// A full new definition (type and modifiers).
    Redefine(ColumnDefinition),
}

/// ALTER TABLE actions.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    AddColumn(ColumnDefinition),
    AddConstraint(Constraint),
    AlterColumn {
        /// Column being altered.
        column: String,
        /// Change applied.
        change: ColumnChange,
    },
    DropColumn(String),
    DropConstraint(String),
    DropPrimaryKey,
    RenameTable(String),
    RenameColumn {
        /// Old name.
        from: String,
        /// New name.
        to: String,
    },
}

/// `ALTER TABLE name action`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    /// Altered table.
    pub table: QualifiedName,
    /// Action.
    pub action: AlterAction,
    /// Location.
    pub span: Span,
}

/// CASCADE / RESTRICT after DROP TABLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropBehavior {
    Cascade,
    Restrict,
}

/// `DROP TABLE [IF EXISTS] a, b [CASCADE | RESTRICT]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    /// IF EXISTS.
    pub if_exists: bool,
    /// Dropped tables.
    pub names: Vec<QualifiedName>,
    /// CASCADE / RESTRICT.
    pub behavior: Option<DropBehavior>,
    /// Location.
    pub span: Span,
}
