//! Token types for the SQL lexer.

use core::fmt;

use super::Span;

macro_rules! keywords {
    ($($variant:ident => $text:literal),+ $(,)?) => {
        /// SQL keywords.
        ///
        /// The keyword table is the `match` in [`Keyword::from_str`]; it is
        /// resolved at compile time and holds no runtime state.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $(
                #[doc = $text]
                $variant,
            )+
        }

        impl Keyword {
            /// Attempts to parse a keyword from a string (case-insensitive).
            #[must_use]
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Option<Self> {
                match s.to_ascii_uppercase().as_str() {
                    $($text => Some(Self::$variant),)+
                    // MySQL spelling
                    "AUTO_INCREMENT" => Some(Self::Autoincrement),
                    _ => None,
                }
            }

            /// Returns the keyword as a string.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }
    };
}

keywords! {
    // Queries
    Select => "SELECT",
    From => "FROM",
    Where => "WHERE",
    Order => "ORDER",
    By => "BY",
    Group => "GROUP",
    Having => "HAVING",
    Limit => "LIMIT",
    Offset => "OFFSET",
    Distinct => "DISTINCT",
    All => "ALL",
    As => "AS",
    With => "WITH",
    Recursive => "RECURSIVE",

    // Joins
    Join => "JOIN",
    Inner => "INNER",
    Left => "LEFT",
    Right => "RIGHT",
    Full => "FULL",
    Outer => "OUTER",
    Cross => "CROSS",
    Natural => "NATURAL",
    On => "ON",
    Using => "USING",

    // Set operations
    Union => "UNION",
    Intersect => "INTERSECT",
    Except => "EXCEPT",

    // DML
    Insert => "INSERT",
    Into => "INTO",
    Values => "VALUES",
    Update => "UPDATE",
    Set => "SET",
    Delete => "DELETE",
    Replace => "REPLACE",

    // DDL
    Create => "CREATE",
    Drop => "DROP",
    Alter => "ALTER",
    Table => "TABLE",
    Add => "ADD",
    Column => "COLUMN",
    Rename => "RENAME",
    To => "TO",
    Temp => "TEMP",
    Temporary => "TEMPORARY",
    If => "IF",
    Without => "WITHOUT",
    Rowid => "ROWID",
    Index => "INDEX",
    View => "VIEW",
    Trigger => "TRIGGER",
    Database => "DATABASE",
    Schema => "SCHEMA",

    // Constraints
    Primary => "PRIMARY",
    Key => "KEY",
    Hash => "HASH",
    Foreign => "FOREIGN",
    References => "REFERENCES",
    Unique => "UNIQUE",
    Check => "CHECK",
    Default => "DEFAULT",
    Constraint => "CONSTRAINT",
    Cascade => "CASCADE",
    Restrict => "RESTRICT",
    No => "NO",
    Action => "ACTION",
    Autoincrement => "AUTOINCREMENT",
    Identity => "IDENTITY",
    Collate => "COLLATE",

    // Conditions
    And => "AND",
    Or => "OR",
    Not => "NOT",
    In => "IN",
    Between => "BETWEEN",
    Like => "LIKE",
    Regexp => "REGEXP",
    Glob => "GLOB",
    Match => "MATCH",
    Escape => "ESCAPE",
    Is => "IS",
    Null => "NULL",
    True => "TRUE",
    False => "FALSE",
    Exists => "EXISTS",

    // Ordering
    Asc => "ASC",
    Desc => "DESC",
    Nulls => "NULLS",
    First => "FIRST",
    Last => "LAST",

    // Expressions
    Case => "CASE",
    When => "WHEN",
    Then => "THEN",
    Else => "ELSE",
    End => "END",
    Cast => "CAST",

    // Conflict resolution
    Abort => "ABORT",
    Fail => "FAIL",
    Ignore => "IGNORE",
    Rollback => "ROLLBACK",
    Conflict => "CONFLICT",

    // Transactions
    Begin => "BEGIN",
    Commit => "COMMIT",
    Transaction => "TRANSACTION",

    // Windows
    Over => "OVER",
    Partition => "PARTITION",
    Window => "WINDOW",
    Rows => "ROWS",
    Range => "RANGE",
    Unbounded => "UNBOUNDED",
    Preceding => "PRECEDING",
    Following => "FOLLOWING",
    Current => "CURRENT",
    Row => "ROW",
}

impl Keyword {
    /// Reserved keywords can never stand in for an identifier.
    ///
    /// Everything else (`KEY`, `ACTION`, `FIRST`, ...) is accepted wherever
    /// the grammar expects a name.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::From
                | Self::Where
                | Self::Order
                | Self::By
                | Self::Group
                | Self::Having
                | Self::Limit
                | Self::Offset
                | Self::Distinct
                | Self::All
                | Self::As
                | Self::With
                | Self::Join
                | Self::Inner
                | Self::Left
                | Self::Right
                | Self::Full
                | Self::Outer
                | Self::Cross
                | Self::Natural
                | Self::On
                | Self::Using
                | Self::Union
                | Self::Intersect
                | Self::Except
                | Self::Insert
                | Self::Into
                | Self::Values
                | Self::Update
                | Self::Set
                | Self::Delete
                | Self::Create
                | Self::Drop
                | Self::Alter
                | Self::Table
                | Self::Primary
                | Self::Foreign
                | Self::References
                | Self::Unique
                | Self::Check
                | Self::Default
                | Self::Constraint
                | Self::And
                | Self::Or
                | Self::Not
                | Self::In
                | Self::Between
                | Self::Like
                | Self::Regexp
                | Self::Is
                | Self::Null
                | Self::True
                | Self::False
                | Self::Exists
                | Self::Case
                | Self::When
                | Self::Then
                | Self::Else
                | Self::End
                | Self::Cast
        )
    }
}

/// An identifier as it appeared in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// Lowercased text (verbatim for quoted identifiers).
    pub lower: String,
    /// Original-case text (interior text for quoted identifiers).
    pub original: String,
    /// Whether the identifier was written as `"..."`, `[...]` or `` `...` ``.
    pub quoted: bool,
}

impl Ident {
    /// Creates an unquoted identifier.
    #[must_use]
    pub fn bare(text: &str) -> Self {
        Self {
            lower: text.to_ascii_lowercase(),
            original: String::from(text),
            quoted: false,
        }
    }

    /// Creates a quoted identifier; the text is kept verbatim.
    #[must_use]
    pub fn quoted(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            lower: text.clone(),
            original: text,
            quoted: true,
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Integer literal (e.g., 42)
    Integer(i64),
    /// Floating literal (e.g., 3.14, .2, 1e2)
    Float(f64),
    /// String literal (e.g., 'hello')
    String(String),
    /// Identifier, bare or quoted
    Identifier(Ident),
    /// SQL keyword
    Keyword(Keyword),

    /// (
    LeftParen,
    /// )
    RightParen,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// .
    Dot,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// |
    Pipe,
    /// ||
    Concat,
    /// = or ==
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// &&
    AndAnd,
    /// ?
    Question,
    /// @
    At,
    /// :
    Colon,

    /// Character sequence the lexer could not classify.
    Unknown,
    /// End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "'{s}'"),
            Self::Identifier(ident) => f.write_str(&ident.original),
            Self::Keyword(kw) => f.write_str(kw.as_str()),
            Self::LeftParen => f.write_str("("),
            Self::RightParen => f.write_str(")"),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::Slash => f.write_str("/"),
            Self::Percent => f.write_str("%"),
            Self::Dot => f.write_str("."),
            Self::Comma => f.write_str(","),
            Self::Semicolon => f.write_str(";"),
            Self::Pipe => f.write_str("|"),
            Self::Concat => f.write_str("||"),
            Self::Eq => f.write_str("="),
            Self::NotEq => f.write_str("!="),
            Self::Lt => f.write_str("<"),
            Self::LtEq => f.write_str("<="),
            Self::Gt => f.write_str(">"),
            Self::GtEq => f.write_str(">="),
            Self::AndAnd => f.write_str("&&"),
            Self::Question => f.write_str("?"),
            Self::At => f.write_str("@"),
            Self::Colon => f.write_str(":"),
            Self::Unknown => f.write_str("unknown character"),
            Self::Eof => f.write_str("EOF"),
        }
    }
}

/// A token with its location and raw source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
    /// The raw source text of the token.
    pub text: String,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns the identifier if this is an identifier token.
    #[must_use]
    pub const fn as_ident(&self) -> Option<&Ident> {
        match &self.kind {
            TokenKind::Identifier(ident) => Some(ident),
            _ => None,
        }
    }

    /// How the token is named in "found ..." diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Eof => String::from("EOF"),
            _ if !self.text.is_empty() => self.text.clone(),
            kind => kind.to_string(),
        }
    }
}
