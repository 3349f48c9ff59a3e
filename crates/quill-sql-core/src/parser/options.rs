//! Parser configuration.

/// How long a named parameter's declared type stays visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamScope {
    /// Bindings live for the whole parse; a later statement may reuse a type
    /// declared in an earlier one.
    #[default]
    Session,
    /// Bindings are cleared at every statement boundary.
    Statement,
}

/// Which parsed statements are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retention {
    /// Every statement.
    #[default]
    All,
    /// Only CREATE TABLE; everything else is parsed, checked and dropped.
    DdlOnly,
}

/// Options for [`Parser`](super::Parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    /// Named parameter binding scope.
    pub param_scope: ParamScope,
    /// Statement retention policy.
    pub retention: Retention,
}

impl ParserOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the named parameter scope.
    #[must_use]
    pub const fn param_scope(mut self, scope: ParamScope) -> Self {
        self.param_scope = scope;
        self
    }

    /// Sets the retention policy.
    #[must_use]
    pub const fn retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }
}
