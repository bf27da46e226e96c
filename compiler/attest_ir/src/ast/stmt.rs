//! Statement Types

use std::fmt;

use super::expr::Expr;
use super::operators::BinaryOp;
use crate::{Span, Spanned};

/// Statement node.
#[derive(Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

/// Statement kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum StmtKind {
    /// Expression statement
    Expr(Expr),

    /// `t1 = t2 = value`
    Assign { targets: Vec<Expr>, value: Expr },

    /// `target op= value`
    AugAssign {
        target: Expr,
        op: BinaryOp,
        value: Expr,
    },

    Pass,
    Break,
    Continue,
    Return(Option<Expr>),

    /// `raise` (re-raise) or `raise exc`
    Raise(Option<Expr>),

    /// `assert test, msg`
    Assert { test: Expr, msg: Option<Expr> },

    /// `import a.b, c as d`
    Import(Vec<Alias>),

    /// `from ..module import a, b as c`
    ImportFrom {
        module: Option<String>,
        names: Vec<Alias>,
        level: u32,
    },

    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },

    While { test: Expr, body: Vec<Stmt> },

    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
    },

    FunctionDef(FunctionDef),

    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        finalbody: Vec<Stmt>,
    },

    /// Suspension point of a context function. Only legal directly in a
    /// function body.
    Yield(Option<Expr>),
}

/// Imported name with optional rename.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Alias {
            name: name.into(),
            asname: None,
        }
    }

    /// The name this import binds in the importing scope.
    pub fn bound_name(&self) -> &str {
        match &self.asname {
            Some(asname) => asname,
            None => self.name.split('.').next().unwrap_or(&self.name),
        }
    }
}

/// `def name(params): body`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionDef {
    pub name: String,
    pub params: Params,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
}

impl FunctionDef {
    /// Leading string-literal statement, if any.
    pub fn docstring(&self) -> Option<&str> {
        match self.body.first().map(|stmt| &stmt.kind) {
            Some(StmtKind::Expr(Expr {
                kind: super::ExprKind::Str(doc),
                ..
            })) => Some(doc),
            _ => None,
        }
    }

    /// Whether the body suspends at a top-level `yield`.
    pub fn is_context(&self) -> bool {
        self.body
            .iter()
            .any(|stmt| matches!(stmt.kind, StmtKind::Yield(_)))
    }
}

/// Formal parameters of a `def` or `lambda`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Params {
    pub args: Vec<Param>,
    pub vararg: Option<String>,
    pub kwarg: Option<String>,
}

impl Params {
    /// Number of named positional parameters.
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
}

/// `except Type as name: body`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ExceptHandler {
    pub type_: Option<Expr>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    pub span: Span,
}
