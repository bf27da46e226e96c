//! Expression Types
//!
//! Expressions own their children through `Box`/`Vec`. Trees are small
//! (one module at a time) and the rewriter consumes and rebuilds them, so an
//! owned tree is simpler than an arena here.

use std::fmt;

use super::operators::{BinaryOp, BoolOp, CmpOp, UnaryOp};
use super::stmt::Params;
use crate::{Span, Spanned};

/// Expression node.
#[derive(Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Create an expression with no source location.
    pub fn synthetic(kind: ExprKind) -> Self {
        Expr {
            kind,
            span: Span::DUMMY,
        }
    }

    pub fn name(id: impl Into<String>, span: Span) -> Self {
        Expr::new(ExprKind::Name(id.into()), span)
    }

    pub fn string(value: impl Into<String>, span: Span) -> Self {
        Expr::new(ExprKind::Str(value.into()), span)
    }

    pub fn float(value: f64, span: Span) -> Self {
        Expr::new(ExprKind::Float(value.to_bits()), span)
    }

    /// The identifier if this is a plain name reference.
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name(id) => Some(id),
            _ => None,
        }
    }

    /// Whether this expression may appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        match &self.kind {
            ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => true,
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                items.iter().all(Expr::is_assignable)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

/// Expression kinds.
///
/// Float literals store their bits as `u64` so the tree stays `Eq + Hash`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    // Literals
    None,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(String),

    /// Variable reference
    Name(String),

    // Displays
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),

    /// `value.attr`
    Attribute { value: Box<Expr>, attr: String },

    /// `value[index]`
    Subscript { value: Box<Expr>, index: Box<Expr> },

    /// `lower:upper[:step]`, only valid as a subscript index
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },

    /// `func(args, name=value, *starargs, **kwargs)`
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
        starargs: Option<Box<Expr>>,
        kwargs: Option<Box<Expr>>,
    },

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Unary { op: UnaryOp, operand: Box<Expr> },

    /// `left op1 c1 op2 c2 ...`; `ops` and `comparators` have equal length.
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
    },

    /// `a and b and c`; at least two values.
    BoolOp { op: BoolOp, values: Vec<Expr> },

    /// `body if test else orelse`
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },

    Lambda { params: Params, body: Box<Expr> },

    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },

    GeneratorExp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
}

impl ExprKind {
    /// Float literal value.
    pub fn float_value(bits: u64) -> f64 {
        f64::from_bits(bits)
    }
}

/// `name=value` in a call.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyword {
    pub name: String,
    pub value: Expr,
}

/// One `for target in iter if cond...` clause of a comprehension.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
}
