//! Attest IR - syntax tree types
//!
//! This crate contains the core data structures shared by the lexer, parser,
//! un-parser, interpreter and assertion rewriter:
//! - Spans with line/column information
//! - Tokens produced by the lexer
//! - AST nodes (`Module`, `Stmt`, `Expr`)
//! - Read-only and owning traversal traits
//!
//! With the `cache` feature every tree type derives serde traits so a parsed
//! module can be stored as a precompiled unit.

pub mod ast;
mod span;
mod token;
pub mod visitor;

pub use ast::{
    Alias, BinaryOp, BoolOp, CmpOp, Comprehension, ExceptHandler, Expr, ExprKind, FunctionDef,
    Keyword, Module, Param, Params, Precedence, Stmt, StmtKind, UnaryOp,
};
pub use span::{Span, Spanned};
pub use token::{Token, TokenKind};
pub use visitor::{fix_missing_locations, Transformer, Visitor};
