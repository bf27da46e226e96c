//! Syntax tree for attest scripts.
//!
//! - [`expr`]: expression nodes
//! - [`stmt`]: statement nodes, function definitions, imports
//! - [`operators`]: operator enums with symbols and precedence

mod expr;
mod operators;
mod stmt;

pub use expr::{Comprehension, Expr, ExprKind, Keyword};
pub use operators::{BinaryOp, BoolOp, CmpOp, Precedence, UnaryOp};
pub use stmt::{Alias, ExceptHandler, FunctionDef, Param, Params, Stmt, StmtKind};

/// A parsed program unit.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    pub body: Vec<Stmt>,
}

impl Module {
    pub fn new(body: Vec<Stmt>) -> Self {
        Module { body }
    }

    /// Whether the module scope contains `from <module> import <name>` with
    /// `name` bound under its own name.
    pub fn imports_name_from(&self, module: &str, name: &str) -> bool {
        self.body.iter().any(|stmt| match &stmt.kind {
            StmtKind::ImportFrom {
                module: Some(from),
                names,
                level: 0,
            } => from == module && names.iter().any(|a| a.name == name && a.asname.is_none()),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests;
