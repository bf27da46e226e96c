//! Import-time `assert` rewriting.
//!
//! A unit that imports `assert_hook` from `attest` at module scope has every
//! `assert` statement replaced by a call:
//!
//! ```text
//! assert value > 3, 'custom'
//! assert_hook('value > 3', 'custom')
//! ```
//!
//! The first argument is the un-parsed condition, so its formatting is the
//! canonical one rather than the author's. The message expression is passed
//! through as-is. The check reads the caller's scopes from the executing
//! frame, so the call names nothing but [`HOOK_NAME`]. Nothing else in the
//! tree changes.

use attest_fmt::{expr_to_source, module_to_source};
use attest_ir::visitor::walk_stmt_owned;
use attest_ir::{
    fix_missing_locations, Expr, ExprKind, Module, Span, Stmt, StmtKind, Transformer,
};
use attest_parse::ParseError;
use tracing::{debug, instrument};

/// Name of the runtime check rewritten asserts call.
pub const HOOK_NAME: &str = "assert_hook";

/// Module a unit must import [`HOOK_NAME`] from to opt in.
pub const LIBRARY_MODULE: &str = "attest";

/// How a rewritten tree becomes executable code.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CompileMode {
    /// Execute the rewritten tree directly.
    #[default]
    Tree,
    /// Un-parse the rewritten tree and parse the result again. Line numbers
    /// then refer to the regenerated text.
    Regenerate,
}

/// Rewrites the `assert` statements of one unit's source.
#[derive(Clone, Debug)]
pub struct AssertTransformer {
    source: String,
    filename: String,
}

impl AssertTransformer {
    pub fn new(source: impl Into<String>, filename: impl Into<String>) -> Self {
        AssertTransformer {
            source: source.into(),
            filename: filename.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Whether the unit opted in with `from attest import assert_hook`.
    ///
    /// The substring test only skips parsing units that cannot qualify.
    pub fn should_rewrite(&self) -> Result<bool, ParseError> {
        if !self.source.contains(HOOK_NAME) {
            return Ok(false);
        }
        let module = attest_parse::parse_module(&self.source)?;
        Ok(module.imports_name_from(LIBRARY_MODULE, HOOK_NAME))
    }

    /// The rewritten tree, with every node located.
    #[instrument(level = "debug", skip(self), fields(file = %self.filename))]
    pub fn node(&self) -> Result<Module, ParseError> {
        let module = attest_parse::parse_module(&self.source)?;
        let mut rewrite = AssertRewrite { rewritten: 0 };
        let module = rewrite.transform_module(module);
        debug!(asserts = rewrite.rewritten, "rewrote assert statements");
        Ok(fix_missing_locations(module))
    }

    /// The tree to execute under `mode`.
    pub fn code(&self, mode: CompileMode) -> Result<Module, ParseError> {
        compile(self.node()?, mode)
    }

    /// Source text of the rewritten unit.
    pub fn regenerate(&self) -> Result<String, ParseError> {
        Ok(module_to_source(&self.node()?))
    }
}

/// Turn a rewritten tree into the tree to execute under `mode`. Only
/// `Regenerate` can fail, when the un-parsed text does not parse again.
pub fn compile(node: Module, mode: CompileMode) -> Result<Module, ParseError> {
    match mode {
        CompileMode::Tree => Ok(node),
        CompileMode::Regenerate => attest_parse::parse_module(&module_to_source(&node)),
    }
}

struct AssertRewrite {
    rewritten: usize,
}

impl Transformer for AssertRewrite {
    fn transform_stmt(&mut self, stmt: Stmt) -> Stmt {
        let Stmt { kind, span } = walk_stmt_owned(self, stmt);
        match kind {
            StmtKind::Assert { test, msg } => {
                self.rewritten += 1;
                Stmt::new(StmtKind::Expr(hook_call(&test, msg, span)), span)
            }
            kind => Stmt::new(kind, span),
        }
    }
}

/// `assert_hook('<test>'[, msg])`.
fn hook_call(test: &Expr, msg: Option<Expr>, span: Span) -> Expr {
    let mut args = vec![Expr::synthetic(ExprKind::Str(expr_to_source(test)))];
    args.extend(msg);
    Expr::new(
        ExprKind::Call {
            func: Box::new(Expr::synthetic(ExprKind::Name(HOOK_NAME.to_string()))),
            args,
            keywords: Vec::new(),
            starargs: None,
            kwargs: None,
        },
        span,
    )
}

#[cfg(test)]
mod tests;
