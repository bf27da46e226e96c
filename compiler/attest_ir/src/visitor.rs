//! AST Visitor Pattern
//!
//! Two traversal traits:
//!
//! - [`Visitor`] walks a borrowed tree; the visitor mutates only its own state.
//! - [`Transformer`] consumes a tree and rebuilds it, letting an
//!   implementation replace any statement or expression on the way.
//!
//! Default implementations call `walk_*` functions that traverse children.
//! Override a method to act on specific nodes, then call the matching
//! `walk_*` function to keep descending.
//!
//! ```text
//! struct CountAsserts(usize);
//!
//! impl<'ast> Visitor<'ast> for CountAsserts {
//!     fn visit_stmt(&mut self, stmt: &'ast Stmt) {
//!         if matches!(stmt.kind, StmtKind::Assert { .. }) {
//!             self.0 += 1;
//!         }
//!         walk_stmt(self, stmt);
//!     }
//! }
//! ```

use crate::ast::{
    Comprehension, ExceptHandler, Expr, ExprKind, FunctionDef, Keyword, Module, Params, Stmt,
    StmtKind,
};
use crate::Span;

/// Read-only AST visitor.
pub trait Visitor<'ast> {
    fn visit_module(&mut self, module: &'ast Module) {
        walk_module(self, module);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_module<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, module: &'ast Module) {
    for stmt in &module.body {
        visitor.visit_stmt(stmt);
    }
}

fn walk_block<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, body: &'ast [Stmt]) {
    for stmt in body {
        visitor.visit_stmt(stmt);
    }
}

fn walk_params<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, params: &'ast Params) {
    for default in params.args.iter().filter_map(|p| p.default.as_ref()) {
        visitor.visit_expr(default);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Expr(expr) => visitor.visit_expr(expr),
        StmtKind::Assign { targets, value } => {
            for target in targets {
                visitor.visit_expr(target);
            }
            visitor.visit_expr(value);
        }
        StmtKind::AugAssign { target, value, .. } => {
            visitor.visit_expr(target);
            visitor.visit_expr(value);
        }
        StmtKind::Return(value) | StmtKind::Raise(value) | StmtKind::Yield(value) => {
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
        StmtKind::Assert { test, msg } => {
            visitor.visit_expr(test);
            if let Some(msg) = msg {
                visitor.visit_expr(msg);
            }
        }
        StmtKind::If { test, body, orelse } => {
            visitor.visit_expr(test);
            walk_block(visitor, body);
            walk_block(visitor, orelse);
        }
        StmtKind::While { test, body } => {
            visitor.visit_expr(test);
            walk_block(visitor, body);
        }
        StmtKind::For { target, iter, body } => {
            visitor.visit_expr(target);
            visitor.visit_expr(iter);
            walk_block(visitor, body);
        }
        StmtKind::FunctionDef(def) => {
            for decorator in &def.decorators {
                visitor.visit_expr(decorator);
            }
            walk_params(visitor, &def.params);
            walk_block(visitor, &def.body);
        }
        StmtKind::Try {
            body,
            handlers,
            finalbody,
        } => {
            walk_block(visitor, body);
            for handler in handlers {
                if let Some(type_) = &handler.type_ {
                    visitor.visit_expr(type_);
                }
                walk_block(visitor, &handler.body);
            }
            walk_block(visitor, finalbody);
        }
        StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Import(_)
        | StmtKind::ImportFrom { .. } => {}
    }
}

fn walk_generators<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    generators: &'ast [Comprehension],
) {
    for generator in generators {
        visitor.visit_expr(&generator.target);
        visitor.visit_expr(&generator.iter);
        for cond in &generator.ifs {
            visitor.visit_expr(cond);
        }
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::None
        | ExprKind::Bool(_)
        | ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Name(_) => {}
        ExprKind::List(items) | ExprKind::Tuple(items) => {
            for item in items {
                visitor.visit_expr(item);
            }
        }
        ExprKind::Dict(entries) => {
            for (key, value) in entries {
                visitor.visit_expr(key);
                visitor.visit_expr(value);
            }
        }
        ExprKind::Attribute { value, .. } => visitor.visit_expr(value),
        ExprKind::Subscript { value, index } => {
            visitor.visit_expr(value);
            visitor.visit_expr(index);
        }
        ExprKind::Slice { lower, upper, step } => {
            for bound in [lower, upper, step].into_iter().flatten() {
                visitor.visit_expr(bound);
            }
        }
        ExprKind::Call {
            func,
            args,
            keywords,
            starargs,
            kwargs,
        } => {
            visitor.visit_expr(func);
            for arg in args {
                visitor.visit_expr(arg);
            }
            for keyword in keywords {
                visitor.visit_expr(&keyword.value);
            }
            if let Some(starargs) = starargs {
                visitor.visit_expr(starargs);
            }
            if let Some(kwargs) = kwargs {
                visitor.visit_expr(kwargs);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr(operand),
        ExprKind::Compare {
            left, comparators, ..
        } => {
            visitor.visit_expr(left);
            for comparator in comparators {
                visitor.visit_expr(comparator);
            }
        }
        ExprKind::BoolOp { values, .. } => {
            for value in values {
                visitor.visit_expr(value);
            }
        }
        ExprKind::IfExp { test, body, orelse } => {
            visitor.visit_expr(test);
            visitor.visit_expr(body);
            visitor.visit_expr(orelse);
        }
        ExprKind::Lambda { params, body } => {
            walk_params(visitor, params);
            visitor.visit_expr(body);
        }
        ExprKind::ListComp { elt, generators } | ExprKind::GeneratorExp { elt, generators } => {
            walk_generators(visitor, generators);
            visitor.visit_expr(elt);
        }
    }
}

/// Owning AST transformer.
///
/// Each method receives a node by value and returns its replacement.
pub trait Transformer {
    fn transform_module(&mut self, module: Module) -> Module {
        walk_module_owned(self, module)
    }

    fn transform_stmt(&mut self, stmt: Stmt) -> Stmt {
        walk_stmt_owned(self, stmt)
    }

    fn transform_expr(&mut self, expr: Expr) -> Expr {
        walk_expr_owned(self, expr)
    }
}

pub fn walk_module_owned<T: Transformer + ?Sized>(transformer: &mut T, module: Module) -> Module {
    Module {
        body: transform_block(transformer, module.body),
    }
}

fn transform_block<T: Transformer + ?Sized>(transformer: &mut T, body: Vec<Stmt>) -> Vec<Stmt> {
    body.into_iter()
        .map(|stmt| transformer.transform_stmt(stmt))
        .collect()
}

fn transform_opt<T: Transformer + ?Sized>(transformer: &mut T, expr: Option<Expr>) -> Option<Expr> {
    expr.map(|expr| transformer.transform_expr(expr))
}

fn transform_boxed<T: Transformer + ?Sized>(transformer: &mut T, expr: Box<Expr>) -> Box<Expr> {
    Box::new(transformer.transform_expr(*expr))
}

fn transform_params<T: Transformer + ?Sized>(transformer: &mut T, mut params: Params) -> Params {
    for param in &mut params.args {
        if let Some(default) = param.default.take() {
            param.default = Some(transformer.transform_expr(default));
        }
    }
    params
}

pub fn walk_stmt_owned<T: Transformer + ?Sized>(transformer: &mut T, stmt: Stmt) -> Stmt {
    let Stmt { kind, span } = stmt;
    let kind = match kind {
        StmtKind::Expr(expr) => StmtKind::Expr(transformer.transform_expr(expr)),
        StmtKind::Assign { targets, value } => StmtKind::Assign {
            targets: targets
                .into_iter()
                .map(|target| transformer.transform_expr(target))
                .collect(),
            value: transformer.transform_expr(value),
        },
        StmtKind::AugAssign { target, op, value } => StmtKind::AugAssign {
            target: transformer.transform_expr(target),
            op,
            value: transformer.transform_expr(value),
        },
        StmtKind::Return(value) => StmtKind::Return(transform_opt(transformer, value)),
        StmtKind::Raise(value) => StmtKind::Raise(transform_opt(transformer, value)),
        StmtKind::Yield(value) => StmtKind::Yield(transform_opt(transformer, value)),
        StmtKind::Assert { test, msg } => StmtKind::Assert {
            test: transformer.transform_expr(test),
            msg: transform_opt(transformer, msg),
        },
        StmtKind::If { test, body, orelse } => StmtKind::If {
            test: transformer.transform_expr(test),
            body: transform_block(transformer, body),
            orelse: transform_block(transformer, orelse),
        },
        StmtKind::While { test, body } => StmtKind::While {
            test: transformer.transform_expr(test),
            body: transform_block(transformer, body),
        },
        StmtKind::For { target, iter, body } => StmtKind::For {
            target: transformer.transform_expr(target),
            iter: transformer.transform_expr(iter),
            body: transform_block(transformer, body),
        },
        StmtKind::FunctionDef(def) => StmtKind::FunctionDef(FunctionDef {
            name: def.name,
            decorators: def
                .decorators
                .into_iter()
                .map(|decorator| transformer.transform_expr(decorator))
                .collect(),
            params: transform_params(transformer, def.params),
            body: transform_block(transformer, def.body),
        }),
        StmtKind::Try {
            body,
            handlers,
            finalbody,
        } => StmtKind::Try {
            body: transform_block(transformer, body),
            handlers: handlers
                .into_iter()
                .map(|handler| ExceptHandler {
                    type_: transform_opt(transformer, handler.type_),
                    name: handler.name,
                    body: transform_block(transformer, handler.body),
                    span: handler.span,
                })
                .collect(),
            finalbody: transform_block(transformer, finalbody),
        },
        kind @ (StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Import(_)
        | StmtKind::ImportFrom { .. }) => kind,
    };
    Stmt { kind, span }
}

fn transform_generators<T: Transformer + ?Sized>(
    transformer: &mut T,
    generators: Vec<Comprehension>,
) -> Vec<Comprehension> {
    generators
        .into_iter()
        .map(|generator| Comprehension {
            target: transformer.transform_expr(generator.target),
            iter: transformer.transform_expr(generator.iter),
            ifs: generator
                .ifs
                .into_iter()
                .map(|cond| transformer.transform_expr(cond))
                .collect(),
        })
        .collect()
}

fn transform_exprs<T: Transformer + ?Sized>(transformer: &mut T, exprs: Vec<Expr>) -> Vec<Expr> {
    exprs
        .into_iter()
        .map(|expr| transformer.transform_expr(expr))
        .collect()
}

pub fn walk_expr_owned<T: Transformer + ?Sized>(transformer: &mut T, expr: Expr) -> Expr {
    let Expr { kind, span } = expr;
    let kind = match kind {
        kind @ (ExprKind::None
        | ExprKind::Bool(_)
        | ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Name(_)) => kind,
        ExprKind::List(items) => ExprKind::List(transform_exprs(transformer, items)),
        ExprKind::Tuple(items) => ExprKind::Tuple(transform_exprs(transformer, items)),
        ExprKind::Dict(entries) => ExprKind::Dict(
            entries
                .into_iter()
                .map(|(key, value)| {
                    (
                        transformer.transform_expr(key),
                        transformer.transform_expr(value),
                    )
                })
                .collect(),
        ),
        ExprKind::Attribute { value, attr } => ExprKind::Attribute {
            value: transform_boxed(transformer, value),
            attr,
        },
        ExprKind::Subscript { value, index } => ExprKind::Subscript {
            value: transform_boxed(transformer, value),
            index: transform_boxed(transformer, index),
        },
        ExprKind::Slice { lower, upper, step } => ExprKind::Slice {
            lower: lower.map(|lower| transform_boxed(transformer, lower)),
            upper: upper.map(|upper| transform_boxed(transformer, upper)),
            step: step.map(|step| transform_boxed(transformer, step)),
        },
        ExprKind::Call {
            func,
            args,
            keywords,
            starargs,
            kwargs,
        } => ExprKind::Call {
            func: transform_boxed(transformer, func),
            args: transform_exprs(transformer, args),
            keywords: keywords
                .into_iter()
                .map(|keyword| Keyword {
                    name: keyword.name,
                    value: transformer.transform_expr(keyword.value),
                })
                .collect(),
            starargs: starargs.map(|starargs| transform_boxed(transformer, starargs)),
            kwargs: kwargs.map(|kwargs| transform_boxed(transformer, kwargs)),
        },
        ExprKind::Binary { op, left, right } => ExprKind::Binary {
            op,
            left: transform_boxed(transformer, left),
            right: transform_boxed(transformer, right),
        },
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op,
            operand: transform_boxed(transformer, operand),
        },
        ExprKind::Compare {
            left,
            ops,
            comparators,
        } => ExprKind::Compare {
            left: transform_boxed(transformer, left),
            ops,
            comparators: transform_exprs(transformer, comparators),
        },
        ExprKind::BoolOp { op, values } => ExprKind::BoolOp {
            op,
            values: transform_exprs(transformer, values),
        },
        ExprKind::IfExp { test, body, orelse } => ExprKind::IfExp {
            test: transform_boxed(transformer, test),
            body: transform_boxed(transformer, body),
            orelse: transform_boxed(transformer, orelse),
        },
        ExprKind::Lambda { params, body } => ExprKind::Lambda {
            params: transform_params(transformer, params),
            body: transform_boxed(transformer, body),
        },
        ExprKind::ListComp { elt, generators } => ExprKind::ListComp {
            generators: transform_generators(transformer, generators),
            elt: transform_boxed(transformer, elt),
        },
        ExprKind::GeneratorExp { elt, generators } => ExprKind::GeneratorExp {
            generators: transform_generators(transformer, generators),
            elt: transform_boxed(transformer, elt),
        },
    };
    Expr { kind, span }
}

/// Backfill missing locations from the nearest enclosing located node.
///
/// Synthesized nodes carry [`Span::DUMMY`]; after this pass every node in
/// the module has a line number. Located nodes are left untouched.
pub fn fix_missing_locations(module: Module) -> Module {
    let mut fixer = LocationFixer {
        parents: vec![Span::new(0, 0, 1, 0)],
    };
    fixer.transform_module(module)
}

struct LocationFixer {
    parents: Vec<Span>,
}

impl LocationFixer {
    fn resolve(&self, span: Span) -> Span {
        if span.is_dummy() {
            self.parents.last().copied().unwrap_or(span)
        } else {
            span
        }
    }
}

impl Transformer for LocationFixer {
    fn transform_stmt(&mut self, stmt: Stmt) -> Stmt {
        let span = self.resolve(stmt.span);
        self.parents.push(span);
        let mut stmt = walk_stmt_owned(self, stmt);
        self.parents.pop();
        stmt.span = span;
        if let StmtKind::Try { handlers, .. } = &mut stmt.kind {
            for handler in handlers {
                if handler.span.is_dummy() {
                    handler.span = span;
                }
            }
        }
        stmt
    }

    fn transform_expr(&mut self, expr: Expr) -> Expr {
        let span = self.resolve(expr.span);
        self.parents.push(span);
        let mut expr = walk_expr_owned(self, expr);
        self.parents.pop();
        expr.span = span;
        expr
    }
}
