//! Source generator.
//!
//! Prints a syntax tree back to canonical source text. Output is
//! normalized (single quotes, minimal parentheses, one space around binary
//! operators), and re-parsing it yields the same tree up to locations.
//!
//! Parentheses are decided by precedence: each child is printed with the
//! minimum precedence its position accepts, and wrapped when its own
//! precedence is lower.

use attest_ir::{
    Alias, Comprehension, ExceptHandler, Expr, ExprKind, Keyword, Module, Params, Precedence,
    Stmt, StmtKind, UnaryOp,
};
use attest_stack::ensure_sufficient_stack;

use crate::emitter::Emitter;
use crate::literals::{format_float, quote_str};

/// Precedence of an expression node as printed.
pub fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Lambda { .. } => Precedence::LAMBDA,
        ExprKind::IfExp { .. } => Precedence::TERNARY,
        ExprKind::BoolOp { op, .. } => op.precedence(),
        ExprKind::Unary { op, .. } => op.precedence(),
        ExprKind::Compare { .. } => Precedence::COMPARE,
        ExprKind::Binary { op, .. } => op.precedence(),
        ExprKind::Int(value) if *value < 0 => Precedence::UNARY,
        ExprKind::Float(bits) if f64::from_bits(*bits).is_sign_negative() => Precedence::UNARY,
        _ => Precedence::ATOM,
    }
}

/// Writes source text for syntax trees through an [`Emitter`].
pub struct SourceGenerator<'e, E: Emitter> {
    out: &'e mut E,
    indent: usize,
}

impl<'e, E: Emitter> SourceGenerator<'e, E> {
    pub fn new(out: &'e mut E) -> Self {
        SourceGenerator { out, indent: 0 }
    }

    /// Print an expression at the lowest precedence (no outer parentheses).
    pub fn expr(&mut self, expr: &Expr) {
        self.expr_prec(expr, Precedence::LAMBDA);
    }

    /// Print `expr`, parenthesized if it binds looser than `min`.
    pub fn expr_prec(&mut self, expr: &Expr, min: u8) {
        ensure_sufficient_stack(|| {
            if precedence(expr) < min {
                self.out.emit("(");
                self.expr_inner(expr);
                self.out.emit(")");
            } else {
                self.expr_inner(expr);
            }
        });
    }

    fn sequence(&mut self, items: &[Expr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.emit(", ");
            }
            self.expr(item);
        }
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::None => self.out.emit("None"),
            ExprKind::Bool(true) => self.out.emit("True"),
            ExprKind::Bool(false) => self.out.emit("False"),
            ExprKind::Int(value) => self.out.emit(&value.to_string()),
            ExprKind::Float(bits) => self.out.emit(&format_float(f64::from_bits(*bits))),
            ExprKind::Str(value) => self.out.emit(&quote_str(value)),
            ExprKind::Name(id) => self.out.emit(id),
            ExprKind::List(items) => {
                self.out.emit("[");
                self.sequence(items);
                self.out.emit("]");
            }
            ExprKind::Tuple(items) => {
                self.out.emit("(");
                self.sequence(items);
                if items.len() == 1 {
                    self.out.emit(",");
                }
                self.out.emit(")");
            }
            ExprKind::Dict(entries) => {
                self.out.emit("{");
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        self.out.emit(", ");
                    }
                    self.expr(key);
                    self.out.emit(": ");
                    self.expr(value);
                }
                self.out.emit("}");
            }
            ExprKind::Attribute { value, attr } => {
                if matches!(value.kind, ExprKind::Int(_) | ExprKind::Float(_)) {
                    self.out.emit("(");
                    self.expr(value);
                    self.out.emit(")");
                } else {
                    self.expr_prec(value, Precedence::ATOM);
                }
                self.out.emit(".");
                self.out.emit(attr);
            }
            ExprKind::Subscript { value, index } => {
                self.expr_prec(value, Precedence::ATOM);
                self.out.emit("[");
                match &index.kind {
                    ExprKind::Tuple(items) if !items.is_empty() => {
                        self.sequence(items);
                        if items.len() == 1 {
                            self.out.emit(",");
                        }
                    }
                    _ => self.expr(index),
                }
                self.out.emit("]");
            }
            ExprKind::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    self.expr(lower);
                }
                self.out.emit(":");
                if let Some(upper) = upper {
                    self.expr(upper);
                }
                if let Some(step) = step {
                    self.out.emit(":");
                    self.expr(step);
                }
            }
            ExprKind::Call {
                func,
                args,
                keywords,
                starargs,
                kwargs,
            } => {
                self.expr_prec(func, Precedence::ATOM);
                self.call_args(args, keywords, starargs.as_deref(), kwargs.as_deref());
            }
            ExprKind::Binary { op, left, right } => {
                let prec = op.precedence();
                let (left_min, right_min) = if op.is_right_assoc() {
                    (prec + 1, Precedence::UNARY)
                } else {
                    (prec, prec + 1)
                };
                self.expr_prec(left, left_min);
                self.out.emit_space();
                self.out.emit(op.as_symbol());
                self.out.emit_space();
                self.expr_prec(right, right_min);
            }
            ExprKind::Unary { op, operand } => {
                self.out.emit(op.as_symbol());
                if *op == UnaryOp::Not {
                    self.out.emit_space();
                }
                self.expr_prec(operand, op.precedence());
            }
            ExprKind::Compare {
                left,
                ops,
                comparators,
            } => {
                self.expr_prec(left, Precedence::COMPARE + 1);
                for (op, comparator) in ops.iter().zip(comparators) {
                    self.out.emit_space();
                    self.out.emit(op.as_symbol());
                    self.out.emit_space();
                    self.expr_prec(comparator, Precedence::COMPARE + 1);
                }
            }
            ExprKind::BoolOp { op, values } => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.out.emit_space();
                        self.out.emit(op.as_symbol());
                        self.out.emit_space();
                    }
                    self.expr_prec(value, op.precedence() + 1);
                }
            }
            ExprKind::IfExp { test, body, orelse } => {
                self.expr_prec(body, Precedence::OR);
                self.out.emit(" if ");
                self.expr_prec(test, Precedence::OR);
                self.out.emit(" else ");
                self.expr_prec(orelse, Precedence::TERNARY);
            }
            ExprKind::Lambda { params, body } => {
                self.out.emit("lambda");
                if !params.args.is_empty() || params.vararg.is_some() || params.kwarg.is_some() {
                    self.out.emit_space();
                    self.params(params);
                }
                self.out.emit(": ");
                self.expr(body);
            }
            ExprKind::ListComp { elt, generators } => {
                self.out.emit("[");
                self.comprehension(elt, generators);
                self.out.emit("]");
            }
            ExprKind::GeneratorExp { elt, generators } => {
                self.out.emit("(");
                self.comprehension(elt, generators);
                self.out.emit(")");
            }
        }
    }

    fn call_args(
        &mut self,
        args: &[Expr],
        keywords: &[Keyword],
        starargs: Option<&Expr>,
        kwargs: Option<&Expr>,
    ) {
        self.out.emit("(");
        // A lone generator argument needs no second pair of parentheses.
        if let [Expr {
            kind: ExprKind::GeneratorExp { elt, generators },
            ..
        }] = args
        {
            if keywords.is_empty() && starargs.is_none() && kwargs.is_none() {
                self.comprehension(elt, generators);
                self.out.emit(")");
                return;
            }
        }
        let mut first = true;
        let mut sep = |out: &mut E| {
            if !first {
                out.emit(", ");
            }
            first = false;
        };
        for arg in args {
            sep(self.out);
            self.expr(arg);
        }
        for keyword in keywords {
            sep(self.out);
            self.out.emit(&keyword.name);
            self.out.emit("=");
            self.expr(&keyword.value);
        }
        if let Some(starargs) = starargs {
            sep(self.out);
            self.out.emit("*");
            self.expr(starargs);
        }
        if let Some(kwargs) = kwargs {
            sep(self.out);
            self.out.emit("**");
            self.expr(kwargs);
        }
        self.out.emit(")");
    }

    fn comprehension(&mut self, elt: &Expr, generators: &[Comprehension]) {
        self.expr(elt);
        for generator in generators {
            self.out.emit(" for ");
            self.target(&generator.target);
            self.out.emit(" in ");
            self.expr_prec(&generator.iter, Precedence::OR);
            for cond in &generator.ifs {
                self.out.emit(" if ");
                self.expr_prec(cond, Precedence::OR);
            }
        }
    }

    /// Assignment target of `for`: bare tuples print without parentheses.
    fn target(&mut self, target: &Expr) {
        match &target.kind {
            ExprKind::Tuple(items) if items.len() > 1 => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.emit(", ");
                    }
                    self.expr_prec(item, Precedence::ADDITIVE);
                }
            }
            _ => self.expr_prec(target, Precedence::ADDITIVE),
        }
    }

    fn params(&mut self, params: &Params) {
        let mut parts = Vec::new();
        for param in &params.args {
            let mut part = param.name.clone();
            if let Some(default) = &param.default {
                part.push('=');
                part.push_str(&expr_to_source(default));
            }
            parts.push(part);
        }
        if let Some(vararg) = &params.vararg {
            parts.push(format!("*{vararg}"));
        }
        if let Some(kwarg) = &params.kwarg {
            parts.push(format!("**{kwarg}"));
        }
        self.out.emit(&parts.join(", "));
    }

    // Statements

    pub fn module(&mut self, module: &Module) {
        for stmt in &module.body {
            self.stmt(stmt);
        }
    }

    fn line_start(&mut self) {
        self.out.emit_indent(self.indent);
    }

    fn body(&mut self, body: &[Stmt]) {
        self.out.emit(":");
        self.out.emit_newline();
        self.indent += 1;
        if body.is_empty() {
            self.line_start();
            self.out.emit("pass");
            self.out.emit_newline();
        }
        for stmt in body {
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn aliases(&mut self, names: &[Alias]) {
        for (i, alias) in names.iter().enumerate() {
            if i > 0 {
                self.out.emit(", ");
            }
            self.out.emit(&alias.name);
            if let Some(asname) = &alias.asname {
                self.out.emit(" as ");
                self.out.emit(asname);
            }
        }
    }

    fn keyword_with_value(&mut self, keyword: &str, value: Option<&Expr>) {
        self.out.emit(keyword);
        if let Some(value) = value {
            self.out.emit_space();
            self.expr(value);
        }
    }

    pub fn stmt(&mut self, stmt: &Stmt) {
        ensure_sufficient_stack(|| self.stmt_inner(stmt));
    }

    fn stmt_inner(&mut self, stmt: &Stmt) {
        if let StmtKind::FunctionDef(def) = &stmt.kind {
            for decorator in &def.decorators {
                self.line_start();
                self.out.emit("@");
                self.expr(decorator);
                self.out.emit_newline();
            }
        }
        self.line_start();
        match &stmt.kind {
            StmtKind::Expr(expr) => self.expr(expr),
            StmtKind::Assign { targets, value } => {
                for target in targets {
                    self.expr(target);
                    self.out.emit(" = ");
                }
                self.expr(value);
            }
            StmtKind::AugAssign { target, op, value } => {
                self.expr(target);
                self.out.emit_space();
                self.out.emit(op.as_symbol());
                self.out.emit("= ");
                self.expr(value);
            }
            StmtKind::Pass => self.out.emit("pass"),
            StmtKind::Break => self.out.emit("break"),
            StmtKind::Continue => self.out.emit("continue"),
            StmtKind::Return(value) => self.keyword_with_value("return", value.as_ref()),
            StmtKind::Raise(value) => self.keyword_with_value("raise", value.as_ref()),
            StmtKind::Yield(value) => self.keyword_with_value("yield", value.as_ref()),
            StmtKind::Assert { test, msg } => {
                self.out.emit("assert ");
                self.expr(test);
                if let Some(msg) = msg {
                    self.out.emit(", ");
                    self.expr(msg);
                }
            }
            StmtKind::Import(names) => {
                self.out.emit("import ");
                self.aliases(names);
            }
            StmtKind::ImportFrom {
                module,
                names,
                level,
            } => {
                self.out.emit("from ");
                for _ in 0..*level {
                    self.out.emit(".");
                }
                if let Some(module) = module {
                    self.out.emit(module);
                }
                self.out.emit(" import ");
                self.aliases(names);
            }
            StmtKind::If { .. } => {
                self.if_chain(stmt, "if ");
                return;
            }
            StmtKind::While { test, body } => {
                self.out.emit("while ");
                self.expr(test);
                self.body(body);
                return;
            }
            StmtKind::For { target, iter, body } => {
                self.out.emit("for ");
                self.target(target);
                self.out.emit(" in ");
                self.expr(iter);
                self.body(body);
                return;
            }
            StmtKind::FunctionDef(def) => {
                self.out.emit("def ");
                self.out.emit(&def.name);
                self.out.emit("(");
                self.params(&def.params);
                self.out.emit(")");
                self.body(&def.body);
                return;
            }
            StmtKind::Try {
                body,
                handlers,
                finalbody,
            } => {
                self.out.emit("try");
                self.body(body);
                for handler in handlers {
                    self.handler(handler);
                }
                if !finalbody.is_empty() {
                    self.line_start();
                    self.out.emit("finally");
                    self.body(finalbody);
                }
                return;
            }
        }
        self.out.emit_newline();
    }

    /// `if`/`elif`/`else`; a lone nested `if` in `orelse` prints as `elif`.
    fn if_chain(&mut self, stmt: &Stmt, keyword: &str) {
        let StmtKind::If { test, body, orelse } = &stmt.kind else {
            return;
        };
        self.out.emit(keyword);
        self.expr(test);
        self.body(body);
        match orelse.as_slice() {
            [] => {}
            [nested @ Stmt {
                kind: StmtKind::If { .. },
                ..
            }] => {
                self.line_start();
                self.if_chain(nested, "elif ");
            }
            _ => {
                self.line_start();
                self.out.emit("else");
                self.body(orelse);
            }
        }
    }

    fn handler(&mut self, handler: &ExceptHandler) {
        self.line_start();
        self.out.emit("except");
        if let Some(type_) = &handler.type_ {
            self.out.emit_space();
            self.expr(type_);
            if let Some(name) = &handler.name {
                self.out.emit(" as ");
                self.out.emit(name);
            }
        }
        self.body(&handler.body);
    }
}

/// Canonical source text of an expression.
pub fn expr_to_source(expr: &Expr) -> String {
    let mut out = crate::StringEmitter::new();
    SourceGenerator::new(&mut out).expr(expr);
    out.output()
}

/// Canonical source text of a module, one statement per line.
pub fn module_to_source(module: &Module) -> String {
    let mut out = crate::StringEmitter::new();
    SourceGenerator::new(&mut out).module(module);
    out.output()
}
