//! Partial evaluation of asserted expressions.
//!
//! An [`ExpressionEvaluator`] renders an expression against live bindings,
//! keeping the comparison, boolean and call structure of the source while
//! replacing everything else with the runtime value:
//!
//! ```text
//! value == int('2') and value < 5 - 2   with value = 2
//! ((2 == int('2')) and (2 < 3))
//! ```
//!
//! The truth value is always a separate, clean evaluation of the original
//! tree. Rendering evaluates operands independently, so short-circuiting
//! and operator semantics are lost in the rendered form.

use std::fmt;
use std::rc::Rc;

use attest_eval::{EvalError, EvalResult, Interpreter, Namespace, NativeObject, Value};
use attest_ir::{Expr, ExprKind};
use attest_parse::ParseError;
use attest_stack::ensure_sufficient_stack;

/// The caller's scopes an expression is evaluated in.
///
/// Both are live handles to the caller's scopes, so values bound after the
/// bindings were taken are visible.
#[derive(Clone, Debug)]
pub struct Bindings {
    pub globals: Namespace,
    pub locals: Namespace,
}

impl Bindings {
    pub fn new(globals: Namespace, locals: Namespace) -> Self {
        Bindings { globals, locals }
    }

    /// Module-level bindings, where globals and locals are one scope.
    pub fn module(namespace: Namespace) -> Self {
        Bindings {
            globals: namespace.clone(),
            locals: namespace,
        }
    }

    /// The scopes of the innermost executing frame.
    pub fn from_frame(interp: &Interpreter) -> Option<Self> {
        interp
            .current_scopes()
            .map(|(globals, locals)| Bindings { globals, locals })
    }
}

/// Text fragments produced by one rendering pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedExpression {
    fragments: Vec<String>,
}

impl RenderedExpression {
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }
}

impl fmt::Display for RenderedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            f.write_str(fragment)?;
        }
        Ok(())
    }
}

/// A parsed expression bound to the scopes it is evaluated in.
#[derive(Debug)]
pub struct ExpressionEvaluator {
    text: String,
    expr: Expr,
    bindings: Bindings,
}

impl ExpressionEvaluator {
    pub fn new(text: impl Into<String>, bindings: Bindings) -> Result<Self, ParseError> {
        let text = text.into();
        let expr = attest_parse::parse_expression(&text)?;
        Ok(ExpressionEvaluator {
            text,
            expr,
            bindings,
        })
    }

    /// The expression source as given.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Render the expression with sub-expressions replaced by values.
    pub fn render(&self, interp: &mut Interpreter) -> Result<RenderedExpression, EvalError> {
        let mut renderer = Renderer {
            interp,
            bindings: &self.bindings,
            out: RenderedExpression::default(),
        };
        renderer.visit(&self.expr)?;
        Ok(renderer.out)
    }

    /// Truth value of the original expression.
    pub fn truthy(&self, interp: &mut Interpreter) -> Result<bool, EvalError> {
        self.evaluate(interp)?.truthy()
    }

    /// Value of the original expression.
    pub fn evaluate(&self, interp: &mut Interpreter) -> EvalResult {
        interp.eval_in(&self.expr, &self.bindings.globals, &self.bindings.locals)
    }
}

/// Parse and render `text` in one step. Parse errors surface as
/// `SyntaxError`.
pub fn evalexpr(
    interp: &mut Interpreter,
    text: &str,
    bindings: Bindings,
) -> Result<RenderedExpression, EvalError> {
    let evaluator = ExpressionEvaluator::new(text, bindings)
        .map_err(|err| attest_eval::errors::syntax_error(&err))?;
    evaluator.render(interp)
}

struct Renderer<'a> {
    interp: &'a mut Interpreter,
    bindings: &'a Bindings,
    out: RenderedExpression,
}

impl Renderer<'_> {
    fn visit(&mut self, expr: &Expr) -> Result<(), EvalError> {
        ensure_sufficient_stack(|| self.visit_inner(expr))
    }

    fn visit_inner(&mut self, expr: &Expr) -> Result<(), EvalError> {
        match &expr.kind {
            ExprKind::Compare {
                left,
                ops,
                comparators,
            } => {
                self.out.push("(");
                self.visit(left)?;
                for (op, comparator) in ops.iter().zip(comparators) {
                    self.out.push(format!(" {} ", op.as_symbol()));
                    self.visit(comparator)?;
                }
                self.out.push(")");
            }
            ExprKind::BoolOp { op, values } => {
                self.out.push("(");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.out.push(format!(" {} ", op.as_symbol()));
                    }
                    self.visit(value)?;
                }
                self.out.push(")");
            }
            ExprKind::Call {
                func,
                args,
                keywords,
                starargs,
                kwargs,
            } => {
                self.visit(func)?;
                self.out.push("(");
                let mut first = true;
                let mut separator = |out: &mut RenderedExpression| {
                    if !std::mem::take(&mut first) {
                        out.push(", ");
                    }
                };
                for arg in args {
                    separator(&mut self.out);
                    self.visit(arg)?;
                }
                for keyword in keywords {
                    separator(&mut self.out);
                    self.out.push(format!("{}=", keyword.name));
                    self.visit(&keyword.value)?;
                }
                if let Some(starargs) = starargs {
                    separator(&mut self.out);
                    self.out.push("*");
                    self.visit(starargs)?;
                }
                if let Some(kwargs) = kwargs {
                    separator(&mut self.out);
                    self.out.push("**");
                    self.visit(kwargs)?;
                }
                self.out.push(")");
            }
            ExprKind::Attribute { value, attr } => match value.as_name() {
                Some(base) => self.out.push(format!("{base}.{attr}")),
                None => {
                    let value = self.eval(expr)?;
                    self.out.push(value.repr());
                }
            },
            ExprKind::Name(_) => {
                let value = self.eval(expr)?;
                let text = value.display_name().unwrap_or_else(|| value.repr());
                self.out.push(text);
            }
            _ => {
                let value = self.eval(expr)?;
                self.out.push(value.repr());
            }
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Expr) -> EvalResult {
        self.interp
            .eval_in(expr, &self.bindings.globals, &self.bindings.locals)
    }
}

/// `ExpressionEvaluator(expr, globals, locals)` as seen by scripts: `repr`
/// is the rendered form, truthiness the clean evaluation.
#[derive(Debug)]
pub struct EvaluatedExpression {
    pub text: String,
    pub rendered: String,
    pub truth: bool,
}

impl EvaluatedExpression {
    pub fn evaluate(
        interp: &mut Interpreter,
        evaluator: &ExpressionEvaluator,
    ) -> Result<Self, EvalError> {
        let truth = evaluator.truthy(interp)?;
        let rendered = evaluator.render(interp)?.to_string();
        Ok(EvaluatedExpression {
            text: evaluator.text().to_string(),
            rendered,
            truth,
        })
    }
}

impl NativeObject for EvaluatedExpression {
    fn type_name(&self) -> &'static str {
        "ExpressionEvaluator"
    }

    fn repr(&self) -> String {
        self.rendered.clone()
    }

    fn get_attr(self: Rc<Self>, _interp: &mut Interpreter, name: &str) -> Option<EvalResult> {
        match name {
            "expr" => Some(Ok(Value::from(self.text.as_str()))),
            _ => None,
        }
    }

    fn truthy(&self) -> Result<bool, EvalError> {
        Ok(self.truth)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
