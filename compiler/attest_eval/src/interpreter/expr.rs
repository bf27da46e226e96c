//! Expression evaluation.

use std::rc::Rc;

use attest_ir::{BoolOp, Comprehension, Expr, ExprKind, FunctionDef, Keyword, Stmt, StmtKind};
use attest_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::environment::new_namespace;
use crate::errors::{name_error, runtime_error, type_error, EvalError, EvalResult};
use crate::operators;
use crate::value::{CallArgs, DictValue, GeneratorValue, Value};

impl Interpreter {
    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::None => Ok(Value::None),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(i) => Ok(Value::Int(*i)),
            ExprKind::Float(bits) => Ok(Value::Float(f64::from_bits(*bits))),
            ExprKind::Str(s) => Ok(Value::string(s.as_str())),
            ExprKind::Name(name) => self.lookup(name),
            ExprKind::List(items) => Ok(Value::list(self.eval_all(items)?)),
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_all(items)?)),
            ExprKind::Dict(entries) => {
                let mut dict = DictValue::new();
                for (key, value) in entries {
                    let key = self.eval_expr(key)?;
                    let value = self.eval_expr(value)?;
                    dict.insert(key, value)?;
                }
                Ok(Value::dict(dict))
            }
            ExprKind::Attribute { value, attr } => {
                let object = self.eval_expr(value)?;
                self.get_attr(&object, attr)
            }
            ExprKind::Subscript { value, index } => {
                let object = self.eval_expr(value)?;
                if let ExprKind::Slice { lower, upper, step } = &index.kind {
                    let lower = self.eval_optional(lower.as_deref())?;
                    let upper = self.eval_optional(upper.as_deref())?;
                    let step = self.eval_optional(step.as_deref())?;
                    return self.get_slice(&object, lower.as_ref(), upper.as_ref(), step.as_ref());
                }
                let index = self.eval_expr(index)?;
                self.get_item(&object, &index)
            }
            ExprKind::Slice { .. } => Err(type_error("slice outside of a subscript")),
            ExprKind::Call {
                func,
                args,
                keywords,
                starargs,
                kwargs,
            } => {
                let callee = self.eval_expr(func)?;
                let args =
                    self.eval_call_args(args, keywords, starargs.as_deref(), kwargs.as_deref())?;
                self.call(&callee, args)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                operators::binary_op(*op, &left, &right)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                operators::unary_op(*op, &operand)
            }
            ExprKind::Compare {
                left,
                ops,
                comparators,
            } => {
                let mut left = self.eval_expr(left)?;
                for (op, comparator) in ops.iter().zip(comparators) {
                    let right = self.eval_expr(comparator)?;
                    if !self.compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            ExprKind::BoolOp { op, values } => {
                let mut result = Value::None;
                for value in values {
                    result = self.eval_expr(value)?;
                    let truth = result.truthy()?;
                    let done = match op {
                        BoolOp::And => !truth,
                        BoolOp::Or => truth,
                    };
                    if done {
                        break;
                    }
                }
                Ok(result)
            }
            ExprKind::IfExp { test, body, orelse } => {
                if self.eval_expr(test)?.truthy()? {
                    self.eval_expr(body)
                } else {
                    self.eval_expr(orelse)
                }
            }
            ExprKind::Lambda { params, body } => {
                let def = FunctionDef {
                    name: "<lambda>".to_string(),
                    params: params.clone(),
                    body: vec![Stmt {
                        kind: StmtKind::Return(Some((**body).clone())),
                        span: body.span,
                    }],
                    decorators: Vec::new(),
                };
                Ok(Value::Function(self.make_function(Rc::new(def), expr.span)?))
            }
            ExprKind::ListComp { elt, generators } => {
                Ok(Value::list(self.comprehension(elt, generators)?))
            }
            ExprKind::GeneratorExp { elt, generators } => Ok(Value::Generator(Rc::new(
                GeneratorValue::new(self.comprehension(elt, generators)?),
            ))),
        }
    }

    /// Resolve a name: locals (and enclosing scopes), globals, builtins.
    pub fn lookup(&self, name: &str) -> EvalResult {
        if let Some(frame) = self.stack.current() {
            if let Some(value) = frame.locals.borrow().lookup(name) {
                return Ok(value);
            }
            if let Some(value) = frame.globals.borrow().lookup(name) {
                return Ok(value);
            }
        }
        self.builtins
            .borrow()
            .get(name)
            .ok_or_else(|| name_error(name))
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>, EvalError> {
        exprs.iter().map(|expr| self.eval_expr(expr)).collect()
    }

    fn eval_optional(&mut self, expr: Option<&Expr>) -> Result<Option<Value>, EvalError> {
        expr.map(|expr| self.eval_expr(expr)).transpose()
    }

    fn eval_call_args(
        &mut self,
        args: &[Expr],
        keywords: &[Keyword],
        starargs: Option<&Expr>,
        kwargs: Option<&Expr>,
    ) -> Result<CallArgs, EvalError> {
        let mut call_args = CallArgs::new(self.eval_all(args)?);
        if let Some(starargs) = starargs {
            let value = self.eval_expr(starargs)?;
            let items = self.iterate(&value)?;
            call_args.positional.extend(items);
        }
        for keyword in keywords {
            let value = self.eval_expr(&keyword.value)?;
            call_args.keywords.push((keyword.name.clone(), value));
        }
        if let Some(kwargs) = kwargs {
            match self.eval_expr(kwargs)? {
                Value::Dict(dict) => {
                    for (key, value) in dict.borrow().items() {
                        let Some(name) = key.as_str() else {
                            return Err(type_error("keywords must be strings"));
                        };
                        call_args.keywords.push((name.to_string(), value.clone()));
                    }
                }
                Value::Namespace(ns) => call_args.keywords.extend(ns.borrow().entries()),
                other => {
                    return Err(type_error(format!(
                        "argument after ** must be a mapping, not {}",
                        other.type_name()
                    )))
                }
            }
        }
        for (i, (name, _)) in call_args.keywords.iter().enumerate() {
            if call_args.keywords[..i].iter().any(|(seen, _)| seen == name) {
                return Err(type_error(format!(
                    "got multiple values for keyword argument '{name}'"
                )));
            }
        }
        Ok(call_args)
    }

    /// Evaluate a comprehension in a child scope of the current locals.
    fn comprehension(
        &mut self,
        elt: &Expr,
        generators: &[Comprehension],
    ) -> Result<Vec<Value>, EvalError> {
        let (_, locals) = self
            .current_scopes()
            .ok_or_else(|| runtime_error("no active frame"))?;
        let scope = new_namespace(Some(&locals));
        self.stack.replace_locals(scope);
        let mut out = Vec::new();
        let result = self.comprehension_level(elt, generators, &mut out);
        self.stack.replace_locals(locals);
        result.map(|()| out)
    }

    fn comprehension_level(
        &mut self,
        elt: &Expr,
        generators: &[Comprehension],
        out: &mut Vec<Value>,
    ) -> Result<(), EvalError> {
        let Some((first, rest)) = generators.split_first() else {
            out.push(self.eval_expr(elt)?);
            return Ok(());
        };
        let iterable = self.eval_expr(&first.iter)?;
        'items: for item in self.iterate(&iterable)? {
            self.assign(&first.target, item)?;
            for cond in &first.ifs {
                if !self.eval_expr(cond)?.truthy()? {
                    continue 'items;
                }
            }
            self.comprehension_level(elt, rest, out)?;
        }
        Ok(())
    }
}
