//! Statement execution.

use std::rc::Rc;

use attest_ir::{ExceptHandler, Expr, ExprKind, FunctionDef, Span, Stmt, StmtKind};
use attest_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::errors::{
    assertion_error, not_enough_values, runtime_error, too_many_values, type_error, ControlAction,
    EvalError, ExecResult,
};
use crate::operators;
use crate::value::{CallArgs, ExceptionValue, FunctionValue, Value};

impl Interpreter {
    pub(crate) fn exec_block(&mut self, body: &[Stmt]) -> ExecResult {
        for stmt in body {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        self.stack.set_line(stmt.span.line);
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> ExecResult {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(expr)?;
            }
            StmtKind::Assign { targets, value } => {
                let value = self.eval_expr(value)?;
                for target in targets {
                    self.assign(target, value.clone())?;
                }
            }
            StmtKind::AugAssign { target, op, value } => {
                let current = self.eval_expr(target)?;
                let rhs = self.eval_expr(value)?;
                let result = match (&current, op) {
                    // `xs += ys` extends the list in place.
                    (Value::List(items), attest_ir::BinaryOp::Add) => {
                        let extra = self.iterate(&rhs)?;
                        items.borrow_mut().extend(extra);
                        current.clone()
                    }
                    _ => operators::binary_op(*op, &current, &rhs)?,
                };
                self.assign(target, result)?;
            }
            StmtKind::Pass => {}
            StmtKind::Break => return Err(ControlAction::Break),
            StmtKind::Continue => return Err(ControlAction::Continue),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::None,
                };
                return Err(ControlAction::Return(value));
            }
            StmtKind::Raise(value) => return Err(self.raise(value.as_ref())?.into()),
            StmtKind::Assert { test, msg } => {
                if !self.eval_expr(test)?.truthy()? {
                    let message = match msg {
                        Some(msg) => Some(self.eval_expr(msg)?),
                        None => None,
                    };
                    return Err(assertion_error(message).into());
                }
            }
            StmtKind::Import(names) => self.exec_import(names)?,
            StmtKind::ImportFrom {
                module,
                names,
                level,
            } => self.exec_import_from(module.as_deref(), names, *level)?,
            StmtKind::If { test, body, orelse } => {
                if self.eval_expr(test)?.truthy()? {
                    self.exec_block(body)?;
                } else {
                    self.exec_block(orelse)?;
                }
            }
            StmtKind::While { test, body } => {
                while self.eval_expr(test)?.truthy()? {
                    match self.exec_block(body) {
                        Ok(()) | Err(ControlAction::Continue) => {}
                        Err(ControlAction::Break) => break,
                        Err(other) => return Err(other),
                    }
                }
            }
            StmtKind::For { target, iter, body } => {
                let iterable = self.eval_expr(iter)?;
                for item in self.iterate(&iterable)? {
                    self.assign(target, item)?;
                    match self.exec_block(body) {
                        Ok(()) | Err(ControlAction::Continue) => {}
                        Err(ControlAction::Break) => break,
                        Err(other) => return Err(other),
                    }
                }
            }
            StmtKind::FunctionDef(def) => {
                let function = self.make_function(Rc::new(def.clone()), stmt.span)?;
                let mut value = Value::Function(function);
                for decorator in def.decorators.iter().rev() {
                    let decorator = self.eval_expr(decorator)?;
                    value = self.call(&decorator, CallArgs::new(vec![value]))?;
                }
                self.assign_name(&def.name, value);
            }
            StmtKind::Try {
                body,
                handlers,
                finalbody,
            } => return self.exec_try(body, handlers, finalbody),
            StmtKind::Yield(_) => {
                // Only reachable when a context function is called as a
                // plain function, which `call` rejects.
                return Err(runtime_error("'yield' outside a context").into());
            }
        }
        Ok(())
    }

    fn exec_try(
        &mut self,
        body: &[Stmt],
        handlers: &[ExceptHandler],
        finalbody: &[Stmt],
    ) -> ExecResult {
        let mut outcome = self.exec_block(body);
        if let Err(ControlAction::Error(err)) = outcome {
            outcome = match self.find_handler(&err, handlers) {
                Ok(Some(handler)) => self.run_handler(handler, err),
                Ok(None) => Err(ControlAction::Error(err)),
                Err(handler_err) => Err(ControlAction::Error(handler_err)),
            };
        }
        if finalbody.is_empty() {
            return outcome;
        }
        // A `finally` that exits abnormally replaces the pending outcome.
        self.exec_block(finalbody)?;
        outcome
    }

    fn find_handler<'h>(
        &mut self,
        err: &EvalError,
        handlers: &'h [ExceptHandler],
    ) -> Result<Option<&'h ExceptHandler>, EvalError> {
        for handler in handlers {
            let Some(type_expr) = &handler.type_ else {
                return Ok(Some(handler));
            };
            let classinfo = self.eval_expr(type_expr)?;
            if exception_matches(err, &classinfo)? {
                return Ok(Some(handler));
            }
        }
        Ok(None)
    }

    fn run_handler(&mut self, handler: &ExceptHandler, err: EvalError) -> ExecResult {
        if let Some(name) = &handler.name {
            self.assign_name(name, err.value());
        }
        self.handling.push(err);
        let result = self.exec_block(&handler.body);
        self.handling.pop();
        result
    }

    /// Build the error for a `raise` statement.
    fn raise(&mut self, value: Option<&Expr>) -> Result<EvalError, EvalError> {
        let Some(expr) = value else {
            return match self.handling.last() {
                Some(err) => Ok(err.clone()),
                None => Err(runtime_error("No active exception to reraise")),
            };
        };
        match self.eval_expr(expr)? {
            Value::Exception(exception) => Ok(EvalError::from_exception(exception)),
            Value::ExceptionType(ty) => Ok(EvalError::from_exception(Rc::new(
                ExceptionValue::new(ty, Vec::new()),
            ))),
            _ => Err(type_error("exceptions must derive from BaseException")),
        }
    }

    /// Create a function value for `def`, evaluating defaults now.
    pub(crate) fn make_function(
        &mut self,
        def: Rc<FunctionDef>,
        span: Span,
    ) -> Result<Rc<FunctionValue>, EvalError> {
        let mut defaults = Vec::with_capacity(def.params.args.len());
        for param in &def.params.args {
            defaults.push(match &param.default {
                Some(expr) => Some(self.eval_expr(expr)?),
                None => None,
            });
        }
        let frame = self
            .stack
            .current()
            .ok_or_else(|| runtime_error("no active frame"))?;
        let closure = if frame.locals.ptr_eq(&frame.globals) {
            None
        } else {
            Some(frame.locals.clone())
        };
        Ok(Rc::new(FunctionValue {
            def,
            defaults,
            closure,
            globals: frame.globals.clone(),
            module: Rc::clone(&frame.module),
            file: Rc::clone(&frame.file),
            span,
        }))
    }

    pub(crate) fn assign_name(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.stack.current() {
            frame.locals.borrow_mut().define(name, value);
        }
    }

    /// Bind `value` to an assignment target.
    pub(crate) fn assign(&mut self, target: &Expr, value: Value) -> Result<(), EvalError> {
        match &target.kind {
            ExprKind::Name(name) => {
                self.assign_name(name, value);
                Ok(())
            }
            ExprKind::Tuple(targets) | ExprKind::List(targets) => {
                let items = self.iterate(&value)?;
                if items.len() < targets.len() {
                    return Err(not_enough_values(targets.len(), items.len()));
                }
                if items.len() > targets.len() {
                    return Err(too_many_values(targets.len()));
                }
                for (target, item) in targets.iter().zip(items) {
                    self.assign(target, item)?;
                }
                Ok(())
            }
            ExprKind::Attribute { value: object, attr } => {
                let object = self.eval_expr(object)?;
                self.set_attr(&object, attr, value)
            }
            ExprKind::Subscript { value: object, index } => {
                let object = self.eval_expr(object)?;
                let index = self.eval_expr(index)?;
                self.set_item(&object, &index, value)
            }
            _ => Err(type_error("invalid assignment target")),
        }
    }
}

/// Whether an `except` clause's class (or tuple of classes) matches.
fn exception_matches(err: &EvalError, classinfo: &Value) -> Result<bool, EvalError> {
    match classinfo {
        Value::ExceptionType(ty) => Ok(err.is_instance(ty)),
        Value::Tuple(options) => {
            for option in options.iter() {
                if exception_matches(err, option)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(type_error(
            "catching classes that do not inherit from BaseException is not allowed",
        )),
    }
}
