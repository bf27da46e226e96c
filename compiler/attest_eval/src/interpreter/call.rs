//! Calling values, binding arguments, and running context functions.
//!
//! A context function is a `def` with one top-level `yield`. Entering runs
//! the statements before the `yield` and returns the yielded value; exiting
//! resumes in the same scope with the statements after it.

use std::rc::Rc;

use attest_ir::StmtKind;

use super::Interpreter;
use crate::environment::{new_namespace, Namespace};
use crate::errors::{not_callable, runtime_error, type_error, ControlAction, EvalError, EvalResult};
use crate::stack::Frame;
use crate::value::{CallArgs, DictValue, FunctionValue, Value};

/// A context function suspended at its `yield`.
pub struct ContextState {
    function: Rc<FunctionValue>,
    locals: Namespace,
    resume_at: usize,
}

impl ContextState {
    pub fn function(&self) -> &Rc<FunctionValue> {
        &self.function
    }
}

impl Interpreter {
    /// Call any callable value.
    pub fn call(&mut self, callee: &Value, args: CallArgs) -> EvalResult {
        match callee {
            Value::Function(function) => self.call_function(function, args),
            Value::Builtin(builtin) => {
                let func = Rc::clone(&builtin.func);
                func(self, args)
            }
            Value::Type(ty) => crate::builtins::construct(self, *ty, args),
            Value::ExceptionType(ty) => {
                args.no_keywords(ty.name())?;
                Ok(Value::exception(ty.clone(), args.positional))
            }
            Value::Native(native) => Rc::clone(native).call(self, args),
            other => Err(not_callable(other.type_name())),
        }
    }

    pub fn call_function(&mut self, function: &Rc<FunctionValue>, args: CallArgs) -> EvalResult {
        if function.is_context() {
            return Err(type_error(format!(
                "context function '{}' must be used as a test context",
                function.name()
            )));
        }
        let locals = self.bind_arguments(function, args)?;
        let frame = function_frame(function, locals);
        let def = Rc::clone(&function.def);
        self.in_frame(frame, |interp| match interp.exec_block(&def.body) {
            Ok(()) => Ok(Value::None),
            Err(ControlAction::Return(value)) => Ok(value),
            Err(ControlAction::Error(err)) => Err(err),
            Err(ControlAction::Break | ControlAction::Continue) => {
                Err(runtime_error("'break' or 'continue' outside loop"))
            }
        })
    }

    /// Bind call arguments to a fresh local scope for `function`.
    fn bind_arguments(
        &mut self,
        function: &FunctionValue,
        args: CallArgs,
    ) -> Result<Namespace, EvalError> {
        let params = &function.def.params;
        let name = function.name();
        let locals = new_namespace(function.closure.as_ref());
        let mut bound: Vec<Option<Value>> = vec![None; params.args.len()];

        let mut positional = args.positional.into_iter();
        for slot in &mut bound {
            match positional.next() {
                Some(value) => *slot = Some(value),
                None => break,
            }
        }
        let extra: Vec<Value> = positional.collect();
        if !extra.is_empty() && params.vararg.is_none() {
            let given = params.args.len() + extra.len();
            return Err(type_error(format!(
                "{name}() takes {} positional argument{} but {given} were given",
                params.args.len(),
                if params.args.len() == 1 { "" } else { "s" },
            )));
        }

        let mut extra_keywords = DictValue::new();
        for (key, value) in args.keywords {
            match params.args.iter().position(|param| param.name == key) {
                Some(index) if bound[index].is_some() => {
                    return Err(type_error(format!(
                        "{name}() got multiple values for argument '{key}'"
                    )));
                }
                Some(index) => bound[index] = Some(value),
                None if params.kwarg.is_some() => {
                    extra_keywords.insert(Value::from(key), value)?;
                }
                None => {
                    return Err(type_error(format!(
                        "{name}() got an unexpected keyword argument '{key}'"
                    )));
                }
            }
        }

        let mut scope = locals.borrow_mut();
        for ((param, slot), default) in params.args.iter().zip(bound).zip(&function.defaults) {
            let value = match (slot, default) {
                (Some(value), _) => value,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(type_error(format!(
                        "{name}() missing required argument: '{}'",
                        param.name
                    )));
                }
            };
            scope.define(&param.name, value);
        }
        if let Some(vararg) = &params.vararg {
            scope.define(vararg, Value::tuple(extra));
        }
        if let Some(kwarg) = &params.kwarg {
            scope.define(kwarg, Value::dict(extra_keywords));
        }
        drop(scope);
        Ok(locals)
    }

    /// Run a context function up to its `yield`.
    pub fn enter_context(
        &mut self,
        function: &Rc<FunctionValue>,
        args: CallArgs,
    ) -> Result<(Value, ContextState), EvalError> {
        if !function.is_context() {
            return Err(type_error(format!(
                "'{}' is not a context function (no 'yield')",
                function.name()
            )));
        }
        let locals = self.bind_arguments(function, args)?;
        let frame = function_frame(function, locals.clone());
        let def = Rc::clone(&function.def);
        let (value, resume_at) = self.in_frame(frame, |interp| {
            for (index, stmt) in def.body.iter().enumerate() {
                if let StmtKind::Yield(value) = &stmt.kind {
                    interp.stack.set_line(stmt.span.line);
                    let value = match value {
                        Some(expr) => interp.eval_expr(expr)?,
                        None => Value::None,
                    };
                    return Ok((value, index + 1));
                }
                match interp.exec_stmt(stmt) {
                    Ok(()) => {}
                    Err(ControlAction::Error(err)) => return Err(err),
                    Err(_) => break,
                }
            }
            Err(runtime_error(format!(
                "context function '{}' did not yield",
                def.name
            )))
        })?;
        Ok((
            value,
            ContextState {
                function: Rc::clone(function),
                locals,
                resume_at,
            },
        ))
    }

    /// Resume a context function after its `yield` (teardown).
    pub fn exit_context(&mut self, state: ContextState) -> Result<(), EvalError> {
        let frame = function_frame(&state.function, state.locals);
        let def = Rc::clone(&state.function.def);
        let teardown = def.body.get(state.resume_at..).unwrap_or_default();
        self.in_frame(frame, |interp| match interp.exec_block(teardown) {
            Ok(()) | Err(ControlAction::Return(_)) => Ok(()),
            Err(ControlAction::Error(err)) => Err(err),
            Err(ControlAction::Break | ControlAction::Continue) => {
                Err(runtime_error("'break' or 'continue' outside loop"))
            }
        })
    }
}

fn function_frame(function: &FunctionValue, locals: Namespace) -> Frame {
    Frame {
        function: function.name().into(),
        module: Rc::clone(&function.module),
        file: Rc::clone(&function.file),
        line: function.span.line,
        globals: function.globals.clone(),
        locals,
        origin: crate::errors::FrameOrigin::User,
    }
}
