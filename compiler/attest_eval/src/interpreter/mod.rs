//! Tree-walking interpreter.
//!
//! # Architecture
//!
//! The interpreter owns the process-wide state a script run needs:
//! - the builtins namespace,
//! - the loaded-units registry (unit name to module),
//! - the finders consulted before the default loader (`meta_path`),
//! - the call stack, whose frames carry the scopes name lookup uses.
//!
//! Statement execution lives in `exec`, expressions in `expr`, calls and
//! context functions in `call`, attribute and item access in `access`,
//! and the import machinery in `import`.

mod access;
mod builder;
mod call;
mod exec;
mod expr;
mod import;

use std::path::PathBuf;
use std::rc::Rc;

use attest_ir::{CmpOp, Expr};
use rustc_hash::FxHashMap;

use crate::builtins;
use crate::environment::{new_namespace, Namespace};
use crate::errors::{type_error, EvalError, EvalResult, FrameOrigin};
use crate::loader::MetaPathFinder;
use crate::operators;
use crate::print_handler::SharedPrintHandler;
use crate::stack::{CallStack, Frame};
use crate::value::{BuiltinType, ModuleValue, Value};

pub use builder::InterpreterBuilder;
pub use call::ContextState;

pub struct Interpreter {
    builtins: Namespace,
    modules: FxHashMap<String, Rc<ModuleValue>>,
    meta_path: Vec<Rc<dyn MetaPathFinder>>,
    search_paths: Vec<PathBuf>,
    stack: CallStack,
    /// Exceptions currently being handled, innermost last (bare `raise`).
    handling: Vec<EvalError>,
    print_handler: SharedPrintHandler,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    fn from_parts(
        search_paths: Vec<PathBuf>,
        max_depth: usize,
        print_handler: SharedPrintHandler,
    ) -> Self {
        let builtins = new_namespace(None);
        builtins::install(&builtins);
        Interpreter {
            builtins,
            modules: FxHashMap::default(),
            meta_path: Vec::new(),
            search_paths,
            stack: CallStack::new(max_depth),
            handling: Vec::new(),
            print_handler,
        }
    }

    // Output

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    /// Replace the print handler, returning the previous one.
    pub fn set_print_handler(&mut self, handler: SharedPrintHandler) -> SharedPrintHandler {
        std::mem::replace(&mut self.print_handler, handler)
    }

    /// Write text to the current print handler.
    pub fn write_output(&self, text: &str) {
        self.print_handler.write(text);
    }

    // Builtins

    pub fn builtins(&self) -> &Namespace {
        &self.builtins
    }

    pub fn define_builtin(&self, name: &str, value: Value) {
        self.builtins.borrow_mut().define(name, value);
    }

    // Registry

    pub fn module(&self, name: &str) -> Option<Rc<ModuleValue>> {
        self.modules.get(name).cloned()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn register_module(&mut self, module: Rc<ModuleValue>) {
        tracing::trace!(module = %module.name, "registering module");
        self.modules.insert(module.name.to_string(), module);
    }

    pub fn remove_module(&mut self, name: &str) -> Option<Rc<ModuleValue>> {
        self.modules.remove(name)
    }

    /// Names of loaded units, sorted.
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }

    // Finders

    /// Install a finder ahead of all others.
    pub fn add_finder(&mut self, finder: Rc<dyn MetaPathFinder>) {
        self.meta_path.insert(0, finder);
    }

    /// Remove every finder named `name`; returns whether any was removed.
    pub fn remove_finder(&mut self, name: &str) -> bool {
        let before = self.meta_path.len();
        self.meta_path.retain(|finder| finder.name() != name);
        self.meta_path.len() != before
    }

    pub fn has_finder(&self, name: &str) -> bool {
        self.meta_path.iter().any(|finder| finder.name() == name)
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Append a directory to search for top-level units.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
    }

    // Frames

    /// Globals and locals of the innermost executing frame.
    pub fn current_scopes(&self) -> Option<(Namespace, Namespace)> {
        self.stack
            .current()
            .map(|frame| (frame.globals.clone(), frame.locals.clone()))
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Run `f` inside `frame`. An error leaving the frame records the
    /// frame's current line in its traceback.
    fn in_frame<T>(
        &mut self,
        frame: Frame,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        self.stack.push(frame)?;
        let result = f(self);
        let frame = self.stack.pop();
        result.map_err(|mut err| {
            if let Some(frame) = frame {
                err.push_frame(frame.traceback_entry());
            }
            err
        })
    }

    /// Evaluate `expr` with explicit scopes. The evaluation runs in its own
    /// frame, marked internal so reporters can hide it.
    pub fn eval_in(&mut self, expr: &Expr, globals: &Namespace, locals: &Namespace) -> EvalResult {
        let module: Rc<str> = globals
            .borrow()
            .get("__name__")
            .map_or_else(|| "<expression>".into(), |name| name.to_str().into());
        let frame = Frame {
            function: "<expression>".into(),
            module,
            file: "<expression>".into(),
            line: expr.span.line,
            globals: globals.clone(),
            locals: locals.clone(),
            origin: FrameOrigin::Internal,
        };
        self.in_frame(frame, |interp| interp.eval_expr(expr))
    }

    /// Parse and evaluate `text` with explicit scopes.
    pub fn eval_source_in(
        &mut self,
        text: &str,
        globals: &Namespace,
        locals: &Namespace,
    ) -> EvalResult {
        let expr = attest_parse::parse_expression(text)
            .map_err(|err| crate::errors::syntax_error(&err))?;
        self.eval_in(&expr, globals, locals)
    }

    // Value protocols that may call back into script code

    /// Truth value; only native objects can fail.
    pub fn truthy(&self, value: &Value) -> Result<bool, EvalError> {
        value.truthy()
    }

    /// One comparison, giving native operands the first chance.
    pub fn compare(&mut self, op: CmpOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
        if matches!(op, CmpOp::Is | CmpOp::IsNot) {
            return operators::compare_op(op, left, right);
        }
        if let Value::Native(native) = left {
            if !matches!(op, CmpOp::In | CmpOp::NotIn) {
                if let Some(result) = Rc::clone(native).compare(self, op, right) {
                    return result?.truthy();
                }
            }
        }
        if let Value::Native(native) = right {
            let result = match op {
                CmpOp::In | CmpOp::NotIn => Rc::clone(native).contains(self, left),
                _ => Rc::clone(native).compare(self, operators::reflect(op), left),
            };
            if let Some(result) = result {
                let truth = result?.truthy()?;
                return Ok(if op == CmpOp::NotIn { !truth } else { truth });
            }
        }
        operators::compare_op(op, left, right)
    }

    /// Items produced by iterating `value`.
    pub fn iterate(&mut self, value: &Value) -> Result<Vec<Value>, EvalError> {
        Ok(match value {
            Value::List(items) => items.borrow().clone(),
            Value::Tuple(items) => items.to_vec(),
            Value::Str(s) => s.chars().map(|c| Value::string(c.to_string())).collect(),
            Value::Dict(dict) => dict.borrow().keys(),
            Value::Namespace(ns) => ns
                .borrow()
                .names()
                .into_iter()
                .map(Value::from)
                .collect(),
            Value::Generator(generator) => generator.drain(),
            Value::Native(native) => match Rc::clone(native).iterate(self) {
                Some(items) => items?,
                None => return Err(crate::errors::not_iterable(value.type_name())),
            },
            other => return Err(crate::errors::not_iterable(other.type_name())),
        })
    }

    /// `len(value)`.
    pub fn len_of(&self, value: &Value) -> Result<usize, EvalError> {
        let len = match value {
            Value::Str(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.borrow().len()),
            Value::Tuple(items) => Some(items.len()),
            Value::Dict(dict) => Some(dict.borrow().len()),
            Value::Namespace(ns) => Some(ns.borrow().len()),
            Value::Native(native) => native.len(),
            _ => None,
        };
        len.ok_or_else(|| {
            type_error(format!(
                "object of type '{}' has no len()",
                value.type_name()
            ))
        })
    }

    /// `isinstance(value, classinfo)`; `classinfo` may be a tuple.
    pub fn isinstance(&self, value: &Value, classinfo: &Value) -> Result<bool, EvalError> {
        match classinfo {
            Value::Tuple(options) => {
                for option in options.iter() {
                    if self.isinstance(value, option)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Value::Type(ty) => Ok(value.builtin_type().is_some_and(|actual| {
                actual == *ty
                    || (actual == BuiltinType::Bool
                        && *ty == BuiltinType::Int)
            })),
            Value::ExceptionType(ty) => Ok(match value {
                Value::Exception(exc) => exc.ty.is_subclass_of(ty),
                _ => false,
            }),
            other => Err(type_error(format!(
                "isinstance() arg 2 must be a type or tuple of types, not {}",
                other.type_name()
            ))),
        }
    }

    /// `issubclass(cls, classinfo)`.
    pub fn issubclass(&self, cls: &Value, classinfo: &Value) -> Result<bool, EvalError> {
        if let Value::Tuple(options) = classinfo {
            for option in options.iter() {
                if self.issubclass(cls, option)? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }
        match (cls, classinfo) {
            (Value::ExceptionType(a), Value::ExceptionType(b)) => Ok(a.is_subclass_of(b)),
            (Value::Type(a), Value::Type(b)) => Ok(a == b
                || (*a == BuiltinType::Bool
                    && *b == BuiltinType::Int)),
            (Value::ExceptionType(_), Value::Type(_)) | (Value::Type(_), Value::ExceptionType(_)) => {
                Ok(false)
            }
            (Value::Type(_) | Value::ExceptionType(_), other) => Err(type_error(format!(
                "issubclass() arg 2 must be a class or tuple of classes, not {}",
                other.type_name()
            ))),
            (other, _) => Err(type_error(format!(
                "issubclass() arg 1 must be a class, not {}",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests;
