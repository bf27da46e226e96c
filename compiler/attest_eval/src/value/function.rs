//! Callable values: script functions, builtins, and call arguments.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use attest_ir::{FunctionDef, Span};

use super::Value;
use crate::environment::Namespace;
use crate::errors::{type_error, EvalError, EvalResult};
use crate::Interpreter;

/// A function defined by a `def` statement or a `lambda`.
pub struct FunctionValue {
    pub def: Rc<FunctionDef>,
    /// Evaluated default for each parameter (`None` = required).
    pub defaults: Vec<Option<Value>>,
    /// Enclosing function scope, if defined inside a function.
    pub closure: Option<Namespace>,
    pub globals: Namespace,
    pub module: Rc<str>,
    pub file: Rc<str>,
    /// Location of the `def` (or `lambda`).
    pub span: Span,
}

impl FunctionValue {
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Whether calling requires entering and exiting around a `yield`.
    pub fn is_context(&self) -> bool {
        self.def.is_context()
    }

    /// `module.function`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.def.name)
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.def.name)
    }
}

pub type BuiltinFn = dyn Fn(&mut Interpreter, CallArgs) -> EvalResult;

/// A function implemented in Rust.
pub struct BuiltinFunction {
    pub name: String,
    pub func: Rc<BuiltinFn>,
}

impl BuiltinFunction {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&mut Interpreter, CallArgs) -> EvalResult + 'static,
    ) -> Self {
        BuiltinFunction {
            name: name.into(),
            func: Rc::new(func),
        }
    }
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<built-in function {}>", self.name)
    }
}

/// Arguments of one call after `*` and `**` expansion.
#[derive(Clone, Debug, Default)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keywords: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new(positional: Vec<Value>) -> Self {
        CallArgs {
            positional,
            keywords: Vec::new(),
        }
    }

    pub fn with_keyword(mut self, name: impl Into<String>, value: Value) -> Self {
        self.keywords.push((name.into(), value));
        self
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return the keyword argument `name`.
    pub fn take_keyword(&mut self, name: &str) -> Option<Value> {
        let index = self.keywords.iter().position(|(key, _)| key == name)?;
        Some(self.keywords.remove(index).1)
    }

    /// Reject keyword arguments for builtins that take none.
    pub fn no_keywords(&self, function: &str) -> Result<(), EvalError> {
        match self.keywords.first() {
            Some((name, _)) => Err(type_error(format!(
                "{function}() got an unexpected keyword argument '{name}'"
            ))),
            None => Ok(()),
        }
    }

    /// Positional arguments, requiring a count within `min..=max`.
    pub fn expect_positional(
        &self,
        function: &str,
        min: usize,
        max: usize,
    ) -> Result<&[Value], EvalError> {
        self.no_keywords(function)?;
        let count = self.positional.len();
        if count < min || count > max {
            let expected = if min == max {
                format!("exactly {min}")
            } else if count < min {
                format!("at least {min}")
            } else {
                format!("at most {max}")
            };
            let noun = if expected.ends_with(" 1") {
                "argument"
            } else {
                "arguments"
            };
            return Err(type_error(format!(
                "{function}() takes {expected} {noun} ({count} given)"
            )));
        }
        Ok(&self.positional)
    }

    /// Bind arguments by name against a builtin's parameter list; missing
    /// optional parameters come back as `None`.
    pub fn bind(
        mut self,
        function: &str,
        required: &[&str],
        optional: &[&str],
    ) -> Result<Vec<Option<Value>>, EvalError> {
        let names: Vec<&str> = required.iter().chain(optional).copied().collect();
        if self.positional.len() > names.len() {
            return Err(type_error(format!(
                "{function}() takes at most {} arguments ({} given)",
                names.len(),
                self.positional.len()
            )));
        }
        let mut bound: Vec<Option<Value>> = vec![None; names.len()];
        for (slot, value) in bound.iter_mut().zip(self.positional.drain(..)) {
            *slot = Some(value);
        }
        for (name, value) in self.keywords {
            let Some(index) = names.iter().position(|candidate| *candidate == name) else {
                return Err(type_error(format!(
                    "{function}() got an unexpected keyword argument '{name}'"
                )));
            };
            if bound[index].is_some() {
                return Err(type_error(format!(
                    "{function}() got multiple values for argument '{name}'"
                )));
            }
            bound[index] = Some(value);
        }
        for (index, name) in required.iter().enumerate() {
            if bound[index].is_none() {
                return Err(type_error(format!(
                    "{function}() missing required argument: '{name}'"
                )));
            }
        }
        Ok(bound)
    }
}

/// A loaded program unit.
pub struct ModuleValue {
    pub name: Rc<str>,
    pub file: Option<PathBuf>,
    /// Search path for submodules; set for packages only.
    pub package_path: Option<Vec<PathBuf>>,
    pub namespace: Namespace,
}

impl ModuleValue {
    pub fn is_package(&self) -> bool {
        self.package_path.is_some()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.namespace.borrow().get(name)
    }

    pub fn set(&self, name: &str, value: Value) {
        self.namespace.borrow_mut().define(name, value);
    }

    pub fn repr(&self) -> String {
        match &self.file {
            Some(file) => format!("<module '{}' from '{}'>", self.name, file.display()),
            None => format!("<module '{}' (built-in)>", self.name),
        }
    }
}

impl fmt::Debug for ModuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}
