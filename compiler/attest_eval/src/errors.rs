//! Evaluation errors.
//!
//! A script exception travels through Rust code as an [`EvalError`]: the
//! exception value plus the traceback collected while it unwinds. Statement
//! execution uses [`ControlAction`] so `break`, `continue` and `return`
//! share the error channel without being errors.
//!
//! Error values are built through the `#[cold]` factory functions below so
//! message wording lives in one place.

use std::fmt;
use std::rc::Rc;

use attest_parse::ParseError;

use crate::value::{BuiltinException, ExceptionType, ExceptionValue, Value};

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, EvalError>;

/// Result of executing a statement.
pub type ExecResult = Result<(), ControlAction>;

/// Where a traceback frame's code came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameOrigin {
    /// Script code loaded from a program unit.
    User,
    /// Code evaluated on the library's behalf (assertion re-evaluation).
    Internal,
}

/// One frame of a traceback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracebackEntry {
    pub file: Rc<str>,
    pub line: u32,
    pub function: Rc<str>,
    pub origin: FrameOrigin,
}

impl fmt::Display for TracebackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File \"{}\", line {}, in {}",
            self.file, self.line, self.function
        )
    }
}

/// A raised script exception.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub exception: Rc<ExceptionValue>,
    /// Frames the exception passed through, outermost first.
    pub traceback: Vec<TracebackEntry>,
}

impl EvalError {
    pub fn new(ty: impl Into<ExceptionType>, message: impl Into<String>) -> Self {
        let message: String = message.into();
        EvalError::from_exception(Rc::new(ExceptionValue::new(
            ty.into(),
            vec![Value::string(message)],
        )))
    }

    pub fn from_exception(exception: Rc<ExceptionValue>) -> Self {
        EvalError {
            exception,
            traceback: Vec::new(),
        }
    }

    pub fn exception_type(&self) -> &ExceptionType {
        &self.exception.ty
    }

    /// Whether the exception is an instance of `ty` or a subclass.
    pub fn is_instance(&self, ty: &ExceptionType) -> bool {
        self.exception.ty.is_subclass_of(ty)
    }

    pub fn is(&self, builtin: BuiltinException) -> bool {
        self.is_instance(&ExceptionType::Builtin(builtin))
    }

    /// `str()` of the exception.
    pub fn message(&self) -> String {
        self.exception.message()
    }

    /// Record the frame the exception is leaving. Frames are added
    /// innermost first and kept outermost first.
    pub fn push_frame(&mut self, entry: TracebackEntry) {
        self.traceback.insert(0, entry);
    }

    /// The exception as a script value.
    pub fn value(&self) -> Value {
        Value::Exception(Rc::clone(&self.exception))
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message();
        if message.is_empty() {
            f.write_str(self.exception.ty.name())
        } else {
            write!(f, "{}: {message}", self.exception.ty.name())
        }
    }
}

impl std::error::Error for EvalError {}

/// Non-local exits out of a statement.
#[derive(Debug)]
pub enum ControlAction {
    Break,
    Continue,
    Return(Value),
    Error(EvalError),
}

impl From<EvalError> for ControlAction {
    fn from(err: EvalError) -> Self {
        ControlAction::Error(err)
    }
}

// Name and attribute errors

#[cold]
pub fn name_error(name: &str) -> EvalError {
    EvalError::new(
        BuiltinException::NameError,
        format!("name '{name}' is not defined"),
    )
}

#[cold]
pub fn attribute_error(type_name: &str, attr: &str) -> EvalError {
    EvalError::new(
        BuiltinException::AttributeError,
        format!("'{type_name}' object has no attribute '{attr}'"),
    )
}

// Type and value errors

#[cold]
pub fn type_error(message: impl Into<String>) -> EvalError {
    EvalError::new(BuiltinException::TypeError, message)
}

#[cold]
pub fn value_error(message: impl Into<String>) -> EvalError {
    EvalError::new(BuiltinException::ValueError, message)
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    type_error(format!("'{type_name}' object is not callable"))
}

#[cold]
pub fn not_iterable(type_name: &str) -> EvalError {
    type_error(format!("'{type_name}' object is not iterable"))
}

#[cold]
pub fn unsupported_operands(op: &str, left: &str, right: &str) -> EvalError {
    type_error(format!(
        "unsupported operand type(s) for {op}: '{left}' and '{right}'"
    ))
}

#[cold]
pub fn unorderable(op: &str, left: &str, right: &str) -> EvalError {
    type_error(format!(
        "'{op}' not supported between instances of '{left}' and '{right}'"
    ))
}

// Lookup errors

#[cold]
pub fn index_error(type_name: &str) -> EvalError {
    EvalError::new(
        BuiltinException::IndexError,
        format!("{type_name} index out of range"),
    )
}

#[cold]
pub fn key_error(key: &Value) -> EvalError {
    EvalError::from_exception(Rc::new(ExceptionValue::new(
        BuiltinException::KeyError.into(),
        vec![key.clone()],
    )))
}

// Arithmetic errors

#[cold]
pub fn zero_division(message: &str) -> EvalError {
    EvalError::new(BuiltinException::ZeroDivisionError, message)
}

#[cold]
pub fn overflow_error(operation: &str) -> EvalError {
    EvalError::new(
        BuiltinException::OverflowError,
        format!("integer overflow in {operation}"),
    )
}

#[cold]
pub fn repeat_too_long() -> EvalError {
    EvalError::new(
        BuiltinException::OverflowError,
        "repeated sequence is too long",
    )
}

// Runtime errors

#[cold]
pub fn runtime_error(message: impl Into<String>) -> EvalError {
    EvalError::new(BuiltinException::RuntimeError, message)
}

#[cold]
pub fn recursion_limit_exceeded(limit: usize) -> EvalError {
    EvalError::new(
        BuiltinException::RecursionError,
        format!("maximum recursion depth exceeded (limit: {limit})"),
    )
}

#[cold]
pub fn import_error(message: impl Into<String>) -> EvalError {
    EvalError::new(BuiltinException::ImportError, message)
}

#[cold]
pub fn syntax_error(err: &ParseError) -> EvalError {
    EvalError::new(BuiltinException::SyntaxError, err.to_string())
}

/// `AssertionError` from a plain `assert` statement.
#[cold]
pub fn assertion_error(message: Option<Value>) -> EvalError {
    EvalError::from_exception(Rc::new(ExceptionValue::new(
        BuiltinException::AssertionError.into(),
        message.into_iter().collect(),
    )))
}

#[cold]
pub fn not_enough_values(expected: usize, got: usize) -> EvalError {
    value_error(format!(
        "not enough values to unpack (expected {expected}, got {got})"
    ))
}

#[cold]
pub fn too_many_values(expected: usize) -> EvalError {
    value_error(format!("too many values to unpack (expected {expected})"))
}

#[cfg(test)]
mod tests;
