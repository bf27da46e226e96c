//! The runtime check rewritten asserts call.
//!
//! `assert_hook(expr, msg=None, globals=None, locals=None)` counts the
//! assertion, evaluates `expr` in the caller's scopes and, when it is false,
//! raises `TestFailure` carrying the rendered expression.

use std::cell::Cell;
use std::rc::Rc;

use attest_eval::errors::{assertion_error, syntax_error, type_error};
use attest_eval::{
    BuiltinException, CallArgs, EvalError, EvalResult, ExceptionType, ExceptionValue, Interpreter,
    Namespace, Value,
};

use crate::evaluator::{Bindings, ExpressionEvaluator};

/// Name of the failure exception class.
pub const TEST_FAILURE: &str = "TestFailure";

/// Session-wide assertion counter.
#[derive(Debug, Default)]
pub struct Statistics {
    assertions: Cell<usize>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_assertion(&self) {
        self.assertions.set(self.assertions.get() + 1);
    }

    pub fn assertions(&self) -> usize {
        self.assertions.get()
    }

    pub fn reset(&self) {
        self.assertions.set(0);
    }
}

/// A false assertion, as carried by a `TestFailure` exception.
#[derive(Clone, Debug)]
pub struct AssertionFailure {
    /// The condition source.
    pub expr: String,
    /// The condition with values substituted.
    pub rendered: String,
    pub msg: Option<Value>,
}

impl AssertionFailure {
    /// `"not " + rendered`, what the failure reports.
    pub fn value(&self) -> String {
        format!("not {}", self.rendered)
    }

    /// The exception raised for this failure. Its message is the user
    /// message when one was given, the negated rendering otherwise.
    pub fn into_error(self, failure_type: &ExceptionType) -> EvalError {
        let value = self.value();
        let args = match &self.msg {
            Some(msg) => vec![msg.clone()],
            None => vec![Value::from(value.as_str())],
        };
        let exception = ExceptionValue::new(failure_type.clone(), args);
        exception.set_attr("value", Value::from(value));
        exception.set_attr("expr", Value::from(self.expr));
        exception.set_attr("rendered", Value::from(self.rendered));
        exception.set_attr("msg", self.msg.unwrap_or(Value::None));
        EvalError::from_exception(Rc::new(exception))
    }

    /// Recover the failure from a raised `TestFailure`.
    pub fn from_error(err: &EvalError, failure_type: &ExceptionType) -> Option<Self> {
        if !err.is_instance(failure_type) {
            return None;
        }
        let text = |name: &str| err.exception.get_attr(name).map(|value| value.to_str());
        Some(AssertionFailure {
            expr: text("expr")?,
            rendered: text("rendered")?,
            msg: err.exception.get_attr("msg").filter(|msg| !msg.is_none()),
        })
    }
}

impl PartialEq for AssertionFailure {
    fn eq(&self, other: &Self) -> bool {
        let same_msg = match (&self.msg, &other.msg) {
            (Some(a), Some(b)) => a.equals(b),
            (None, None) => true,
            _ => false,
        };
        self.expr == other.expr && self.rendered == other.rendered && same_msg
    }
}

/// The `TestFailure` class: a subclass of `AssertionError`.
pub fn test_failure_type() -> ExceptionType {
    ExceptionType::custom(TEST_FAILURE, BuiltinException::AssertionError.into())
}

/// Check `text` against `bindings`, raising `TestFailure` when false.
pub fn check(
    interp: &mut Interpreter,
    statistics: &Statistics,
    failure_type: &ExceptionType,
    text: &str,
    msg: Option<Value>,
    bindings: Bindings,
) -> Result<(), EvalError> {
    statistics.record_assertion();
    let evaluator = ExpressionEvaluator::new(text, bindings).map_err(|err| syntax_error(&err))?;
    if evaluator.truthy(interp)? {
        return Ok(());
    }
    let rendered = evaluator.render(interp)?.to_string();
    tracing::trace!(expr = text, %rendered, "assertion failed");
    Err(AssertionFailure {
        expr: text.to_string(),
        rendered,
        msg,
    }
    .into_error(failure_type))
}

/// The `assert_hook` builtin.
pub fn assert_hook(
    interp: &mut Interpreter,
    statistics: &Statistics,
    failure_type: &ExceptionType,
    args: CallArgs,
) -> EvalResult {
    let [expr, msg, globals, locals] = args
        .bind("assert_hook", &["expr"], &["msg", "globals", "locals"])?
        .try_into()
        .map_err(|_| type_error("assert_hook() argument binding failed"))?;
    let Some(Value::Str(text)) = expr else {
        return Err(type_error("assert_hook() expr must be a string"));
    };
    let bindings = caller_bindings(interp, globals, locals)?;
    let msg = msg.filter(|msg| !msg.is_none());
    check(interp, statistics, failure_type, &text, msg, bindings)?;
    Ok(Value::None)
}

/// `assert_(expr, msg=None)`: a counted plain assertion returning `expr`.
pub fn assert_value(statistics: &Statistics, args: CallArgs) -> EvalResult {
    let [expr, msg] = args
        .bind("assert_", &["expr"], &["msg"])?
        .try_into()
        .map_err(|_| type_error("assert_() argument binding failed"))?;
    let expr = expr.unwrap_or(Value::None);
    statistics.record_assertion();
    if expr.truthy()? {
        Ok(expr)
    } else {
        Err(assertion_error(msg.filter(|msg| !msg.is_none())))
    }
}

/// Bindings from explicit `globals`/`locals` arguments, falling back to
/// the calling frame. Globals alone stand in for locals too.
pub(crate) fn caller_bindings(
    interp: &Interpreter,
    globals: Option<Value>,
    locals: Option<Value>,
) -> Result<Bindings, EvalError> {
    let globals = globals.map(|value| scope_argument(&value, "globals")).transpose()?.flatten();
    let locals = locals.map(|value| scope_argument(&value, "locals")).transpose()?.flatten();
    let frame = Bindings::from_frame(interp);
    let explicit_globals = globals.is_some();
    let globals = match (globals, &frame) {
        (Some(globals), _) => globals,
        (None, Some(frame)) => frame.globals.clone(),
        (None, None) => interp.builtins().clone(),
    };
    let locals = match (locals, frame) {
        (Some(locals), _) => locals,
        (None, Some(frame)) if !explicit_globals => frame.locals,
        (None, _) => globals.clone(),
    };
    Ok(Bindings::new(globals, locals))
}

/// A scope passed as `globals=`/`locals=`; `None` means "not given".
fn scope_argument(value: &Value, name: &str) -> Result<Option<Namespace>, EvalError> {
    match value {
        Value::None => Ok(None),
        Value::Namespace(ns) => Ok(Some(ns.clone())),
        Value::Module(module) => Ok(Some(module.namespace.clone())),
        other => Err(type_error(format!(
            "assert_hook() {name} must be a namespace, not {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests;
