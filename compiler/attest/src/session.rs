//! The `attest` script module and the state it shares with the runner.

use std::any::Any;
use std::rc::Rc;

use attest_eval::errors::type_error;
use attest_eval::{
    CallArgs, EvalError, EvalResult, ExceptionType, Interpreter, ModuleValue, NativeObject, Value,
};

use crate::assertion::{self, caller_bindings, test_failure_type, Statistics, TEST_FAILURE};
use crate::asserts::AssertType;
use crate::collector::TestsType;
use crate::evaluator::{evalexpr, EvaluatedExpression, ExpressionEvaluator};
use crate::rewriter::{HOOK_NAME, LIBRARY_MODULE};

/// State shared by every object of one `attest` module instance.
#[derive(Clone)]
pub struct Session {
    statistics: Rc<Statistics>,
    test_failure: ExceptionType,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            statistics: Rc::new(Statistics::new()),
            test_failure: test_failure_type(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the `attest` module on `interp` and return its session.
    /// A module installed earlier is replaced.
    pub fn install(interp: &mut Interpreter) -> Session {
        let session = Session::new();
        let module = session.module(interp);
        interp.register_module(module);
        tracing::debug!("installed the {LIBRARY_MODULE} module");
        session
    }

    pub fn statistics(&self) -> &Rc<Statistics> {
        &self.statistics
    }

    /// The session's `TestFailure` class.
    pub fn test_failure(&self) -> &ExceptionType {
        &self.test_failure
    }

    pub fn is_test_failure(&self, err: &EvalError) -> bool {
        err.is_instance(&self.test_failure)
    }

    fn module(&self, interp: &Interpreter) -> Rc<ModuleValue> {
        let module = interp.create_module(LIBRARY_MODULE, None, None);

        let session = self.clone();
        module.set(
            HOOK_NAME,
            Value::builtin(HOOK_NAME, move |interp, args| {
                assertion::assert_hook(interp, &session.statistics, &session.test_failure, args)
            }),
        );
        let statistics = Rc::clone(&self.statistics);
        module.set(
            "assert_",
            Value::builtin("assert_", move |_, args| {
                assertion::assert_value(&statistics, args)
            }),
        );
        module.set(
            TEST_FAILURE,
            Value::ExceptionType(self.test_failure.clone()),
        );
        module.set(
            "Assert",
            Value::native(AssertType::new(Rc::clone(&self.statistics))),
        );
        module.set("Tests", Value::native(TestsType::new(self.clone())));
        module.set(
            "ExpressionEvaluator",
            Value::builtin("ExpressionEvaluator", |interp, args| {
                let (text, bindings) = expression_arguments("ExpressionEvaluator", interp, args)?;
                let evaluator = ExpressionEvaluator::new(text, bindings)
                    .map_err(|err| attest_eval::errors::syntax_error(&err))?;
                let evaluated = EvaluatedExpression::evaluate(interp, &evaluator)?;
                Ok(Value::native(evaluated))
            }),
        );
        module.set(
            "evalexpr",
            Value::builtin("evalexpr", |interp, args| {
                let (text, bindings) = expression_arguments("evalexpr", interp, args)?;
                let rendered = evalexpr(interp, &text, bindings)?;
                Ok(Value::from(rendered.to_string()))
            }),
        );
        module.set(
            "statistics",
            Value::native(StatisticsObject(Rc::clone(&self.statistics))),
        );
        module
    }
}

/// `(expr, globals=None, locals=None)`, resolved against the caller.
fn expression_arguments(
    function: &str,
    interp: &Interpreter,
    args: CallArgs,
) -> Result<(String, crate::evaluator::Bindings), EvalError> {
    let [expr, globals, locals] = args
        .bind(function, &["expr"], &["globals", "locals"])?
        .try_into()
        .map_err(|_| type_error(format!("{function}() argument binding failed")))?;
    let Some(Value::Str(text)) = expr else {
        return Err(type_error(format!("{function}() expr must be a string")));
    };
    let bindings = caller_bindings(interp, globals, locals)?;
    Ok((text.to_string(), bindings))
}

/// `attest.statistics`: read-only view of the assertion counter.
struct StatisticsObject(Rc<Statistics>);

impl NativeObject for StatisticsObject {
    fn type_name(&self) -> &'static str {
        "Statistics"
    }

    fn repr(&self) -> String {
        format!("<Statistics assertions={}>", self.0.assertions())
    }

    fn get_attr(self: Rc<Self>, _interp: &mut Interpreter, name: &str) -> Option<EvalResult> {
        match name {
            "assertions" => {
                let count = i64::try_from(self.0.assertions()).unwrap_or(i64::MAX);
                Some(Ok(Value::Int(count)))
            }
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
