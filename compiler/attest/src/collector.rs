//! Test collections.
//!
//! `Tests()` in a script creates a [`TestCollection`]:
//!
//! ```text
//! suite = Tests()
//!
//! @suite.context
//! def connection():
//!     conn = connect()
//!     yield conn
//!     conn.close()
//!
//! @suite.test
//! def ping(conn):
//!     assert conn.ping()
//! ```
//!
//! Contexts apply to every test of the collection, including tests
//! registered before the context. Iterating a collection yields callables
//! that run the contexts around the test.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use attest_eval::errors::{runtime_error, type_error};
use attest_eval::{CallArgs, EvalError, EvalResult, Interpreter, NativeObject, Value};
use tracing::debug;

use crate::reporters::{get_reporter_by_name, HandlerWriter};
use crate::runner::{run_tests, RunnerConfig};
use crate::session::Session;
use crate::utils::{deep_get_members, import_dotted_name};

type CollectionMethod = fn(&Rc<TestCollection>, &mut Interpreter, CallArgs) -> EvalResult;

const COLLECTION_METHODS: &[(&str, CollectionMethod)] = &[
    ("test", TestCollection::test),
    ("test_if", TestCollection::test_if),
    ("context", TestCollection::context),
    ("register", TestCollection::register),
    ("register_if", TestCollection::register_if),
    ("run", TestCollection::run),
];

/// The `Tests` class object.
pub struct TestsType {
    session: Session,
}

impl TestsType {
    pub fn new(session: Session) -> Self {
        TestsType { session }
    }
}

impl NativeObject for TestsType {
    fn type_name(&self) -> &'static str {
        "type"
    }

    fn repr(&self) -> String {
        "<class 'Tests'>".to_string()
    }

    fn get_attr(self: Rc<Self>, _interp: &mut Interpreter, name: &str) -> Option<EvalResult> {
        match name {
            "__name__" => Some(Ok(Value::from("Tests"))),
            _ => None,
        }
    }

    /// `Tests(tests=(), contexts=None)`.
    fn call(self: Rc<Self>, interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let [tests, contexts] = args
            .bind("Tests", &[], &["tests", "contexts"])?
            .try_into()
            .map_err(|_| type_error("Tests() argument binding failed"))?;
        let collection = Rc::new(TestCollection::new(self.session.clone()));
        if let Some(contexts) = contexts.filter(|value| !value.is_none()) {
            for context in interp.iterate(&contexts)? {
                collection.add_context(context)?;
            }
        }
        if let Some(tests) = tests {
            for test in interp.iterate(&tests)? {
                collection.register_value(interp, test)?;
            }
        }
        Ok(Value::Native(collection))
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A collection of tests and the contexts they run in.
pub struct TestCollection {
    tests: RefCell<Vec<Value>>,
    contexts: RefCell<Vec<Value>>,
    session: Session,
}

impl TestCollection {
    pub fn new(session: Session) -> Self {
        TestCollection {
            tests: RefCell::new(Vec::new()),
            contexts: RefCell::new(Vec::new()),
            session,
        }
    }

    pub fn len(&self) -> usize {
        self.tests.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.borrow().is_empty()
    }

    /// The collected tests, each wrapped in the collection's contexts.
    pub fn tests(&self) -> Vec<Value> {
        let contexts = self.contexts.borrow();
        self.tests
            .borrow()
            .iter()
            .map(|test| {
                if contexts.is_empty() {
                    test.clone()
                } else {
                    Value::native(TestCase::new(test.clone(), contexts.clone()))
                }
            })
            .collect()
    }

    pub fn add_test(&self, test: Value) {
        self.tests.borrow_mut().push(test);
    }

    /// Add a context function: a `def` with one top-level `yield`.
    pub fn add_context(&self, context: Value) -> Result<(), EvalError> {
        match &context {
            Value::Function(function) if function.is_context() => {
                self.contexts.borrow_mut().push(context);
                Ok(())
            }
            other => Err(type_error(format!(
                "{} is not a context function (no 'yield')",
                other.repr()
            ))),
        }
    }

    /// Register tests from a collection, a callable, an iterable of those,
    /// a module (every collection in it and its submodules) or a dotted
    /// name of any of these.
    pub fn register_value(&self, interp: &mut Interpreter, tests: Value) -> Result<(), EvalError> {
        match &tests {
            Value::Str(name) => {
                let imported = import_dotted_name(interp, name)?;
                self.register_value(interp, imported)
            }
            Value::Module(module) => {
                let collections = deep_get_members(interp, &module.name, is_collection, false)?;
                debug!(module = %module.name, collections = collections.len(), "registering module");
                for collection in collections {
                    self.register_value(interp, collection)?;
                }
                Ok(())
            }
            Value::Native(native) => match native.downcast_ref::<TestCollection>() {
                Some(collection) => {
                    self.tests.borrow_mut().extend(collection.tests());
                    Ok(())
                }
                None if native.is_callable() => {
                    self.add_test(tests.clone());
                    Ok(())
                }
                None => self.register_each(interp, &tests),
            },
            Value::Function(_) | Value::Builtin(_) => {
                self.add_test(tests.clone());
                Ok(())
            }
            _ => self.register_each(interp, &tests),
        }
    }

    fn register_each(&self, interp: &mut Interpreter, tests: &Value) -> Result<(), EvalError> {
        for test in interp.iterate(tests)? {
            self.register_value(interp, test)?;
        }
        Ok(())
    }

    /// `@tests.test`.
    fn test(this: &Rc<Self>, _interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let func = single_argument("test", &args)?;
        this.add_test(func.clone());
        Ok(func)
    }

    /// `@tests.test_if(condition)`: a decorator that registers only when
    /// the condition holds.
    fn test_if(this: &Rc<Self>, _interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let condition = single_argument("test_if", &args)?.truthy()?;
        let this = Rc::clone(this);
        Ok(Value::builtin("test_if.<decorator>", move |interp, args| {
            if condition {
                TestCollection::test(&this, interp, args)
            } else {
                single_argument("test_if", &args)
            }
        }))
    }

    /// `@tests.context`.
    fn context(this: &Rc<Self>, _interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let func = single_argument("context", &args)?;
        this.add_context(func.clone())?;
        Ok(func)
    }

    fn register(this: &Rc<Self>, interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let tests = single_argument("register", &args)?;
        this.register_value(interp, tests.clone())?;
        Ok(tests)
    }

    /// `tests.register_if(condition)(other)`.
    fn register_if(this: &Rc<Self>, _interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let condition = single_argument("register_if", &args)?.truthy()?;
        let this = Rc::clone(this);
        Ok(Value::builtin("register_if.<decorator>", move |interp, args| {
            if condition {
                TestCollection::register(&this, interp, args)
            } else {
                single_argument("register_if", &args)
            }
        }))
    }

    /// `tests.run(reporter=None)`: run every test, report through the
    /// script's output, return whether all passed.
    fn run(this: &Rc<Self>, interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let [reporter] = args
            .bind("run", &[], &["reporter"])?
            .try_into()
            .map_err(|_| type_error("run() argument binding failed"))?;
        let name = match &reporter {
            None | Some(Value::None) => None,
            Some(Value::Str(name)) => Some(name.to_string()),
            Some(other) => {
                return Err(type_error(format!(
                    "run() reporter must be a name, not {}",
                    other.type_name()
                )))
            }
        };
        let out = HandlerWriter::new(Rc::clone(interp.print_handler()));
        let mut reporter = get_reporter_by_name(name.as_deref(), "auto", Box::new(out))
            .map_err(|err| type_error(err.to_string()))?;
        let tests = this.tests();
        let summary = run_tests(
            interp,
            &this.session,
            &tests,
            reporter.as_mut(),
            &RunnerConfig::default(),
        )
        .map_err(|err| runtime_error(format!("reporter failed: {err}")))?;
        Ok(Value::Bool(summary.is_success()))
    }
}

impl NativeObject for TestCollection {
    fn type_name(&self) -> &'static str {
        "Tests"
    }

    fn repr(&self) -> String {
        format!("<Tests ({} tests)>", self.len())
    }

    fn get_attr(self: Rc<Self>, _interp: &mut Interpreter, name: &str) -> Option<EvalResult> {
        let &(name, func) = COLLECTION_METHODS.iter().find(|(method, _)| *method == name)?;
        Some(Ok(Value::builtin(
            format!("Tests.{name}"),
            move |interp, args| func(&self, interp, args),
        )))
    }

    fn len(&self) -> Option<usize> {
        Some(TestCollection::len(self))
    }

    fn iterate(self: Rc<Self>, _interp: &mut Interpreter) -> Option<Result<Vec<Value>, EvalError>> {
        Some(Ok(self.tests()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A test bound to the contexts it runs in.
pub struct TestCase {
    func: Value,
    contexts: Vec<Value>,
}

impl TestCase {
    pub fn new(func: Value, contexts: Vec<Value>) -> Self {
        TestCase { func, contexts }
    }

    /// The undecorated test.
    pub fn func(&self) -> &Value {
        &self.func
    }

    /// How many of the yielded values the test takes.
    fn arity(&self, available: usize) -> usize {
        match &self.func {
            Value::Function(function) if function.def.params.vararg.is_none() => {
                function.def.params.arity().min(available)
            }
            Value::Native(native) if native.downcast_ref::<TestCase>().is_some() => 0,
            _ => available,
        }
    }

    /// Enter every context, call the test with the yielded values, then
    /// exit the entered contexts in reverse. Teardown runs even when setup
    /// or the test fails; the first error wins.
    fn run(&self, interp: &mut Interpreter) -> EvalResult {
        let mut entered = Vec::with_capacity(self.contexts.len());
        let mut yielded = Vec::new();
        let mut result = Ok(Value::None);
        for context in &self.contexts {
            let Value::Function(function) = context else {
                result = Err(type_error(format!(
                    "{} is not a context function",
                    context.repr()
                )));
                break;
            };
            match interp.enter_context(function, CallArgs::default()) {
                Ok((value, state)) => {
                    entered.push(state);
                    match value {
                        Value::None => {}
                        Value::Tuple(items) => yielded.extend(items.iter().cloned()),
                        other => yielded.push(other),
                    }
                }
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        if result.is_ok() {
            yielded.truncate(self.arity(yielded.len()));
            result = interp.call(&self.func, CallArgs::new(yielded));
        }
        for state in entered.into_iter().rev() {
            if let Err(err) = interp.exit_context(state) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }
}

impl NativeObject for TestCase {
    fn type_name(&self) -> &'static str {
        "TestCase"
    }

    fn repr(&self) -> String {
        let name = self.func.display_name().unwrap_or_else(|| self.func.repr());
        format!("<test {name}>")
    }

    fn get_attr(self: Rc<Self>, interp: &mut Interpreter, name: &str) -> Option<EvalResult> {
        match name {
            "__wrapped__" => Some(Ok(self.func.clone())),
            "__name__" | "__module__" | "__doc__" => Some(interp.get_attr(&self.func, name)),
            _ => None,
        }
    }

    fn call(self: Rc<Self>, interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        args.expect_positional("test", 0, 0)?;
        self.run(interp)
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Whether `value` is a `Tests` collection.
pub fn is_collection(value: &Value) -> bool {
    matches!(value, Value::Native(native) if native.downcast_ref::<TestCollection>().is_some())
}

fn single_argument(function: &str, args: &CallArgs) -> EvalResult {
    match args.expect_positional(function, 1, 1)? {
        [value] => Ok(value.clone()),
        _ => Err(type_error(format!("{function}() takes exactly 1 argument"))),
    }
}

#[cfg(test)]
mod tests;
