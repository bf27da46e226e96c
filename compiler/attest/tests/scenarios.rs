// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests: units on disk, loaded through the hook, run by the
//! runner and printed by the reporters.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use attest::reporters::{PlainReporter, QuickFixReporter};
use attest::{
    evalexpr, run_tests, AssertionFailure, Bindings, CompileMode, ExpressionEvaluator,
    FailureKind, HookConfig, ImportHook, RunnerConfig, Session, TestCollection,
};
use attest_eval::{
    new_namespace, BuiltinException, CallArgs, EvalError, Interpreter, ModuleValue, PrintHandler,
    Value,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

struct Project {
    dir: TempDir,
    interp: Interpreter,
    session: Session,
}

impl Project {
    fn new() -> Self {
        Project::with_mode(CompileMode::Tree)
    }

    fn with_mode(mode: CompileMode) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut interp = Interpreter::builder()
            .search_path(dir.path())
            .print_handler(PrintHandler::buffer())
            .build();
        let session = Session::install(&mut interp);
        ImportHook::enable(&mut interp, HookConfig::default().compile_mode(mode));
        Project {
            dir,
            interp,
            session,
        }
    }

    fn unit(&self, name: &str, source: &str) -> PathBuf {
        let path = self.dir.path().join(format!("{name}.att"));
        fs::write(&path, source).unwrap();
        path
    }

    fn import(&mut self, name: &str) -> Result<Rc<ModuleValue>, EvalError> {
        self.interp.import_module(name)
    }

    fn call(&mut self, module: &ModuleValue, function: &str) -> Result<Value, EvalError> {
        let function = module.get(function).expect("function defined");
        self.interp.call(&function, CallArgs::default())
    }

    fn output(&self) -> String {
        self.interp.print_handler().take_output()
    }
}

fn module_bindings(pairs: &[(&str, Value)]) -> Bindings {
    let globals = new_namespace(None);
    for (name, value) in pairs {
        globals.borrow_mut().define(name, value.clone());
    }
    Bindings::module(globals)
}

#[test]
fn test_call_argument_rendering() {
    let mut interp = Interpreter::new();
    let evaluator = ExpressionEvaluator::new(
        "value == int('2')",
        module_bindings(&[("value", Value::Int(2))]),
    )
    .unwrap();
    assert_eq!(evaluator.render(&mut interp).unwrap().to_string(), "(2 == int('2'))");
    assert!(evaluator.truthy(&mut interp).unwrap());
}

#[test]
fn test_arithmetic_rendering() {
    let mut interp = Interpreter::new();
    let rendered = evalexpr(
        &mut interp,
        "value == 5 - 3",
        module_bindings(&[("value", Value::Int(2))]),
    )
    .unwrap();
    assert_eq!(rendered.to_string(), "(2 == 2)");
}

#[test]
fn test_failing_assert_is_rendered() {
    let mut project = Project::new();
    project.unit(
        "checks",
        "from attest import assert_hook\n\
         \n\
         def check():\n    value = 2\n    assert value > 3\n",
    );
    let module = project.import("checks").unwrap();
    let err = project.call(&module, "check").unwrap_err();
    assert!(project.session.is_test_failure(&err));
    let failure = AssertionFailure::from_error(&err, project.session.test_failure()).unwrap();
    assert_eq!(failure.value(), "not (2 > 3)");
    assert!(failure.msg.is_none());
}

#[test]
fn test_failing_assert_keeps_its_message() {
    let mut project = Project::new();
    project.unit(
        "messages",
        "from attest import assert_hook\n\
         \n\
         def check():\n    value = 2\n    assert value > 3, \"custom\"\n",
    );
    let module = project.import("messages").unwrap();
    let err = project.call(&module, "check").unwrap_err();
    assert_eq!(err.to_string(), "TestFailure: custom");
    let failure = AssertionFailure::from_error(&err, project.session.test_failure()).unwrap();
    assert_eq!(failure.value(), "not (2 > 3)");
    assert_eq!(failure.msg.map(|msg| msg.to_str()).as_deref(), Some("custom"));
}

#[test]
fn test_unit_without_import_keeps_plain_asserts() {
    let mut project = Project::new();
    project.unit(
        "plain",
        "# assert_hook is mentioned, never imported\n\
         assert 1 == 1\n\
         def check():\n    assert 1 == 2\n",
    );
    let module = project.import("plain").unwrap();
    let err = project.call(&module, "check").unwrap_err();
    assert!(err.is(BuiltinException::AssertionError));
    assert!(!project.session.is_test_failure(&err));
    assert!(AssertionFailure::from_error(&err, project.session.test_failure()).is_none());
    assert_eq!(err.message(), "");
    assert_eq!(project.session.statistics().assertions(), 0);
}

#[test]
fn test_second_load_is_served_from_the_registry() {
    let mut project = Project::new();
    project.unit(
        "effects",
        "from attest import assert_hook\nprint('side effect')\nassert True\n",
    );
    let first = project.import("effects").unwrap();
    let second = project.import("effects").unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(project.output(), "side effect\n");
    assert_eq!(project.session.statistics().assertions(), 1);
}

#[test]
fn test_regenerated_units_behave_like_tree_units() {
    let source = "from attest import assert_hook\n\
                  \n\
                  def check():\n    \
                  items = [1, 2]\n    \
                  assert len(items) == 3 or items[0] > 1, 'sizes'\n";
    let mut results = Vec::new();
    for mode in [CompileMode::Tree, CompileMode::Regenerate] {
        let mut project = Project::with_mode(mode);
        project.unit("modes", source);
        let module = project.import("modes").unwrap();
        let err = project.call(&module, "check").unwrap_err();
        let failure = AssertionFailure::from_error(&err, project.session.test_failure()).unwrap();
        results.push((err.to_string(), failure.value()));
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(
        results[0].1,
        "not ((len([1, 2]) == 3) or (1 > 1))"
    );
}

#[test]
fn test_collected_suite_reports_failures_and_errors() {
    let mut project = Project::new();
    project.unit(
        "suite",
        "from attest import assert_hook, Tests\n\
         \n\
         tests = Tests()\n\
         \n\
         @tests.context\n\
         def number():\n    yield 2\n\
         \n\
         @tests.test\n\
         def passes(value):\n    assert value == 2\n\
         \n\
         @tests.test\n\
         def fails(value):\n    print('checking', value)\n    assert value > 3\n\
         \n\
         @tests.test\n\
         def errors(value):\n    return value / 0\n",
    );
    let collection = TestCollection::new(project.session.clone());
    collection
        .register_value(&mut project.interp, Value::from("suite"))
        .unwrap();
    let tests = collection.tests();
    assert_eq!(tests.len(), 3);

    let mut reporter = PlainReporter::new(Vec::new());
    let summary = run_tests(
        &mut project.interp,
        &project.session,
        &tests,
        &mut reporter,
        &RunnerConfig::default(),
    )
    .unwrap();
    assert_eq!((summary.passed, summary.failures, summary.errors), (1, 1, 1));
    assert_eq!(summary.assertions, 2);

    let output = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(output.starts_with(".FE\n\n"), "{output}");
    assert!(output.contains("suite.fails\n"));
    assert!(output.contains("-> checking 2\n"));
    assert!(output.contains("TestFailure: not (2 > 3)\nassert value > 3\nassert (2 > 3)\n"));
    assert!(output.contains("ZeroDivisionError"));
    assert!(output.ends_with("Failures: 2/3 (2 assertions)\n"));
}

#[test]
fn test_quickfix_points_at_the_failing_line() {
    let mut project = Project::new();
    let path = project.unit(
        "located",
        "from attest import assert_hook, Tests\n\
         tests = Tests()\n\
         @tests.test\n\
         def fails():\n    value = 2\n    assert value > 3\n",
    );
    let module = project.import("located").unwrap();
    let tests: Vec<Value> = project.interp.iterate(&module.get("tests").unwrap()).unwrap();

    let mut reporter = QuickFixReporter::new(Vec::new());
    run_tests(
        &mut project.interp,
        &project.session,
        &tests,
        &mut reporter,
        &RunnerConfig::default(),
    )
    .unwrap();
    let output = String::from_utf8(reporter.into_inner()).unwrap();
    assert_eq!(
        output,
        format!("{}:6: TestFailure: not (2 > 3)\n", path.display())
    );
}

#[test]
fn test_failure_kinds_through_the_runner() {
    let mut project = Project::new();
    project.unit(
        "kinds",
        "from attest import assert_hook, Assert\n\
         def rewritten():\n    assert 1 > 2\n\
         def wrapped():\n    Assert(1) == 2\n\
         def raises():\n    return [][0]\n",
    );
    let module = project.import("kinds").unwrap();
    let mut kinds = Vec::new();
    for name in ["rewritten", "wrapped", "raises"] {
        let test = module.get(name).unwrap();
        let result = attest::runner::run_test(
            &mut project.interp,
            &project.session,
            &test,
            &RunnerConfig::default(),
        );
        kinds.push(result.kind());
    }
    assert_eq!(
        kinds,
        [
            Some(FailureKind::Assertion),
            Some(FailureKind::Failure),
            Some(FailureKind::Error),
        ]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn failing_comparisons_render_their_values(value in -500i64..500, limit in -500i64..500) {
        prop_assume!(value <= limit);
        let mut project = Project::new();
        project.unit(
            "generated",
            &format!(
                "from attest import assert_hook\n\
                 def check():\n    value = {value}\n    assert value > {limit}\n"
            ),
        );
        let module = project.import("generated").unwrap();
        let err = project.call(&module, "check").unwrap_err();
        prop_assert_eq!(err.to_string(), format!("TestFailure: not ({value} > {limit})"));
    }
}
