#![allow(clippy::expect_used, reason = "tests use expect for brevity")]

use super::*;

use attest_eval::{ModuleValue, PrintHandler};
use pretty_assertions::assert_eq;

use crate::rewriter::AssertTransformer;
use crate::session::Session;

fn setup() -> (Interpreter, Session) {
    let mut interp = Interpreter::builder()
        .print_handler(PrintHandler::buffer())
        .build();
    let session = Session::install(&mut interp);
    (interp, session)
}

/// Rewrite and execute `source` as module `main`.
fn run(interp: &mut Interpreter, source: &str) -> Result<Rc<ModuleValue>, EvalError> {
    let code = AssertTransformer::new(source, "main.att")
        .node()
        .expect("source parses");
    interp.load_code("main", None, None, &code)
}

const HEADER: &str = "from attest import assert_hook\n";

#[test]
fn test_true_condition_counts_and_passes() {
    let (mut interp, session) = setup();
    run(&mut interp, &format!("{HEADER}value = 2\nassert value == 2\nassert value\n"))
        .expect("asserts hold");
    assert_eq!(session.statistics().assertions(), 2);
}

#[test]
fn test_false_condition_raises_rendered_failure() {
    let (mut interp, session) = setup();
    let source = format!("{HEADER}def check():\n    value = 2\n    assert value > 3\ncheck()\n");
    let err = run(&mut interp, &source).expect_err("assert fails");
    assert!(session.is_test_failure(&err));
    assert!(err.is(BuiltinException::AssertionError));
    assert_eq!(err.to_string(), "TestFailure: not (2 > 3)");
    let failure = AssertionFailure::from_error(&err, session.test_failure()).expect("failure");
    assert_eq!(
        failure,
        AssertionFailure {
            expr: "value > 3".to_string(),
            rendered: "(2 > 3)".to_string(),
            msg: None,
        }
    );
    assert_eq!(failure.value(), "not (2 > 3)");
}

#[test]
fn test_message_is_carried_alongside_rendering() {
    let (mut interp, session) = setup();
    let source = format!("{HEADER}value = 2\nassert value > 3, 'custom'\n");
    let err = run(&mut interp, &source).expect_err("assert fails");
    assert_eq!(err.message(), "custom");
    let value = err.exception.get_attr("value").expect("value attribute");
    assert_eq!(value.to_str(), "not (2 > 3)");
    let failure = AssertionFailure::from_error(&err, session.test_failure()).expect("failure");
    assert_eq!(failure.msg.map(|msg| msg.to_str()), Some("custom".to_string()));
}

#[test]
fn test_raising_message_propagates_before_the_check() {
    let (mut interp, session) = setup();
    let source = format!("{HEADER}value = 2\nassert value > 3, undefined_name\n");
    let err = run(&mut interp, &source).expect_err("message raises");
    assert!(err.is(BuiltinException::NameError));
    assert_eq!(session.statistics().assertions(), 0);
}

#[test]
fn test_evaluation_errors_propagate() {
    let (mut interp, session) = setup();
    let err = run(&mut interp, &format!("{HEADER}assert 1 / 0\n")).expect_err("raises");
    assert!(err.is(BuiltinException::ZeroDivisionError));
    assert!(!session.is_test_failure(&err));
}

#[test]
fn test_caller_frame_supplies_missing_scopes() {
    let (mut interp, _session) = setup();
    let source = format!(
        "{HEADER}def check():\n    local_value = 5\n    assert_hook('local_value < 3')\ncheck()\n"
    );
    let err = run(&mut interp, &source).expect_err("assert fails");
    assert_eq!(err.to_string(), "TestFailure: not (5 < 3)");
}

#[test]
fn test_explicit_globals_serve_as_locals() {
    let (mut interp, _session) = setup();
    let source = format!(
        "{HEADER}x = 1\ndef check():\n    x = 2\n    assert_hook('x == 2', globals=globals())\ncheck()\n"
    );
    let err = run(&mut interp, &source).expect_err("module x is 1");
    assert_eq!(err.to_string(), "TestFailure: not (1 == 2)");
}

#[test]
fn test_hook_argument_errors() {
    let (mut interp, _session) = setup();
    let err = run(&mut interp, &format!("{HEADER}assert_hook(1)\n")).expect_err("bad expr");
    assert_eq!(err.to_string(), "TypeError: assert_hook() expr must be a string");
    let err = run(&mut interp, &format!("{HEADER}assert_hook('x', locals=3)\n"))
        .expect_err("bad scope");
    assert!(err.is(BuiltinException::TypeError));
}

#[test]
fn test_plain_assert_helper() {
    let (mut interp, session) = setup();
    let module = run(
        &mut interp,
        "from attest import assert_\nvalue = assert_([1], 'empty')\n",
    )
    .expect("holds");
    assert_eq!(module.get("value").map(|v| v.repr()), Some("[1]".to_string()));
    let err = run(&mut interp, "from attest import assert_\nassert_(0, 'zero')\n")
        .expect_err("fails");
    assert_eq!(err.to_string(), "AssertionError: zero");
    assert!(!session.is_test_failure(&err));
    assert_eq!(session.statistics().assertions(), 2);
}

#[test]
fn test_statistics_reset() {
    let statistics = Statistics::new();
    statistics.record_assertion();
    statistics.record_assertion();
    assert_eq!(statistics.assertions(), 2);
    statistics.reset();
    assert_eq!(statistics.assertions(), 0);
}

#[test]
fn test_failure_type_is_an_assertion_error() {
    let failure = test_failure_type();
    assert_eq!(failure.name(), TEST_FAILURE);
    assert!(failure.is_subclass_of(&BuiltinException::AssertionError.into()));
}
