use super::*;

use pretty_assertions::assert_eq;

fn identity(module: &str) -> TestIdentity {
    TestIdentity {
        module: module.to_string(),
        name: "check".to_string(),
        doc: None,
        file: "unit.att".to_string(),
        line: 3,
    }
}

fn entry(function: &str, line: u32, origin: FrameOrigin) -> TracebackEntry {
    TracebackEntry {
        file: "unit.att".into(),
        line,
        function: function.into(),
        origin,
    }
}

fn failed_with(error: EvalError, failure: Option<AssertionFailure>) -> TestResult {
    TestResult::failed(identity("unit"), error, failure, Vec::new(), Duration::ZERO)
}

fn zero_division() -> EvalError {
    let mut error = EvalError::new(BuiltinException::ZeroDivisionError, "division by zero");
    error.push_frame(entry("<assertion>", 1, FrameOrigin::Internal));
    error.push_frame(entry("check", 5, FrameOrigin::User));
    error.push_frame(entry("<module>", 9, FrameOrigin::User));
    error
}

#[test]
fn test_name_includes_the_module() {
    assert_eq!(identity("pkg.unit").test_name(), "pkg.unit.check");
    assert_eq!(identity("__main__").test_name(), "check");
    assert_eq!(identity("").test_name(), "check");
}

#[test]
fn test_identity_of_a_non_function() {
    let identity = TestIdentity::of(&Value::from(3));
    assert_eq!(identity.name, "3");
    assert_eq!(identity.file, "");
    assert_eq!(identity.line, 0);
}

#[test]
fn test_passed_result() {
    let result = TestResult::passed(identity("unit"), vec!["out".to_string()], Duration::ZERO);
    assert!(result.is_success());
    assert_eq!(result.kind(), None);
    assert!(result.raw_traceback().is_empty());
    assert_eq!(result.traceback(), "");
    assert_eq!(result.exception(), None);
    assert_eq!(result.assertion(), None);
}

#[test]
fn test_library_frames_are_hidden() {
    let result = failed_with(zero_division(), None);
    let frames: Vec<String> = result
        .raw_traceback()
        .iter()
        .map(|entry| entry.function.to_string())
        .collect();
    assert_eq!(frames, ["<module>", "check"]);

    let full = result.with_full_tracebacks(true);
    assert_eq!(full.raw_traceback().len(), 3);
}

#[test]
fn test_traceback_format() {
    let result = failed_with(zero_division(), None);
    assert_eq!(
        result.traceback(),
        "Traceback (most recent call last):\n  \
         File \"unit.att\", line 9, in <module>\n  \
         File \"unit.att\", line 5, in check\n\
         ZeroDivisionError: division by zero"
    );
    assert_eq!(result.kind(), Some(FailureKind::Error));
}

#[test]
fn test_blank_line_numbers() {
    let result = failed_with(zero_division(), None).with_blank_line_numbers(true);
    assert!(result.raw_traceback().iter().all(|entry| entry.line == 0));
    assert!(result.traceback().contains("line 0, in check"));
}

#[test]
fn test_assertion_failure_kind_and_lines() {
    let error = EvalError::new(BuiltinException::AssertionError, "not (2 > 3)");
    let failure = AssertionFailure {
        expr: "value > 3".to_string(),
        rendered: "(2 > 3)".to_string(),
        msg: None,
    };
    let result = failed_with(error.clone(), Some(failure));
    assert_eq!(result.kind(), Some(FailureKind::Assertion));
    assert_eq!(
        result.assertion().as_deref(),
        Some("assert value > 3\nassert (2 > 3)")
    );

    let plain = failed_with(error, None);
    assert_eq!(plain.kind(), Some(FailureKind::Failure));
    assert_eq!(plain.exception().as_deref(), Some("AssertionError: not (2 > 3)"));
}

#[test]
fn test_summary_counts() {
    let mut summary = TestSummary::default();
    summary.add_result(&TestResult::passed(identity("unit"), Vec::new(), Duration::ZERO));
    summary.add_result(&failed_with(zero_division(), None));
    summary.add_result(&failed_with(
        EvalError::new(BuiltinException::AssertionError, ""),
        None,
    ));
    assert_eq!(summary.total, 3);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.failed(), 2);
    assert!(!summary.is_success());
    assert!(TestSummary::default().is_success());
}
