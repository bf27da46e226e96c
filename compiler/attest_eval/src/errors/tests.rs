use super::*;

#[test]
fn test_display_includes_type_and_message() {
    assert_eq!(
        name_error("missing").to_string(),
        "NameError: name 'missing' is not defined"
    );
    assert_eq!(assertion_error(None).to_string(), "AssertionError");
}

#[test]
fn test_subclass_matching() {
    let err = zero_division("division by zero");
    assert!(err.is(BuiltinException::ArithmeticError));
    assert!(err.is(BuiltinException::Exception));
    assert!(!err.is(BuiltinException::LookupError));
}

#[test]
fn test_custom_exception_type() {
    let failure = ExceptionType::custom("TestFailure", BuiltinException::AssertionError.into());
    let err = EvalError::new(failure.clone(), "not (1 == 2)");
    assert!(err.is_instance(&failure));
    assert!(err.is(BuiltinException::AssertionError));
    assert_eq!(err.to_string(), "TestFailure: not (1 == 2)");
}

#[test]
fn test_key_error_message_is_key_repr() {
    assert_eq!(key_error(&Value::from("k")).message(), "'k'");
}

#[test]
fn test_traceback_order() {
    let mut err = runtime_error("boom");
    let frame = |function: &str| TracebackEntry {
        file: "t.att".into(),
        line: 1,
        function: function.into(),
        origin: FrameOrigin::User,
    };
    err.push_frame(frame("inner"));
    err.push_frame(frame("outer"));
    let names: Vec<&str> = err.traceback.iter().map(|e| &*e.function).collect();
    assert_eq!(names, vec!["outer", "inner"]);
}
