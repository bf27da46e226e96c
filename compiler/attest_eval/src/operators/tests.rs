use super::*;
use crate::value::BuiltinException;
use pretty_assertions::assert_eq;

fn int(i: i64) -> Value {
    Value::Int(i)
}

fn repr(result: EvalResult) -> String {
    match result {
        Ok(value) => value.repr(),
        Err(err) => format!("error: {err}"),
    }
}

#[test]
fn test_int_arithmetic() {
    assert_eq!(repr(binary_op(BinaryOp::Add, &int(2), &int(3))), "5");
    assert_eq!(repr(binary_op(BinaryOp::Div, &int(7), &int(2))), "3.5");
    assert_eq!(repr(binary_op(BinaryOp::FloorDiv, &int(-7), &int(2))), "-4");
    assert_eq!(repr(binary_op(BinaryOp::Mod, &int(-7), &int(2))), "1");
    assert_eq!(repr(binary_op(BinaryOp::Mod, &int(7), &int(-2))), "-1");
    assert_eq!(repr(binary_op(BinaryOp::Pow, &int(2), &int(10))), "1024");
    assert_eq!(repr(binary_op(BinaryOp::Pow, &int(2), &int(-1))), "0.5");
}

#[test]
fn test_overflow_and_zero_division() {
    let err = binary_op(BinaryOp::Mul, &int(i64::MAX), &int(2)).err();
    assert!(err.is_some_and(|e| e.is(BuiltinException::OverflowError)));
    let err = binary_op(BinaryOp::Div, &int(1), &int(0)).err();
    assert_eq!(
        err.map(|e| e.to_string()).as_deref(),
        Some("ZeroDivisionError: division by zero")
    );
}

#[test]
fn test_mixed_numeric_and_bool() {
    assert_eq!(repr(binary_op(BinaryOp::Add, &int(1), &Value::Float(0.5))), "1.5");
    assert_eq!(repr(binary_op(BinaryOp::Add, &Value::Bool(true), &int(1))), "2");
}

#[test]
fn test_sequences() {
    assert_eq!(
        repr(binary_op(BinaryOp::Add, &Value::from("ab"), &Value::from("cd"))),
        "'abcd'"
    );
    assert_eq!(
        repr(binary_op(BinaryOp::Mul, &Value::list(vec![int(1)]), &int(3))),
        "[1, 1, 1]"
    );
    assert_eq!(
        repr(binary_op(BinaryOp::Mul, &int(2), &Value::from("ab"))),
        "'abab'"
    );
    assert_eq!(
        repr(binary_op(BinaryOp::Add, &Value::from("a"), &int(1))),
        "error: TypeError: unsupported operand type(s) for +: 'str' and 'int'"
    );
}

#[test]
fn test_percent_format() {
    let args = Value::tuple(vec![int(1), Value::from("x"), Value::from("y")]);
    assert_eq!(
        repr(binary_op(BinaryOp::Mod, &Value::from("%d != %r (%s%%)"), &args)),
        "\"1 != 'x' (y%)\""
    );
    let short = Value::tuple(vec![int(1), Value::from("x")]);
    assert_eq!(
        repr(binary_op(BinaryOp::Mod, &Value::from("%d != %r (%s%%)"), &short)),
        "error: TypeError: not enough arguments for format string"
    );
}

#[test]
fn test_repeat_limits() {
    let huge = int(i64::MAX);
    for seq in [
        Value::from("ab"),
        Value::list(vec![int(0)]),
        Value::tuple(vec![int(0)]),
    ] {
        assert_eq!(
            repr(binary_op(BinaryOp::Mul, &seq, &huge)),
            "error: OverflowError: repeated sequence is too long"
        );
    }
    assert_eq!(repr(binary_op(BinaryOp::Mul, &huge, &Value::from(""))), "''");
    assert_eq!(repr(binary_op(BinaryOp::Mul, &Value::from("ab"), &int(-2))), "''");
}

#[test]
fn test_comparisons() {
    assert_eq!(compare_op(CmpOp::Lt, &int(1), &Value::Float(1.5)).ok(), Some(true));
    assert_eq!(compare_op(CmpOp::Eq, &int(1), &Value::Float(1.0)).ok(), Some(true));
    assert_eq!(
        compare_op(CmpOp::Lt, &Value::from("a"), &Value::from("b")).ok(),
        Some(true)
    );
    let a = Value::tuple(vec![int(1), int(2)]);
    let b = Value::tuple(vec![int(1), int(3)]);
    assert_eq!(compare_op(CmpOp::Lt, &a, &b).ok(), Some(true));
    let err = compare_op(CmpOp::Lt, &int(1), &Value::from("a")).err();
    assert_eq!(
        err.map(|e| e.message()).as_deref(),
        Some("'<' not supported between instances of 'int' and 'str'")
    );
}

#[test]
fn test_identity_and_membership() {
    let list = Value::list(vec![int(1), int(2)]);
    let same = list.clone();
    let equal = Value::list(vec![int(1), int(2)]);
    assert_eq!(compare_op(CmpOp::Is, &list, &same).ok(), Some(true));
    assert_eq!(compare_op(CmpOp::Is, &list, &equal).ok(), Some(false));
    assert_eq!(compare_op(CmpOp::Eq, &list, &equal).ok(), Some(true));
    assert_eq!(compare_op(CmpOp::In, &int(2), &list).ok(), Some(true));
    assert_eq!(
        compare_op(CmpOp::NotIn, &Value::from("z"), &Value::from("abc")).ok(),
        Some(true)
    );
    assert!(compare_op(CmpOp::In, &int(1), &int(2)).is_err());
}

#[test]
fn test_unary() {
    assert_eq!(repr(unary_op(UnaryOp::Neg, &int(3))), "-3");
    assert_eq!(repr(unary_op(UnaryOp::Not, &Value::list(vec![]))), "True");
    assert!(unary_op(UnaryOp::Neg, &Value::from("s")).is_err());
}
