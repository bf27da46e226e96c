#![allow(clippy::expect_used, reason = "tests use expect for brevity")]

use super::*;
use crate::environment::new_namespace;
use crate::value::BuiltinException;

fn frame(name: &str) -> Frame {
    let mut frame = Frame::module("m".into(), "m.att".into(), new_namespace(None));
    frame.function = name.into();
    frame
}

#[test]
fn test_push_pop_and_line_tracking() {
    let mut stack = CallStack::default();
    stack.push(frame("<module>")).expect("push");
    stack.set_line(7);
    assert_eq!(stack.current().map(|f| f.line), Some(7));
    assert_eq!(stack.depth(), 1);
    stack.pop();
    assert!(stack.is_empty());
}

#[test]
fn test_depth_limit_raises_recursion_error() {
    let mut stack = CallStack::new(2);
    stack.push(frame("a")).expect("first");
    stack.push(frame("b")).expect("second");
    let err = stack.push(frame("c")).err().expect("limit");
    assert!(err.is(BuiltinException::RecursionError));
    assert_eq!(stack.depth(), 2);
}

#[test]
fn test_entries_outermost_first() {
    let mut stack = CallStack::default();
    stack.push(frame("outer")).expect("push");
    stack.push(frame("inner")).expect("push");
    let names: Vec<String> = stack.entries().iter().map(|e| e.function.to_string()).collect();
    assert_eq!(names, vec!["outer", "inner"]);
}
