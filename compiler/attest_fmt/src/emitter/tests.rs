use super::*;

#[test]
fn string_emitter_basic() {
    let mut emitter = StringEmitter::new();
    emitter.emit("assert");
    emitter.emit_space();
    emitter.emit("x");
    assert_eq!(emitter.output(), "assert x");
}

#[test]
fn string_emitter_indentation() {
    let mut emitter = StringEmitter::new();
    emitter.emit("def f():");
    emitter.emit_newline();
    emitter.emit_indent(1);
    emitter.emit("if x:");
    emitter.emit_newline();
    emitter.emit_indent(2);
    emitter.emit("pass");
    assert_eq!(emitter.output(), "def f():\n    if x:\n        pass");
}

#[test]
fn string_emitter_trailing_newline() {
    let mut emitter = StringEmitter::new();
    emitter.emit("content");
    emitter.ensure_trailing_newline();
    emitter.ensure_trailing_newline();
    assert_eq!(emitter.output(), "content\n");
}

#[test]
fn string_emitter_empty_stays_empty() {
    let mut emitter = StringEmitter::with_capacity(16);
    emitter.ensure_trailing_newline();
    assert!(emitter.is_empty());
    assert_eq!(emitter.len(), 0);
}

#[test]
fn fragment_emitter_keeps_pieces() {
    let mut fragments: Vec<String> = Vec::new();
    fragments.emit("if x:");
    fragments.emit_newline();
    fragments.emit_indent(1);
    fragments.emit("pass");
    assert_eq!(fragments, ["if x:", "\n", "    ", "pass"]);
}
