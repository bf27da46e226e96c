#![allow(clippy::expect_used, reason = "tests use expect for brevity")]

use super::*;

use attest_ir::visitor::{walk_expr, walk_stmt, Visitor};
use pretty_assertions::assert_eq;

const SAMPLE: &str = "\
from attest import assert_hook

def test_value():
    value = 2
    assert value>3, 'custom'
    assert value
";

fn transformer(source: &str) -> AssertTransformer {
    AssertTransformer::new(source, "sample.att")
}

/// Counts nodes without a source location.
#[derive(Default)]
struct Unlocated(usize);

impl<'ast> Visitor<'ast> for Unlocated {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        if stmt.span.is_dummy() {
            self.0 += 1;
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        if expr.span.is_dummy() {
            self.0 += 1;
        }
        walk_expr(self, expr);
    }
}

fn function_body(module: &Module) -> &[Stmt] {
    module
        .body
        .iter()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::FunctionDef(def) => Some(def.body.as_slice()),
            _ => None,
        })
        .expect("module defines a function")
}

#[test]
fn test_opt_in_requires_module_scope_import() {
    assert!(transformer(SAMPLE).should_rewrite().expect("parses"));
    assert!(!transformer("import attest\nassert_hook = 1\nassert True\n")
        .should_rewrite()
        .expect("parses"));
    assert!(!transformer("def f():\n    from attest import assert_hook\n")
        .should_rewrite()
        .expect("parses"));
}

#[test]
fn test_mentions_in_comments_and_strings_do_not_opt_in() {
    let source = "# from attest import assert_hook\nname = 'assert_hook'\nassert name\n";
    assert!(!transformer(source).should_rewrite().expect("parses"));
}

#[test]
fn test_aliased_import_does_not_opt_in() {
    let source = "from attest import assert_hook as check\nassert True\n";
    assert!(!transformer(source).should_rewrite().expect("parses"));
}

#[test]
fn test_substring_fast_path_skips_parsing() {
    // Unparseable, but cannot opt in anyway.
    assert_eq!(transformer("def (:\n").should_rewrite(), Ok(false));
    assert!(transformer("assert_hook (:\n").should_rewrite().is_err());
}

#[test]
fn test_asserts_become_hook_calls() {
    let source = transformer(SAMPLE).regenerate().expect("rewrites");
    assert!(source.contains("assert_hook('value > 3', 'custom')"));
    assert!(source.contains("assert_hook('value')"));
    assert!(!source.contains("assert value"));
}

#[test]
fn test_rewritten_call_keeps_the_assert_location() {
    let node = transformer(SAMPLE).node().expect("rewrites");
    let body = function_body(&node);
    let StmtKind::Expr(call) = &body[1].kind else {
        panic!("expected an expression statement, got {:?}", body[1].kind);
    };
    assert_eq!(body[1].span.line, 5);
    assert_eq!(call.span.line, 5);
    let ExprKind::Call { func, args, .. } = &call.kind else {
        panic!("expected a call, got {:?}", call.kind);
    };
    assert_eq!(func.as_name(), Some(HOOK_NAME));
    assert_eq!(args.len(), 2);
}

#[test]
fn test_every_node_is_located() {
    let node = transformer(SAMPLE).node().expect("rewrites");
    let mut unlocated = Unlocated::default();
    unlocated.visit_module(&node);
    assert_eq!(unlocated.0, 0);
}

#[test]
fn test_message_expression_is_passed_through() {
    let source = "from attest import assert_hook\nassert x, 'got %s' % x\n";
    let output = transformer(source).regenerate().expect("rewrites");
    assert!(output.contains("assert_hook('x', 'got %s' % x)"));
}

#[test]
fn test_other_statements_are_untouched() {
    let source = "from attest import assert_hook\n\ndef f(a, b=1):\n    return a + b\nx = f(2)\n";
    let node = transformer(source).node().expect("rewrites");
    assert_eq!(node, attest_parse::parse_module(source).expect("parses"));
}

#[test]
fn test_rewriting_is_deterministic() {
    let first = transformer(SAMPLE).node().expect("rewrites");
    let second = transformer(SAMPLE).node().expect("rewrites");
    assert_eq!(first, second);
}

#[test]
fn test_parse_errors_propagate() {
    let source = "from attest import assert_hook\nassert (\n";
    assert!(transformer(source).node().is_err());
}

#[test]
fn test_regenerate_mode_reparses() {
    let t = transformer(SAMPLE);
    let tree = t.code(CompileMode::Tree).expect("compiles");
    let regenerated = t.code(CompileMode::Regenerate).expect("compiles");
    assert_eq!(
        module_to_source(&tree),
        module_to_source(&regenerated),
    );
    assert_eq!(function_body(&regenerated).len(), 3);
}
