use super::*;
use crate::Span;

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Span::DUMMY)
}

fn import_from(module: &str, names: Vec<Alias>) -> Stmt {
    stmt(StmtKind::ImportFrom {
        module: Some(module.to_string()),
        names,
        level: 0,
    })
}

#[test]
fn test_imports_name_from() {
    let module = Module::new(vec![import_from(
        "attest",
        vec![Alias::new("Tests"), Alias::new("assert_hook")],
    )]);
    assert!(module.imports_name_from("attest", "assert_hook"));
    assert!(!module.imports_name_from("attest", "Assert"));
    assert!(!module.imports_name_from("other", "assert_hook"));
}

#[test]
fn test_aliased_import_does_not_count() {
    let module = Module::new(vec![import_from(
        "attest",
        vec![Alias {
            name: "assert_hook".to_string(),
            asname: Some("check".to_string()),
        }],
    )]);
    assert!(!module.imports_name_from("attest", "assert_hook"));
}

#[test]
fn test_alias_bound_name() {
    assert_eq!(Alias::new("os.path").bound_name(), "os");
    let renamed = Alias {
        name: "os.path".to_string(),
        asname: Some("p".to_string()),
    };
    assert_eq!(renamed.bound_name(), "p");
}

#[test]
fn test_function_docstring_and_context() {
    let def = FunctionDef {
        name: "setup".to_string(),
        params: Params::default(),
        body: vec![
            stmt(StmtKind::Expr(Expr::string("Prepare things.", Span::DUMMY))),
            stmt(StmtKind::Yield(None)),
        ],
        decorators: Vec::new(),
    };
    assert_eq!(def.docstring(), Some("Prepare things."));
    assert!(def.is_context());
}

#[test]
fn test_assignable_targets() {
    let name = Expr::name("x", Span::DUMMY);
    let tuple = Expr::synthetic(ExprKind::Tuple(vec![name.clone(), name.clone()]));
    let literal = Expr::synthetic(ExprKind::Int(1));
    assert!(name.is_assignable());
    assert!(tuple.is_assignable());
    assert!(!literal.is_assignable());
}

#[test]
fn test_operator_symbols() {
    assert_eq!(CmpOp::NotIn.as_symbol(), "not in");
    assert_eq!(CmpOp::IsNot.as_symbol(), "is not");
    assert_eq!(BinaryOp::FloorDiv.as_symbol(), "//");
    assert!(BinaryOp::Pow.precedence() > BinaryOp::Mul.precedence());
    assert!(BoolOp::And.precedence() > BoolOp::Or.precedence());
}
