#![allow(clippy::expect_used, reason = "tests use expect for brevity")]

use super::*;

use std::fs;

use attest_eval::{BuiltinException, PrintHandler};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// ```text
/// top/
///   __init__.att      marker = 'top'
///   alpha.att         value = 1, shared = [1], _private = [2]
///   beta.att          from top.alpha import shared; other = [3]
///   nested/
///     __init__.att
///     gamma.att       deep = [4]
///   data/             (no __init__.att)
///     skipped.att
/// ```
fn package() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let top = dir.path().join("top");
    fs::create_dir_all(top.join("nested")).expect("nested dir");
    fs::create_dir_all(top.join("data")).expect("data dir");
    let files = [
        ("__init__.att", "marker = 'top'\n"),
        ("alpha.att", "value = 1\nshared = [1]\n_private = [2]\n"),
        ("beta.att", "from top.alpha import shared\nother = [3]\n"),
        ("nested/__init__.att", ""),
        ("nested/gamma.att", "deep = [4]\n"),
        ("data/skipped.att", "raise ValueError('never imported')\n"),
    ];
    for (name, source) in files {
        fs::write(top.join(name), source).expect("write unit");
    }
    dir
}

fn interpreter(dir: &TempDir) -> Interpreter {
    Interpreter::builder()
        .search_path(dir.path())
        .print_handler(PrintHandler::buffer())
        .build()
}

#[test]
fn test_import_dotted_name_forms() {
    let dir = package();
    let mut interp = interpreter(&dir);
    let by_dot = import_dotted_name(&mut interp, "top.alpha.value").expect("imports");
    assert_eq!(by_dot.repr(), "1");
    let by_colon = import_dotted_name(&mut interp, "top:alpha.value").expect("imports");
    assert_eq!(by_colon.repr(), "1");
    let module = import_dotted_name(&mut interp, "top").expect("imports");
    assert!(matches!(module, Value::Module(ref m) if &*m.name == "top"));
}

#[test]
fn test_import_dotted_name_imports_submodules() {
    let dir = package();
    let mut interp = interpreter(&dir);
    let module = import_dotted_name(&mut interp, "top:nested.gamma").expect("imports");
    assert!(matches!(module, Value::Module(ref m) if &*m.name == "top.nested.gamma"));
}

#[test]
fn test_import_dotted_name_errors() {
    let dir = package();
    let mut interp = interpreter(&dir);
    let err = import_dotted_name(&mut interp, "top.alpha:missing").expect_err("no such name");
    assert!(err.is(BuiltinException::ImportError));
    assert_eq!(err.message(), "cannot import name 'missing' from 'top.alpha'");
    let err = import_dotted_name(&mut interp, "top.alpha:value.missing").expect_err("int attr");
    assert!(err.is(BuiltinException::AttributeError));
    let err = import_dotted_name(&mut interp, "nowhere").expect_err("no unit");
    assert!(err.is(BuiltinException::ImportError));
}

#[test]
fn test_deep_iter_modules() {
    let dir = package();
    let mut interp = interpreter(&dir);
    let names = deep_iter_modules(&mut interp, "top").expect("walks");
    assert_eq!(
        names,
        ["top", "top.alpha", "top.beta", "top.nested", "top.nested.gamma"]
    );
    assert!(interp.is_loaded("top.nested.gamma"));
    assert!(!interp.is_loaded("top.data.skipped"));
}

#[test]
fn test_deep_iter_modules_of_a_plain_unit() {
    let dir = package();
    let mut interp = interpreter(&dir);
    let names = deep_iter_modules(&mut interp, "top.alpha").expect("imports");
    assert_eq!(names, ["top.alpha"]);
}

#[test]
fn test_deep_get_members() {
    let dir = package();
    let mut interp = interpreter(&dir);
    // Lists of ints, which leaves out every `__path__`.
    let is_list = |value: &Value| {
        matches!(value, Value::List(items)
            if items.borrow().iter().all(|item| matches!(item, Value::Int(_))))
    };

    let public = deep_get_members(&mut interp, "top", is_list, false).expect("walks");
    let reprs: Vec<String> = public.iter().map(Value::repr).collect();
    assert_eq!(reprs, ["[1]", "[3]", "[4]"]);

    let all = deep_get_members(&mut interp, "top", is_list, true).expect("walks");
    let reprs: Vec<String> = all.iter().map(Value::repr).collect();
    assert_eq!(reprs, ["[2]", "[1]", "[3]", "[4]"]);
}
