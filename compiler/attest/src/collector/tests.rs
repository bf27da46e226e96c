#![allow(clippy::expect_used, reason = "tests use expect for brevity")]

use super::*;

use attest_eval::{BuiltinException, ModuleValue, PrintHandler};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn interpreter(search_path: Option<&TempDir>) -> (Interpreter, Session) {
    let mut builder = Interpreter::builder().print_handler(PrintHandler::buffer());
    if let Some(dir) = search_path {
        builder = builder.search_path(dir.path());
    }
    let mut interp = builder.build();
    let session = Session::install(&mut interp);
    (interp, session)
}

fn run_in(interp: &mut Interpreter, body: &str) -> Result<Rc<ModuleValue>, EvalError> {
    let source = format!("from attest import Tests\n{body}");
    let code = attest_parse::parse_module(&source).expect("source parses");
    interp.load_code("main", None, None, &code)
}

fn run(body: &str) -> (Interpreter, Rc<ModuleValue>) {
    let (mut interp, _session) = interpreter(None);
    let module = run_in(&mut interp, body).expect("module runs");
    (interp, module)
}

fn collection(module: &ModuleValue, name: &str) -> Rc<dyn NativeObject> {
    match module.get(name) {
        Some(Value::Native(native)) if native.downcast_ref::<TestCollection>().is_some() => native,
        other => panic!("{name} is not a collection: {other:?}"),
    }
}

fn collected(module: &ModuleValue, name: &str) -> Vec<Value> {
    collection(module, name)
        .downcast_ref::<TestCollection>()
        .expect("collection")
        .tests()
}

/// Call every collected test, stopping at the first error.
fn call_all(interp: &mut Interpreter, tests: &[Value]) -> Result<(), EvalError> {
    for test in tests {
        interp.call(test, CallArgs::default())?;
    }
    Ok(())
}

fn repr_of(module: &ModuleValue, name: &str) -> String {
    module.get(name).map(|value| value.repr()).unwrap_or_default()
}

#[test]
fn test_decorators_register_in_order() {
    let (_interp, module) = run(
        "suite = Tests()\n\
         @suite.test\n\
         def first():\n    pass\n\
         @suite.test\n\
         def second():\n    pass\n\
         size = len(suite)\n",
    );
    let names: Vec<String> = collected(&module, "suite")
        .iter()
        .filter_map(Value::display_name)
        .collect();
    assert_eq!(names, ["first", "second"]);
    assert_eq!(repr_of(&module, "size"), "2");
    assert!(matches!(module.get("first"), Some(Value::Function(_))));
}

#[test]
fn test_conditional_registration() {
    let (_interp, module) = run(
        "suite = Tests()\n\
         @suite.test_if(False)\n\
         def skipped():\n    pass\n\
         @suite.test_if(True)\n\
         def kept():\n    pass\n\
         other = Tests()\n\
         other.test(skipped)\n\
         suite.register_if(False)(other)\n\
         suite.register_if(1)([kept])\n",
    );
    assert!(matches!(module.get("skipped"), Some(Value::Function(_))));
    let names: Vec<String> = collected(&module, "suite")
        .iter()
        .filter_map(Value::display_name)
        .collect();
    assert_eq!(names, ["kept", "kept"]);
}

#[test]
fn test_contexts_wrap_tests_and_tear_down_in_reverse() {
    let (mut interp, module) = run(
        "log = []\n\
         suite = Tests()\n\
         @suite.test\n\
         def uses(a, b):\n    log.append('test ' + str(a) + ' ' + str(b))\n\
         @suite.context\n\
         def outer():\n    log.append('outer up')\n    yield 1\n    log.append('outer down')\n\
         @suite.context\n\
         def inner():\n    log.append('inner up')\n    yield (2, 3)\n    log.append('inner down')\n",
    );
    let tests = collected(&module, "suite");
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0].repr(), "<test uses>");
    call_all(&mut interp, &tests).expect("test passes");
    assert_eq!(
        repr_of(&module, "log"),
        "['outer up', 'inner up', 'test 1 2', 'inner down', 'outer down']"
    );
}

#[test]
fn test_teardown_runs_when_the_test_fails() {
    let (mut interp, module) = run(
        "log = []\n\
         suite = Tests()\n\
         @suite.context\n\
         def resource():\n    log.append('up')\n    yield\n    log.append('down')\n\
         @suite.test\n\
         def broken():\n    return 1 / 0\n",
    );
    let err = call_all(&mut interp, &collected(&module, "suite")).expect_err("test raises");
    assert!(err.is(BuiltinException::ZeroDivisionError));
    assert_eq!(repr_of(&module, "log"), "['up', 'down']");
}

#[test]
fn test_failing_setup_skips_the_test_but_unwinds_entered_contexts() {
    let (mut interp, module) = run(
        "log = []\n\
         suite = Tests()\n\
         @suite.context\n\
         def good():\n    yield\n    log.append('good down')\n\
         @suite.context\n\
         def bad():\n    missing_name\n    yield\n\
         @suite.test\n\
         def never():\n    log.append('ran')\n",
    );
    let err = call_all(&mut interp, &collected(&module, "suite")).expect_err("setup raises");
    assert!(err.is(BuiltinException::NameError));
    assert_eq!(repr_of(&module, "log"), "['good down']");
}

#[test]
fn test_tests_without_parameters_ignore_yielded_values() {
    let (mut interp, module) = run(
        "calls = []\n\
         suite = Tests()\n\
         @suite.context\n\
         def value():\n    yield 42\n\
         @suite.test\n\
         def plain():\n    calls.append('plain')\n\
         @suite.test\n\
         def star(*args):\n    calls.append(args)\n",
    );
    call_all(&mut interp, &collected(&module, "suite")).expect("tests pass");
    assert_eq!(repr_of(&module, "calls"), "['plain', (42,)]");
}

#[test]
fn test_context_must_yield() {
    let (mut interp, _session) = interpreter(None);
    let err = run_in(&mut interp, "suite = Tests()\nsuite.context(lambda: 1)\n")
        .expect_err("not a context");
    assert!(err.is(BuiltinException::TypeError));
}

#[test]
fn test_constructor_arguments() {
    let (mut interp, module) = run(
        "log = []\n\
         def ctx():\n    yield 'ctx'\n\
         def check(value):\n    log.append(value)\n\
         suite = Tests([check], contexts=[ctx])\n\
         copy = Tests(suite)\n",
    );
    assert_eq!(collected(&module, "suite").len(), 1);
    let copied = collected(&module, "copy");
    assert_eq!(copied.len(), 1);
    call_all(&mut interp, &copied).expect("test passes");
    assert_eq!(repr_of(&module, "log"), "['ctx']");
}

#[test]
fn test_register_by_dotted_name_and_module() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::create_dir(dir.path().join("pkg")).expect("package dir");
    std::fs::write(dir.path().join("pkg").join("__init__.att"), "").expect("write init");
    std::fs::write(
        dir.path().join("pkg").join("units.att"),
        "from attest import Tests\n\
         suite = Tests()\n\
         alias = suite\n\
         _hidden = Tests()\n\
         @suite.test\n\
         def one():\n    pass\n\
         @_hidden.test\n\
         def hidden():\n    pass\n",
    )
    .expect("write unit");

    let (mut interp, _session) = interpreter(Some(&dir));
    let module = run_in(
        &mut interp,
        "by_colon = Tests()\n\
         by_colon.register('pkg.units:suite')\n\
         by_dot = Tests()\n\
         by_dot.register('pkg.units.suite')\n\
         by_package = Tests()\n\
         by_package.register('pkg')\n",
    )
    .expect("module runs");
    for name in ["by_colon", "by_dot", "by_package"] {
        let names: Vec<String> = collected(&module, name)
            .iter()
            .filter_map(Value::display_name)
            .collect();
        assert_eq!(names, ["one"], "{name}");
    }
}

#[test]
fn test_register_rejects_non_tests() {
    let (mut interp, _session) = interpreter(None);
    let err = run_in(&mut interp, "suite = Tests()\nsuite.register(3)\n").expect_err("int");
    assert!(err.is(BuiltinException::TypeError));
    let err = run_in(&mut interp, "suite = Tests()\nsuite.register('no_such_unit')\n")
        .expect_err("missing unit");
    assert!(err.is(BuiltinException::ImportError));
}

#[test]
fn test_run_reports_through_script_output() {
    let (interp, module) = run(
        "suite = Tests()\n\
         @suite.test\n\
         def passes():\n    pass\n\
         ok = suite.run()\n",
    );
    assert_eq!(repr_of(&module, "ok"), "True");
    assert_eq!(
        interp.print_handler().take_output(),
        ".\n\nFailures: 0/1 (0 assertions)\n"
    );
}

#[test]
fn test_run_returns_false_on_failure() {
    let (interp, module) = run(
        "suite = Tests()\n\
         @suite.test\n\
         def fails():\n    return False\n\
         ok = suite.run('quickfix')\n",
    );
    assert_eq!(repr_of(&module, "ok"), "False");
    let output = interp.print_handler().take_output();
    assert!(
        output.ends_with(": AssertionError: fails() is False\n"),
        "{output}"
    );
}

#[test]
fn test_run_with_unknown_reporter() {
    let (mut interp, _session) = interpreter(None);
    let err = run_in(&mut interp, "Tests().run(reporter='fancy')\n").expect_err("unknown");
    assert!(err.is(BuiltinException::TypeError));
    assert!(err.message().contains("fancy"));
}

#[test]
fn test_test_case_attributes() {
    let (_interp, module) = run(
        "suite = Tests()\n\
         @suite.context\n\
         def ctx():\n    yield\n\
         @suite.test\n\
         def documented():\n    \"\"\"Checks things.\"\"\"\n    pass\n\
         case = list(suite)[0]\n\
         name = case.__name__\n\
         doc = case.__doc__\n\
         same = case.__wrapped__ is documented\n",
    );
    assert_eq!(repr_of(&module, "name"), "'documented'");
    assert_eq!(repr_of(&module, "doc"), "'Checks things.'");
    assert_eq!(repr_of(&module, "same"), "True");
}

#[test]
fn test_is_collection() {
    let (_interp, module) = run("suite = Tests()\nother = [1]\n");
    assert!(is_collection(&module.get("suite").expect("bound")));
    assert!(!is_collection(&module.get("other").expect("bound")));
    assert_eq!(repr_of(&module, "suite"), "<Tests (0 tests)>");
}
