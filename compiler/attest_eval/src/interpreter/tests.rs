#![allow(clippy::expect_used, reason = "tests use expect for brevity")]

use super::*;
use crate::errors::syntax_error;
use crate::print_handler::PrintHandler;
use crate::value::{BuiltinException, CallArgs};
use attest_parse::parse_module;
use pretty_assertions::assert_eq;
use std::path::Path;

fn interpreter() -> Interpreter {
    Interpreter::builder()
        .print_handler(PrintHandler::buffer())
        .build()
}

fn run_in(interp: &mut Interpreter, source: &str) -> Result<Rc<ModuleValue>, EvalError> {
    let code = parse_module(source).expect("source parses");
    interp.load_code("main", None, None, &code)
}

fn run(source: &str) -> Rc<ModuleValue> {
    run_in(&mut interpreter(), source).expect("script runs")
}

fn run_err(source: &str) -> EvalError {
    run_in(&mut interpreter(), source).expect_err("script raises")
}

fn global(module: &ModuleValue, name: &str) -> String {
    module
        .get(name)
        .map_or_else(|| format!("<unbound {name}>"), |value| value.repr())
}

fn write(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, contents).expect("write file");
}

#[test]
fn test_arithmetic_and_assignment() {
    let module = run("a = b = 2\nc = a ** 3 - 10 // 3\nd, e = 'xy'\nc += 1\n");
    assert_eq!(global(&module, "a"), "2");
    assert_eq!(global(&module, "c"), "6");
    assert_eq!(global(&module, "d"), "'x'");
    assert_eq!(global(&module, "e"), "'y'");
}

#[test]
fn test_control_flow() {
    let module = run(
        "total = 0\n\
         for i in range(10):\n    if i == 7:\n        break\n    if i % 2:\n        continue\n    total += i\n\
         n = 0\n\
         while n < 3:\n    n += 1\n",
    );
    assert_eq!(global(&module, "total"), "12");
    assert_eq!(global(&module, "n"), "3");
}

#[test]
fn test_function_arguments() {
    let module = run(
        "def f(a, b=2, *rest, **extra):\n    return (a, b, rest, extra)\n\
         r1 = f(1)\n\
         r2 = f(1, 3, 4, 5, key='v')\n\
         r3 = f(b=5, a=0)\n",
    );
    assert_eq!(global(&module, "r1"), "(1, 2, (), {})");
    assert_eq!(global(&module, "r2"), "(1, 3, (4, 5), {'key': 'v'})");
    assert_eq!(global(&module, "r3"), "(0, 5, (), {})");
}

#[test]
fn test_argument_errors() {
    let err = run_err("def f(a):\n    return a\nf(1, 2)\n");
    assert_eq!(
        err.to_string(),
        "TypeError: f() takes 1 positional argument but 2 were given"
    );
    let err = run_err("def f(a):\n    return a\nf()\n");
    assert_eq!(err.to_string(), "TypeError: f() missing required argument: 'a'");
}

#[test]
fn test_closures_capture_enclosing_scope() {
    let module = run(
        "def make_adder(n):\n    def add(x):\n        return x + n\n    return add\n\
         add3 = make_adder(3)\n\
         r = add3(4)\n\
         square = lambda x: x * x\n\
         s = square(5)\n",
    );
    assert_eq!(global(&module, "r"), "7");
    assert_eq!(global(&module, "s"), "25");
}

#[test]
fn test_comprehensions_do_not_leak() {
    let module = run(
        "x = 'outer'\n\
         squares = [x * x for x in range(4) if x != 2]\n\
         pairs = [(a, b) for a in 'ab' for b in (1, 2)]\n\
         total = sum(n for n in range(5))\n",
    );
    assert_eq!(global(&module, "x"), "'outer'");
    assert_eq!(global(&module, "squares"), "[0, 1, 9]");
    assert_eq!(
        global(&module, "pairs"),
        "[('a', 1), ('a', 2), ('b', 1), ('b', 2)]"
    );
    assert_eq!(global(&module, "total"), "10");
}

#[test]
fn test_try_except_finally() {
    let module = run(
        "log = []\n\
         try:\n    log.append('body')\n    raise KeyError('k')\n\
         except (ValueError, LookupError) as e:\n    log.append(type(e))\n    caught = e\n\
         finally:\n    log.append('finally')\n\
         try:\n    try:\n        1 / 0\n    except ZeroDivisionError:\n        raise\n\
         except ArithmeticError as outer:\n    reraised = str(outer)\n",
    );
    assert_eq!(
        global(&module, "log"),
        "['body', <class 'KeyError'>, 'finally']"
    );
    assert_eq!(global(&module, "caught"), "KeyError('k')");
    assert_eq!(global(&module, "reraised"), "'division by zero'");
}

#[test]
fn test_unhandled_exception_propagates() {
    let err = run_err("try:\n    raise ValueError('x')\nexcept TypeError:\n    pass\n");
    assert!(err.is(BuiltinException::ValueError));
    assert_eq!(err.message(), "x");
}

#[test]
fn test_plain_assert_raises_assertion_error() {
    let err = run_err("assert 1 == 2, 'numbers differ'\n");
    assert!(err.is(BuiltinException::AssertionError));
    assert_eq!(err.message(), "numbers differ");
}

#[test]
fn test_traceback_records_every_frame() {
    let err = run_err(
        "def inner():\n    raise ValueError('deep')\n\ndef outer():\n    inner()\n\nouter()\n",
    );
    let frames: Vec<(String, u32)> = err
        .traceback
        .iter()
        .map(|entry| (entry.function.to_string(), entry.line))
        .collect();
    assert_eq!(
        frames,
        vec![
            ("<module>".to_string(), 7),
            ("outer".to_string(), 5),
            ("inner".to_string(), 2),
        ]
    );
    assert_eq!(
        err.traceback[0].to_string(),
        "File \"<main>\", line 7, in <module>"
    );
}

#[test]
fn test_recursion_limit() {
    let mut interp = Interpreter::builder()
        .max_depth(40)
        .print_handler(PrintHandler::silent())
        .build();
    let err = run_in(&mut interp, "def f(n):\n    return f(n + 1)\nf(0)\n").expect_err("too deep");
    assert!(err.is(BuiltinException::RecursionError));
    assert_eq!(interp.stack_depth(), 0);
}

#[test]
fn test_integer_overflow() {
    let err = run_err("x = 9223372036854775807 + 1\n");
    assert!(err.is(BuiltinException::OverflowError));
}

#[test]
fn test_slices() {
    let module = run(
        "xs = [1, 2, 3, 4, 5]\n\
         head = xs[:2]\n\
         evens = xs[1::2]\n\
         back = xs[::-1]\n\
         down = xs[3:0:-2]\n\
         word = 'h\u{e9}llo'[::-1]\n\
         pair = (1, 2, 3)[-2:]\n\
         empty = xs[10:]\n",
    );
    assert_eq!(global(&module, "head"), "[1, 2]");
    assert_eq!(global(&module, "evens"), "[2, 4]");
    assert_eq!(global(&module, "back"), "[5, 4, 3, 2, 1]");
    assert_eq!(global(&module, "down"), "[4, 2]");
    assert_eq!(global(&module, "word"), "'oll\u{e9}h'");
    assert_eq!(global(&module, "pair"), "(2, 3)");
    assert_eq!(global(&module, "empty"), "[]");

    let err = run_err("[1, 2, 3][::0]
");
    assert!(err.is(BuiltinException::ValueError));
    assert_eq!(err.message(), "slice step cannot be zero");
}

#[test]
fn test_print_goes_to_handler() {
    let mut interp = interpreter();
    run_in(&mut interp, "print('hello', 42)\nprint([1], end='')\n").expect("runs");
    assert_eq!(interp.print_handler().output(), "hello 42\n[1]");
}

#[test]
fn test_context_functions_split_at_yield() {
    let mut interp = interpreter();
    let module = run_in(
        &mut interp,
        "events = []\n\
         def ctx(tag):\n    events.append('setup ' + tag)\n    yield tag.upper()\n    events.append('teardown ' + tag)\n",
    )
    .expect("runs");
    let Some(Value::Function(ctx)) = module.get("ctx") else {
        panic!("ctx is not a function");
    };
    assert!(ctx.is_context());

    let (value, state) = interp
        .enter_context(&ctx, CallArgs::new(vec![Value::from("db")]))
        .expect("setup runs");
    assert_eq!(value.repr(), "'DB'");
    assert_eq!(global(&module, "events"), "['setup db']");

    interp.exit_context(state).expect("teardown runs");
    assert_eq!(global(&module, "events"), "['setup db', 'teardown db']");

    let err = interp
        .call(&Value::Function(ctx), CallArgs::new(vec![Value::from("x")]))
        .expect_err("plain call rejected");
    assert!(err.is(BuiltinException::TypeError));
}

#[test]
fn test_scope_builtins() {
    let module = run(
        "name = globals()['__name__']\n\
         def f():\n    local_value = 1\n    return locals()\n\
         l = f()\n",
    );
    assert_eq!(global(&module, "name"), "'main'");
    assert_eq!(global(&module, "l"), "{'local_value': 1}");
}

#[test]
fn test_eval_in_uses_given_scopes() {
    let mut interp = interpreter();
    let module = run_in(&mut interp, "x = 10\n").expect("runs");
    let locals = crate::environment::new_namespace(None);
    locals.borrow_mut().define("y", Value::Int(5));
    let result = interp
        .eval_source_in("x + y", &module.namespace, &locals)
        .expect("evaluates");
    assert_eq!(result.repr(), "15");

    let err = interp
        .eval_source_in("z", &module.namespace, &locals)
        .expect_err("unbound");
    assert_eq!(err.to_string(), "NameError: name 'z' is not defined");
    assert_eq!(err.traceback[0].origin, FrameOrigin::Internal);
}

#[test]
fn test_import_packages_and_relative_imports() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "pkg/__init__.att", "from .helpers import double\nNAME = 'pkg'\n");
    write(dir.path(), "pkg/helpers.att", "def double(x):\n    return x * 2\n");
    write(dir.path(), "plain.att", "VALUE = 1\n");

    let mut interp = Interpreter::builder()
        .search_path(dir.path())
        .print_handler(PrintHandler::silent())
        .build();
    let module = run_in(
        &mut interp,
        "import pkg.helpers\n\
         from pkg import double, NAME\n\
         import plain as p\n\
         a = pkg.helpers.double(3)\n\
         b = double(4)\n\
         c = p.VALUE\n",
    )
    .expect("runs");
    assert_eq!(global(&module, "a"), "6");
    assert_eq!(global(&module, "b"), "8");
    assert_eq!(global(&module, "c"), "1");
    assert_eq!(global(&module, "NAME"), "'pkg'");

    let pkg = interp.module("pkg").expect("pkg loaded");
    assert!(pkg.is_package());
    assert_eq!(pkg.package_path, Some(vec![dir.path().join("pkg")]));
    assert!(interp.is_loaded("pkg.helpers"));
}

#[test]
fn test_units_execute_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "counted.att", "print('loading')\n");
    let mut interp = Interpreter::builder().search_path(dir.path()).build();
    interp.set_print_handler(PrintHandler::buffer());
    run_in(&mut interp, "import counted\nimport counted\n").expect("runs");
    let first = interp.import_module("counted").expect("cached");
    let second = interp.import_module("counted").expect("cached");
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(interp.print_handler().output().matches("loading").count(), 1);
}

#[test]
fn test_failed_unit_is_removed_from_registry() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "broken.att", "x = 1\nraise ValueError('boom')\n");
    let mut interp = Interpreter::builder()
        .search_path(dir.path())
        .print_handler(PrintHandler::silent())
        .build();
    let err = interp.import_module("broken").expect_err("raises");
    assert!(err.is(BuiltinException::ValueError));
    assert!(!interp.is_loaded("broken"));

    let err = interp.import_module("missing").expect_err("not found");
    assert_eq!(err.to_string(), "ImportError: No module named 'missing'");
}

#[test]
fn test_precompiled_units_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "fast.att", "def answer():\n    return 42\n");
    crate::loader::compile_file(&dir.path().join("fast.att")).expect("compiles");
    std::fs::remove_file(dir.path().join("fast.att")).expect("remove source");

    let mut interp = Interpreter::builder()
        .search_path(dir.path())
        .print_handler(PrintHandler::silent())
        .build();
    let module = run_in(&mut interp, "from fast import answer\nr = answer()\n").expect("runs");
    assert_eq!(global(&module, "r"), "42");
}

struct VirtualFinder;

impl MetaPathFinder for VirtualFinder {
    fn name(&self) -> &str {
        "virtual"
    }

    fn find_module(&self, _interp: &Interpreter, name: &str, _path: Option<&[PathBuf]>) -> bool {
        name == "virtual"
    }

    fn load_module(&self, interp: &mut Interpreter, name: &str) -> Result<Rc<ModuleValue>, EvalError> {
        let code = parse_module("answer = 42\n").map_err(|err| syntax_error(&err))?;
        interp.load_code(name, None, None, &code)
    }
}

#[test]
fn test_finders_run_before_default_loader() {
    let mut interp = interpreter();
    interp.add_finder(Rc::new(VirtualFinder));
    assert!(interp.has_finder("virtual"));
    let module = run_in(&mut interp, "from virtual import answer\n").expect("runs");
    assert_eq!(global(&module, "answer"), "42");

    assert!(interp.remove_finder("virtual"));
    assert!(!interp.has_finder("virtual"));
}
