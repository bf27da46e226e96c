#![allow(clippy::expect_used, reason = "tests use expect for brevity")]

use super::*;

use std::fs;
use std::path::Path;

use attest_eval::{CallArgs, PrintHandler, Value};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::session::Session;

const OPTED_IN: &str = "\
from attest import assert_hook

def check():
    value = 2
    assert value > 3
";

const PLAIN: &str = "\
def check():
    value = 2
    assert value > 3
";

struct Fixture {
    dir: TempDir,
    interp: Interpreter,
    session: Session,
}

impl Fixture {
    fn new(mode: CompileMode) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut interp = Interpreter::builder()
            .search_path(dir.path())
            .print_handler(PrintHandler::buffer())
            .build();
        let session = Session::install(&mut interp);
        ImportHook::enable(&mut interp, HookConfig::default().compile_mode(mode));
        Fixture {
            dir,
            interp,
            session,
        }
    }

    fn write(&self, relative: &str, source: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create package dir");
        }
        fs::write(&path, source).expect("write unit");
        path
    }

    fn import(&mut self, name: &str) -> Result<Rc<ModuleValue>, EvalError> {
        self.interp.import_module(name)
    }

    /// Import `name` and call its `check()`.
    fn check(&mut self, name: &str) -> Result<Value, EvalError> {
        let module = self.import(name).expect("unit imports");
        let check = module.get("check").expect("unit defines check");
        self.interp.call(&check, CallArgs::default())
    }
}

fn file_name(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn test_opted_in_unit_is_rewritten() {
    let mut fixture = Fixture::new(CompileMode::Tree);
    fixture.write("sample.att", OPTED_IN);
    let err = fixture.check("sample").expect_err("assert fails");
    assert!(fixture.session.is_test_failure(&err));
    assert_eq!(err.to_string(), "TestFailure: not (2 > 3)");
    assert_eq!(fixture.session.statistics().assertions(), 1);
}

#[test]
fn test_rewritten_units_may_rebind_scope_builtins() {
    let source = "\
from attest import assert_hook

globals = 'g'

def check():
    locals = 1
    assert locals == 1
    assert locals == globals
";
    for mode in [CompileMode::Tree, CompileMode::Regenerate] {
        let mut fixture = Fixture::new(mode);
        fixture.write("shadows.att", source);
        let err = fixture.check("shadows").expect_err("second assert fails");
        assert!(fixture.session.is_test_failure(&err));
        assert_eq!(err.to_string(), "TestFailure: not (1 == 'g')");
        assert_eq!(fixture.session.statistics().assertions(), 2);
    }
}

#[test]
fn test_unit_without_opt_in_runs_unchanged() {
    let mut fixture = Fixture::new(CompileMode::Tree);
    fixture.write("plain.att", PLAIN);
    let err = fixture.check("plain").expect_err("assert fails");
    assert!(err.is(BuiltinException::AssertionError));
    assert!(!fixture.session.is_test_failure(&err));
    assert_eq!(err.to_string(), "AssertionError");
    assert_eq!(fixture.session.statistics().assertions(), 0);
}

#[test]
fn test_module_file_and_traceback_point_at_the_source() {
    let mut fixture = Fixture::new(CompileMode::Tree);
    let path = fixture.write("sample.att", OPTED_IN);
    let module = fixture.import("sample").expect("imports");
    assert_eq!(module.file.as_deref(), Some(path.as_path()));
    let err = fixture.check("sample").expect_err("assert fails");
    let innermost = err
        .traceback
        .iter()
        .rev()
        .find(|entry| entry.origin == attest_eval::FrameOrigin::User)
        .expect("user frame");
    assert_eq!(innermost.file.as_ref(), file_name(&path));
    assert_eq!(innermost.line, 5);
    assert_eq!(innermost.function.as_ref(), "check");
}

#[test]
fn test_unit_executes_once() {
    let mut fixture = Fixture::new(CompileMode::Tree);
    fixture.write("noisy.att", "from attest import assert_hook\nprint('loaded')\n");
    let first = fixture.import("noisy").expect("imports");
    let second = fixture.import("noisy").expect("imports again");
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(fixture.interp.print_handler().take_output(), "loaded\n");
}

#[test]
fn test_precompiled_unit_is_delegated() {
    let mut fixture = Fixture::new(CompileMode::Tree);
    let source = fixture.write("compiled.att", OPTED_IN);
    attest_eval::loader::compile_file(&source).expect("compiles");
    fs::remove_file(&source).expect("remove source");

    let err = fixture.check("compiled").expect_err("assert fails");
    assert!(err.is(BuiltinException::AssertionError));
    assert!(!fixture.session.is_test_failure(&err));
}

#[test]
fn test_package_submodules_are_rewritten() {
    let mut fixture = Fixture::new(CompileMode::Tree);
    fixture.write("pkg/__init__.att", "");
    fixture.write("pkg/sub.att", OPTED_IN);
    let err = fixture.check("pkg.sub").expect_err("assert fails");
    assert!(fixture.session.is_test_failure(&err));
    let package = fixture.interp.module("pkg").expect("parent imported");
    assert!(package.get("sub").is_some());
}

#[test]
fn test_execution_failure_becomes_import_error() {
    let mut fixture = Fixture::new(CompileMode::Tree);
    fixture.write("broken.att", "from attest import assert_hook\nx = 1 / 0\n");
    let err = fixture.import("broken").expect_err("unit raises");
    assert!(err.is(BuiltinException::ImportError));
    assert!(err.message().starts_with("cannot import broken: ZeroDivisionError"));
    let cause = err.exception.get_attr("__cause__").expect("cause attached");
    assert_eq!(cause.type_name(), "ZeroDivisionError");
    assert!(!err.traceback.is_empty());
    assert!(!fixture.interp.is_loaded("broken"));
}

#[test]
fn test_unparseable_unit_becomes_syntax_error() {
    let mut fixture = Fixture::new(CompileMode::Tree);
    fixture.write("bad.att", "from attest import assert_hook\nassert (\n");
    let err = fixture.import("bad").expect_err("does not parse");
    assert!(err.is(BuiltinException::SyntaxError));
    assert!(err.message().starts_with("cannot import bad:"));
}

#[test]
fn test_regenerate_mode_behaves_like_tree_mode() {
    let mut tree = Fixture::new(CompileMode::Tree);
    tree.write("sample.att", OPTED_IN);
    let mut regenerated = Fixture::new(CompileMode::Regenerate);
    regenerated.write("sample.att", OPTED_IN);

    let tree_err = tree.check("sample").expect_err("assert fails");
    let regenerated_err = regenerated.check("sample").expect_err("assert fails");
    assert_eq!(tree_err.to_string(), regenerated_err.to_string());
    assert!(regenerated.session.is_test_failure(&regenerated_err));
}

#[test]
fn test_enable_and_disable() {
    let mut interp = Interpreter::builder()
        .print_handler(PrintHandler::buffer())
        .build();
    assert!(!ImportHook::is_enabled(&interp));
    let hook = ImportHook::enable(&mut interp, HookConfig::default());
    assert_eq!(hook.config().compile_mode, CompileMode::Tree);
    ImportHook::enable(
        &mut interp,
        HookConfig::default().compile_mode(CompileMode::Regenerate),
    );
    assert!(ImportHook::is_enabled(&interp));
    assert!(ImportHook::disable(&mut interp));
    assert!(!ImportHook::is_enabled(&interp));
    assert!(!ImportHook::disable(&mut interp));
}

#[test]
fn test_found_locations_stay_cached() {
    let mut fixture = Fixture::new(CompileMode::Tree);
    fixture.write("sample.att", OPTED_IN);
    let hook = ImportHook::new(HookConfig::default());

    assert!(!hook.find_module(&fixture.interp, "missing", None));
    assert!(hook.cached("missing").is_none());

    assert!(hook.find_module(&fixture.interp, "sample", None));
    let cached = hook.cached("sample").expect("location cached");
    assert!(cached.has_source());

    let module = hook
        .load_module(&mut fixture.interp, "sample")
        .expect("loads");
    assert_eq!(&*module.name, "sample");
    let kept = hook.cached("sample").expect("location kept after load");
    assert_eq!(kept.location, cached.location);

    let again = hook
        .load_module(&mut fixture.interp, "sample")
        .expect("already loaded");
    assert!(Rc::ptr_eq(&module, &again));
}

#[test]
fn test_load_without_a_unit_is_an_import_error() {
    let mut fixture = Fixture::new(CompileMode::Tree);
    let hook = ImportHook::new(HookConfig::default());
    let err = hook
        .load_module(&mut fixture.interp, "nowhere")
        .expect_err("nothing to load");
    assert!(err.is(BuiltinException::ImportError));
    assert_eq!(err.message(), "cannot import nowhere: no unit found");
}

#[test]
fn test_load_error_names_the_unit() {
    let err = LoadError::NotFound {
        name: "pkg.unit".to_string(),
    };
    assert_eq!(err.name(), "pkg.unit");
    assert_eq!(err.to_string(), "cannot import pkg.unit: no unit found");
}
