#![allow(clippy::expect_used, reason = "tests use expect for brevity")]

use super::*;

use std::fs;

use attest_eval::{BuiltinException, FrameOrigin, TracebackEntry};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SUITE: &str = "\
from attest import assert_hook, Tests

suite = Tests()

@suite.test
def adds():
    assert 1 + 1 == 2
";

fn write(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).expect("write unit");
    path
}

fn options(target: &Path) -> RunOptions {
    RunOptions {
        targets: vec![target.display().to_string()],
        reporter: Some("quickfix".to_string()),
        ..RunOptions::default()
    }
}

#[test]
fn test_rewrite_opted_in_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(&dir, "suite.att", SUITE);
    let output = rewrite_file(&path).expect("rewrites");
    assert!(output.contains("assert_hook('1 + 1 == 2')"));
}

#[test]
fn test_rewrite_leaves_other_files_alone() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = "x = 1\nassert   x\n";
    let path = write(&dir, "plain.att", source);
    assert_eq!(rewrite_file(&path).expect("reads"), source);
}

#[test]
fn test_rewrite_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.att");
    assert!(matches!(rewrite_file(&missing), Err(CommandError::Io { .. })));
    let bad = write(&dir, "bad.att", "from attest import assert_hook\nassert (\n");
    let err = rewrite_file(&bad).expect_err("does not parse");
    assert!(matches!(err, CommandError::Parse { .. }));
    assert!(err.to_string().starts_with(&bad.display().to_string()));
}

#[test]
fn test_compile_writes_next_to_the_source() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(&dir, "suite.att", SUITE);
    let output = compile_file(&path).expect("compiles");
    assert_eq!(output, dir.path().join("suite.attc"));
    assert!(output.is_file());
}

#[test]
fn test_run_passing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(&dir, "passing_suite.att", SUITE);
    assert_eq!(run_tests_command(&options(&path)).expect("runs"), 0);
}

#[test]
fn test_run_failing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = SUITE.replace("== 2", "== 3");
    let path = write(&dir, "failing_suite.att", &source);
    assert_eq!(run_tests_command(&options(&path)).expect("runs"), 1);

    let regenerated = RunOptions {
        compile_mode: CompileMode::Regenerate,
        ..options(&path)
    };
    assert_eq!(run_tests_command(&regenerated).expect("runs"), 1);
}

#[test]
fn test_run_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(&dir, "reporter_suite.att", SUITE);
    let unknown = RunOptions {
        reporter: Some("fancy".to_string()),
        ..options(&path)
    };
    assert!(matches!(
        run_tests_command(&unknown),
        Err(CommandError::Reporter(_))
    ));

    let missing = RunOptions {
        targets: vec!["no_such_unit_anywhere".to_string()],
        ..RunOptions::default()
    };
    let Err(CommandError::Load(err)) = run_tests_command(&missing) else {
        panic!("expected a load error");
    };
    assert!(err.is(BuiltinException::ImportError));
}

#[test]
fn test_list_reporters() {
    assert_eq!(list_reporters(), ["auto", "plain", "quickfix"]);
}

#[test]
fn test_format_error() {
    let mut err = EvalError::new(BuiltinException::ImportError, "cannot import unit");
    assert_eq!(format_error(&err), "ImportError: cannot import unit");
    err.push_frame(TracebackEntry {
        file: "unit.att".into(),
        line: 2,
        function: "<module>".into(),
        origin: FrameOrigin::User,
    });
    assert_eq!(
        format_error(&err),
        "Traceback (most recent call last):\n  \
         File \"unit.att\", line 2, in <module>\n\
         ImportError: cannot import unit"
    );
}
