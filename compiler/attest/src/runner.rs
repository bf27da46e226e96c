//! Running collected tests.
//!
//! Each test is called with no arguments (context-wrapped tests supply
//! their own) under output capture. A test that returns `False` fails as
//! if it had asserted.

use std::io;
use std::rc::Rc;
use std::time::Instant;

use attest_eval::errors::assertion_error;
use attest_eval::{CallArgs, EvalError, Interpreter, PrintHandler, Value};
use tracing::{debug, instrument};

use crate::assertion::AssertionFailure;
use crate::reporters::Reporter;
use crate::result::{TestIdentity, TestResult, TestSummary};
use crate::session::Session;

/// Configuration for a test run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Keep library-internal frames in tracebacks.
    pub full_tracebacks: bool,
    /// Stop after the first test that does not pass.
    pub fail_fast: bool,
    /// Capture `print` output per test.
    pub capture: bool,
    /// Report line numbers as 0 (regenerated code).
    pub blank_line_numbers: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            full_tracebacks: false,
            fail_fast: false,
            capture: true,
            blank_line_numbers: false,
        }
    }
}

impl RunnerConfig {
    #[must_use]
    pub fn full_tracebacks(mut self, full: bool) -> Self {
        self.full_tracebacks = full;
        self
    }

    #[must_use]
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    #[must_use]
    pub fn capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    #[must_use]
    pub fn blank_line_numbers(mut self, blank: bool) -> Self {
        self.blank_line_numbers = blank;
        self
    }
}

/// Run `f` with `print` output redirected to a buffer. Returns its result
/// and the captured lines.
pub fn capture_output<T>(
    interp: &mut Interpreter,
    f: impl FnOnce(&mut Interpreter) -> T,
) -> (T, Vec<String>) {
    let buffer = PrintHandler::buffer();
    let previous = interp.set_print_handler(Rc::clone(&buffer));
    let value = f(interp);
    interp.set_print_handler(previous);
    let lines = buffer.take_output().lines().map(str::to_string).collect();
    (value, lines)
}

/// Run a single test.
pub fn run_test(
    interp: &mut Interpreter,
    session: &Session,
    test: &Value,
    config: &RunnerConfig,
) -> TestResult {
    let identity = TestIdentity::of(test);
    let start = Instant::now();
    let call = |interp: &mut Interpreter| -> Result<(), EvalError> {
        match interp.call(test, CallArgs::default())? {
            Value::Bool(false) => Err(assertion_error(Some(Value::from(format!(
                "{}() is False",
                identity.name
            ))))),
            _ => Ok(()),
        }
    };
    let (outcome, stdout) = if config.capture {
        capture_output(interp, call)
    } else {
        (call(interp), Vec::new())
    };
    let elapsed = start.elapsed();
    let result = match outcome {
        Ok(()) => TestResult::passed(identity, stdout, elapsed),
        Err(error) => {
            let failure = AssertionFailure::from_error(&error, session.test_failure());
            debug!(test = %identity.test_name(), %error, "test failed");
            TestResult::failed(identity, error, failure, stdout, elapsed)
        }
    };
    result
        .with_full_tracebacks(config.full_tracebacks)
        .with_blank_line_numbers(config.blank_line_numbers)
}

/// Run `tests` in order, reporting each result.
#[instrument(level = "debug", skip_all, fields(tests = tests.len()))]
pub fn run_tests(
    interp: &mut Interpreter,
    session: &Session,
    tests: &[Value],
    reporter: &mut dyn Reporter,
    config: &RunnerConfig,
) -> io::Result<TestSummary> {
    let assertions_before = session.statistics().assertions();
    let start = Instant::now();
    let mut summary = TestSummary::default();
    reporter.begin(tests.len())?;
    for test in tests {
        let result = run_test(interp, session, test, config);
        summary.add_result(&result);
        if result.is_success() {
            reporter.success(&result)?;
        } else {
            reporter.failure(&result)?;
            if config.fail_fast {
                debug!("stopping after the first failure");
                break;
            }
        }
    }
    summary.assertions = session
        .statistics()
        .assertions()
        .saturating_sub(assertions_before);
    summary.elapsed = start.elapsed();
    reporter.finished(&summary)?;
    Ok(summary)
}
