//! Test result types.

use std::fmt::Write as _;
use std::time::Duration;

use attest_eval::{BuiltinException, EvalError, FrameOrigin, TracebackEntry, Value};

use crate::assertion::AssertionFailure;
use crate::collector::TestCase;

/// Where a test came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestIdentity {
    /// Module the test function was defined in.
    pub module: String,
    pub name: String,
    pub doc: Option<String>,
    pub file: String,
    pub line: u32,
}

impl TestIdentity {
    /// Identity of a collected test: a function, or a context-wrapped one.
    pub fn of(test: &Value) -> Self {
        match test {
            Value::Function(function) => TestIdentity {
                module: function.module.to_string(),
                name: function.name().to_string(),
                doc: function.def.docstring().map(str::to_string),
                file: function.file.to_string(),
                line: function.span.line,
            },
            Value::Native(native) => match native.downcast_ref::<TestCase>() {
                Some(case) => TestIdentity::of(case.func()),
                None => TestIdentity::anonymous(native.repr()),
            },
            other => TestIdentity::anonymous(
                other.display_name().unwrap_or_else(|| other.repr()),
            ),
        }
    }

    fn anonymous(name: String) -> Self {
        TestIdentity {
            module: String::new(),
            name,
            doc: None,
            file: String::new(),
            line: 0,
        }
    }

    /// `module.name`, or just `name` for tests defined in the main script.
    pub fn test_name(&self) -> String {
        if self.module.is_empty() || self.module == "__main__" {
            self.name.clone()
        } else {
            format!("{}.{}", self.module, self.name)
        }
    }
}

/// How a test went wrong.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// A rewritten `assert` was false.
    Assertion,
    /// Any other `AssertionError`, including `Assert` wrapper checks.
    Failure,
    /// Anything else raised.
    Error,
}

/// Result of running a single test.
#[derive(Clone, Debug)]
pub struct TestResult {
    pub test: TestIdentity,
    /// The exception the test raised, if any.
    pub error: Option<EvalError>,
    /// Set when `error` is a `TestFailure`.
    pub failure: Option<AssertionFailure>,
    /// Captured output, one entry per line.
    pub stdout: Vec<String>,
    pub elapsed: Duration,
    full_tracebacks: bool,
    blank_line_numbers: bool,
}

impl TestResult {
    /// Create a passed test result.
    pub fn passed(test: TestIdentity, stdout: Vec<String>, elapsed: Duration) -> Self {
        TestResult {
            test,
            error: None,
            failure: None,
            stdout,
            elapsed,
            full_tracebacks: false,
            blank_line_numbers: false,
        }
    }

    /// Create a failed test result.
    #[cold]
    pub fn failed(
        test: TestIdentity,
        error: EvalError,
        failure: Option<AssertionFailure>,
        stdout: Vec<String>,
        elapsed: Duration,
    ) -> Self {
        TestResult {
            test,
            error: Some(error),
            failure,
            stdout,
            elapsed,
            full_tracebacks: false,
            blank_line_numbers: false,
        }
    }

    /// Keep frames of library-internal evaluation in tracebacks.
    #[must_use]
    pub fn with_full_tracebacks(mut self, full: bool) -> Self {
        self.full_tracebacks = full;
        self
    }

    /// Report every line number as 0. Used when the executed code was
    /// regenerated and its lines no longer match the file on disk.
    #[must_use]
    pub fn with_blank_line_numbers(mut self, blank: bool) -> Self {
        self.blank_line_numbers = blank;
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn kind(&self) -> Option<FailureKind> {
        let error = self.error.as_ref()?;
        Some(if self.failure.is_some() {
            FailureKind::Assertion
        } else if error.is(BuiltinException::AssertionError) {
            FailureKind::Failure
        } else {
            FailureKind::Error
        })
    }

    /// Traceback frames, outermost first.
    pub fn raw_traceback(&self) -> Vec<TracebackEntry> {
        let Some(error) = &self.error else {
            return Vec::new();
        };
        error
            .traceback
            .iter()
            .filter(|entry| self.full_tracebacks || entry.origin == FrameOrigin::User)
            .map(|entry| {
                let mut entry = entry.clone();
                if self.blank_line_numbers {
                    entry.line = 0;
                }
                entry
            })
            .collect()
    }

    /// The exception line: `Type: message`.
    pub fn exception(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// The formatted traceback, ending with the exception line.
    pub fn traceback(&self) -> String {
        let Some(error) = &self.error else {
            return String::new();
        };
        let mut out = String::from("Traceback (most recent call last):\n");
        for entry in self.raw_traceback() {
            let _ = writeln!(out, "  {entry}");
        }
        let _ = write!(out, "{error}");
        out
    }

    /// `assert <condition>` and `assert <rendered>`, for assertion failures.
    pub fn assertion(&self) -> Option<String> {
        self.failure
            .as_ref()
            .map(|failure| format!("assert {}\nassert {}", failure.expr, failure.rendered))
    }
}

/// Summary of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    /// `AssertionError`s, rewritten or not.
    pub failures: usize,
    /// Tests that raised anything else.
    pub errors: usize,
    /// Assertions counted during the run.
    pub assertions: usize,
    pub elapsed: Duration,
}

impl TestSummary {
    pub fn add_result(&mut self, result: &TestResult) {
        self.total += 1;
        match result.kind() {
            None => self.passed += 1,
            Some(FailureKind::Assertion | FailureKind::Failure) => self.failures += 1,
            Some(FailureKind::Error) => self.errors += 1,
        }
    }

    /// Tests that did not pass.
    pub fn failed(&self) -> usize {
        self.failures + self.errors
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

#[cfg(test)]
mod tests;
