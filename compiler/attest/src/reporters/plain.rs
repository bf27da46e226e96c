use std::io::{self, Write};

use super::Reporter;
use crate::result::{FailureKind, TestResult, TestSummary};

/// Width of the rule under each failing test's name.
const RULE_WIDTH: usize = 70;

/// Progress dots, then each failure with its output and traceback.
pub struct PlainReporter<W: Write> {
    out: W,
    failures: Vec<TestResult>,
}

impl<W: Write> PlainReporter<W> {
    pub fn new(out: W) -> Self {
        PlainReporter {
            out,
            failures: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_failure(&mut self, result: &TestResult) -> io::Result<()> {
        writeln!(self.out, "{}", result.test.test_name())?;
        if let Some(doc) = &result.test.doc {
            writeln!(self.out, "{}", doc.trim())?;
        }
        writeln!(self.out, "{}", "-".repeat(RULE_WIDTH))?;
        for line in &result.stdout {
            writeln!(self.out, "-> {line}")?;
        }
        writeln!(self.out, "{}", result.traceback())?;
        if let Some(assertion) = result.assertion() {
            writeln!(self.out, "{assertion}")?;
        }
        writeln!(self.out)
    }
}

impl<W: Write> Reporter for PlainReporter<W> {
    fn success(&mut self, _result: &TestResult) -> io::Result<()> {
        write!(self.out, ".")?;
        self.out.flush()
    }

    fn failure(&mut self, result: &TestResult) -> io::Result<()> {
        let mark = match result.kind() {
            Some(FailureKind::Error) => "E",
            _ => "F",
        };
        write!(self.out, "{mark}")?;
        self.failures.push(result.clone());
        self.out.flush()
    }

    fn finished(&mut self, summary: &TestSummary) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out)?;
        for result in std::mem::take(&mut self.failures) {
            self.write_failure(&result)?;
        }
        writeln!(
            self.out,
            "Failures: {}/{} ({} assertions)",
            summary.failed(),
            summary.total,
            summary.assertions
        )?;
        self.out.flush()
    }
}
