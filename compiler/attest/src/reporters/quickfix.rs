use std::io::{self, Write};

use super::Reporter;
use crate::result::{TestResult, TestSummary};

/// `file:line: Type: message`, one line per failure.
pub struct QuickFixReporter<W: Write> {
    out: W,
}

impl<W: Write> QuickFixReporter<W> {
    pub fn new(out: W) -> Self {
        QuickFixReporter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for QuickFixReporter<W> {
    fn success(&mut self, _result: &TestResult) -> io::Result<()> {
        Ok(())
    }

    /// Points at the innermost frame; falls back to the test definition.
    fn failure(&mut self, result: &TestResult) -> io::Result<()> {
        let Some(exception) = result.exception() else {
            return Ok(());
        };
        let (file, line) = match result.raw_traceback().last() {
            Some(entry) => (entry.file.to_string(), entry.line),
            None => (result.test.file.clone(), result.test.line),
        };
        writeln!(self.out, "{file}:{line}: {exception}")
    }

    fn finished(&mut self, _summary: &TestSummary) -> io::Result<()> {
        self.out.flush()
    }
}
