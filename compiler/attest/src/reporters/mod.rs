//! Test reporters.
//!
//! A reporter receives every result as it is produced and the summary at
//! the end. Reporters are looked up by name:
//!
//! - `plain` (also `auto`): progress dots, then every failure in full.
//! - `quickfix`: one `file:line: message` line per failure, the format
//!   editors parse into a jump list.

mod plain;
mod quickfix;

use std::io::{self, Write};

use attest_eval::SharedPrintHandler;

pub use plain::PlainReporter;
pub use quickfix::QuickFixReporter;

use crate::result::{TestResult, TestSummary};

/// Registered reporter names.
pub const REPORTER_NAMES: [&str; 3] = ["auto", "plain", "quickfix"];

pub trait Reporter {
    /// Called once before the first test.
    fn begin(&mut self, _total: usize) -> io::Result<()> {
        Ok(())
    }

    fn success(&mut self, result: &TestResult) -> io::Result<()>;

    fn failure(&mut self, result: &TestResult) -> io::Result<()>;

    /// Called once after the last test.
    fn finished(&mut self, summary: &TestSummary) -> io::Result<()>;
}

#[derive(Debug, thiserror::Error)]
#[error("no reporter named {name:?} (available: {})", REPORTER_NAMES.join(", "))]
pub struct UnknownReporter {
    pub name: String,
}

pub fn reporter_names() -> &'static [&'static str] {
    &REPORTER_NAMES
}

/// The reporter called `name`, or `default` when no name is given.
pub fn get_reporter_by_name(
    name: Option<&str>,
    default: &str,
    out: Box<dyn Write>,
) -> Result<Box<dyn Reporter>, UnknownReporter> {
    match name.unwrap_or(default) {
        "auto" | "plain" => Ok(Box::new(PlainReporter::new(out))),
        "quickfix" => Ok(Box::new(QuickFixReporter::new(out))),
        other => Err(UnknownReporter {
            name: other.to_string(),
        }),
    }
}

/// `io::Write` into an interpreter print handler, so reports produced from
/// a script follow the script's output.
pub struct HandlerWriter {
    handler: SharedPrintHandler,
}

impl HandlerWriter {
    pub fn new(handler: SharedPrintHandler) -> Self {
        HandlerWriter { handler }
    }
}

impl Write for HandlerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.handler.write(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
