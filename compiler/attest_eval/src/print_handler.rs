//! Destination for `print()` output.
//!
//! Scripts print to stdout by default. The test runner swaps in a buffer
//! around each test so incidental output can be attached to its result.

use std::io::Write;
use std::rc::Rc;

use parking_lot::Mutex;

/// Captures printed text in memory.
#[derive(Default)]
pub struct BufferPrintHandler {
    buffer: Mutex<String>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, text: &str) {
        self.buffer.lock().push_str(text);
    }

    pub fn output(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Return the captured text and clear the buffer.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buffer.lock())
    }
}

/// Print handler, dispatched by variant.
pub enum PrintHandler {
    Stdout,
    Buffer(BufferPrintHandler),
    Silent,
}

/// Shared handle; the interpreter and a capture guard may both hold one.
pub type SharedPrintHandler = Rc<PrintHandler>;

impl PrintHandler {
    pub fn stdout() -> SharedPrintHandler {
        Rc::new(PrintHandler::Stdout)
    }

    pub fn buffer() -> SharedPrintHandler {
        Rc::new(PrintHandler::Buffer(BufferPrintHandler::new()))
    }

    pub fn silent() -> SharedPrintHandler {
        Rc::new(PrintHandler::Silent)
    }

    /// Write `text` as-is; callers add the line terminator.
    pub fn write(&self, text: &str) {
        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                // Output errors (closed pipe) are not script errors.
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            Self::Buffer(buffer) => buffer.write(text),
            Self::Silent => {}
        }
    }

    /// Captured output; empty for handlers that do not capture.
    pub fn output(&self) -> String {
        match self {
            Self::Buffer(buffer) => buffer.output(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    pub fn take_output(&self) -> String {
        match self {
            Self::Buffer(buffer) => buffer.take(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }
}
