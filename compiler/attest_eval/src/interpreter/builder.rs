//! Interpreter configuration.

use std::path::PathBuf;

use super::Interpreter;
use crate::print_handler::{PrintHandler, SharedPrintHandler};
use crate::stack::DEFAULT_MAX_DEPTH;

/// Builder for [`Interpreter`].
///
/// ```ignore
/// let interp = Interpreter::builder()
///     .search_path("tests")
///     .max_depth(200)
///     .print_handler(PrintHandler::buffer())
///     .build();
/// ```
pub struct InterpreterBuilder {
    search_paths: Vec<PathBuf>,
    max_depth: usize,
    print_handler: Option<SharedPrintHandler>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder {
            search_paths: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            print_handler: None,
        }
    }

    #[must_use]
    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    #[must_use]
    pub fn search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths.extend(paths);
        self
    }

    /// Call depth past which calls raise `RecursionError`.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    pub fn build(self) -> Interpreter {
        Interpreter::from_parts(
            self.search_paths,
            self.max_depth,
            self.print_handler.unwrap_or_else(PrintHandler::stdout),
        )
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
