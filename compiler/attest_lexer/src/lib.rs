//! Lexer for attest scripts using logos.
//!
//! Produces a flat token vector ending in `Eof`, with `Newline`, `Indent`
//! and `Dedent` layout tokens already inserted, so the parser never looks at
//! whitespace.

mod cooker;
mod escape;
mod lex_error;
mod line_index;
mod raw_token;

use attest_ir::Token;

pub use lex_error::{LexError, LexErrorKind};
pub use line_index::LineIndex;

/// Lex source text into tokens.
///
/// Stops at the first error.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    cooker::Cooker::new(source).run()
}
