//! Parse error type.

use std::fmt;

use attest_ir::{Span, TokenKind};
use attest_lexer::LexError;

/// A syntax error with its location.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }

    /// Generic error for a token that cannot continue the current production.
    #[cold]
    pub fn invalid_syntax(span: Span) -> Self {
        ParseError::new("invalid syntax", span)
    }

    #[cold]
    pub fn expected(what: &str, found: &TokenKind, span: Span) -> Self {
        ParseError::new(format!("expected {what}, found {found}"), span)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_dummy() {
            f.write_str(&self.message)
        } else {
            write!(
                f,
                "{} (line {}, column {})",
                self.message,
                self.span.line,
                self.span.col + 1
            )
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(err.kind.to_string(), err.span)
    }
}
