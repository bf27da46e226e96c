//! Lexer error types.

use std::fmt;

use attest_ir::Span;

/// A lexer error: what went wrong and where.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum LexErrorKind {
    /// Missing closing quote.
    UnterminatedString,
    /// Missing closing triple quote.
    UnterminatedTripleString,
    /// A character that starts no token.
    UnexpectedCharacter(char),
    /// Integer literal does not fit in 64 bits.
    IntOverflow,
    /// Float literal could not be parsed.
    InvalidFloat,
    /// Dedent to a column that matches no enclosing block.
    InconsistentDedent,
    /// Closing bracket without an opener.
    UnbalancedBracket(char),
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { span, kind }
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::UnterminatedString => f.write_str("EOL while scanning string literal"),
            LexErrorKind::UnterminatedTripleString => {
                f.write_str("EOF while scanning triple-quoted string literal")
            }
            LexErrorKind::UnexpectedCharacter(c) => write!(f, "unexpected character {c:?}"),
            LexErrorKind::IntOverflow => f.write_str("integer literal too large"),
            LexErrorKind::InvalidFloat => f.write_str("invalid float literal"),
            LexErrorKind::InconsistentDedent => {
                f.write_str("unindent does not match any outer indentation level")
            }
            LexErrorKind::UnbalancedBracket(c) => write!(f, "unmatched '{c}'"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.span)
    }
}

impl std::error::Error for LexError {}
