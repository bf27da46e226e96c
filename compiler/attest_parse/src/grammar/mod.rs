//! Grammar Modules
//!
//! Each module extends `Parser` with methods for one group of productions:
//!
//! - [`stmt`]: simple and compound statements, blocks, imports, `def`
//! - [`expr`]: operator precedence climbing from `lambda` down to `**`
//! - [`primary`]: atoms and trailers (calls, subscripts, attributes),
//!   displays and comprehensions

mod expr;
mod primary;
mod stmt;

use attest_ir::TokenKind;

/// Whether a token can begin an expression.
pub(crate) fn starts_expression(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::None
            | TokenKind::True
            | TokenKind::False
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Not
            | TokenKind::Lambda
    )
}
