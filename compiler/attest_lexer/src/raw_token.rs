//! Raw tokens produced by logos, before layout and value cooking.

use logos::Logos;

/// Raw token from logos.
///
/// Horizontal whitespace is skipped here; indentation is recovered by the
/// cooker from the source text in front of the first token on each line.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\x0C]+")]
pub(crate) enum RawToken {
    #[regex(r"#[^\n]*")]
    Comment,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"\\\r?\n")]
    LineContinuation,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9][0-9_]*")]
    Int,
    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*")]
    HexInt,
    #[regex(r"0[oO][0-7][0-7_]*")]
    OctInt,
    #[regex(r"0[bB][01][01_]*")]
    BinInt,

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+")]
    Float,

    #[regex(r#"[rR]?"([^"\\\n]|\\[^\r\n]|\\\r?\n)*""#)]
    #[regex(r#"[rR]?'([^'\\\n]|\\[^\r\n]|\\\r?\n)*'"#)]
    Str,

    #[regex(r#"[rR]?""""#, triple_quoted)]
    #[regex(r"[rR]?'''", triple_quoted)]
    TripleStr,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,
    #[token("@")]
    At,

    // Assignment
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("//=")]
    SlashSlashEq,
    #[token("%=")]
    PercentEq,
    #[token("**=")]
    StarStarEq,

    // Operators
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    SlashSlash,
    #[token("%")]
    Percent,
    #[token("**")]
    StarStar,
}

/// Scan to the closing delimiter of a triple-quoted string.
///
/// The matched prefix ends with the three opening quotes; the closing
/// delimiter must be the same three characters.
fn triple_quoted(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    let slice = lex.slice().as_bytes();
    let quote = &slice[slice.len() - 3..];
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rest.len() {
        if rest[i] == b'\\' {
            i += 2;
            continue;
        }
        if rest[i..].starts_with(quote) {
            lex.bump(i + 3);
            return true;
        }
        i += 1;
    }
    false
}
