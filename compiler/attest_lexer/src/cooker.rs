//! Token cooking layer.
//!
//! Turns the raw logos stream into parser-ready tokens:
//!
//! ```text
//! source → RawToken (logos) → Cooker → Token { kind, span }
//! ```
//!
//! The cooker owns everything that depends on line structure:
//! - `Newline` at the end of each logical line (never inside brackets)
//! - `Indent`/`Dedent` from the leading whitespace of each logical line
//! - blank and comment-only lines are dropped
//!
//! and cooks token values: keyword resolution, numeric parsing, string
//! unescaping.

use attest_ir::{Span, Token, TokenKind};
use logos::Logos;

use crate::escape::unescape_string;
use crate::lex_error::{LexError, LexErrorKind};
use crate::line_index::{to_u32, LineIndex};
use crate::raw_token::RawToken;

const TAB_WIDTH: u32 = 8;

pub(crate) struct Cooker<'src> {
    source: &'src str,
    lines: LineIndex,
    tokens: Vec<Token>,
    indents: Vec<u32>,
    brackets: Vec<char>,
    /// No token has been emitted on the current logical line yet.
    at_line_start: bool,
}

impl<'src> Cooker<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Cooker {
            source,
            lines: LineIndex::new(source),
            tokens: Vec::new(),
            indents: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
        }
    }

    pub(crate) fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut lexer = RawToken::lexer(self.source);
        while let Some(raw) = lexer.next() {
            let range = lexer.span();
            let span = self.span(range.start, range.end);
            let raw = match raw {
                Ok(raw) => raw,
                Err(()) => return Err(self.raw_error(lexer.slice(), span)),
            };
            match raw {
                RawToken::Comment | RawToken::LineContinuation => {}
                RawToken::Newline => {
                    if self.brackets.is_empty() && !self.at_line_start {
                        self.tokens.push(Token::new(TokenKind::Newline, span));
                        self.at_line_start = true;
                    }
                }
                raw => {
                    if self.at_line_start && self.brackets.is_empty() {
                        self.layout(span)?;
                    }
                    self.at_line_start = false;
                    let kind = self.cook(raw, lexer.slice(), span)?;
                    self.tokens.push(Token::new(kind, span));
                }
            }
        }
        self.finish();
        Ok(self.tokens)
    }

    fn span(&self, start: usize, end: usize) -> Span {
        let start = to_u32(start);
        let (line, col) = self.lines.line_col(self.source, start);
        Span::new(start, to_u32(end), line, col)
    }

    fn raw_error(&self, slice: &str, span: Span) -> LexError {
        let first = slice.trim_start_matches(['r', 'R']).chars().next();
        let kind = match first {
            Some('"' | '\'') if slice.contains("\"\"\"") || slice.contains("'''") => {
                LexErrorKind::UnterminatedTripleString
            }
            Some('"' | '\'') => LexErrorKind::UnterminatedString,
            Some(c) => LexErrorKind::UnexpectedCharacter(c),
            None => LexErrorKind::UnexpectedCharacter('\0'),
        };
        LexError::new(kind, span)
    }

    /// Emit `Indent`/`Dedent` for the first token of a logical line.
    fn layout(&mut self, span: Span) -> Result<(), LexError> {
        let line_start = self.lines.line_start(span.start) as usize;
        let prefix = self
            .source
            .get(line_start..span.start as usize)
            .unwrap_or_default();
        let width = indentation_width(prefix);
        let current = self.indents.last().copied().unwrap_or(0);
        let marker = Span::new(span.start, span.start, span.line, span.col);

        if width > current {
            self.indents.push(width);
            self.tokens.push(Token::new(TokenKind::Indent, marker));
        } else {
            while width < self.indents.last().copied().unwrap_or(0) {
                self.indents.pop();
                self.tokens.push(Token::new(TokenKind::Dedent, marker));
            }
            if width != self.indents.last().copied().unwrap_or(0) {
                return Err(LexError::new(LexErrorKind::InconsistentDedent, span));
            }
        }
        Ok(())
    }

    fn finish(&mut self) {
        let end = to_u32(self.source.len());
        let (line, col) = self.lines.line_col(self.source, end);
        let eof = Span::new(end, end, line, col);
        if !self.at_line_start {
            self.tokens.push(Token::new(TokenKind::Newline, eof));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, eof));
        }
        self.tokens.push(Token::new(TokenKind::Eof, eof));
    }

    fn open(&mut self, close: char) {
        self.brackets.push(close);
    }

    fn close(&mut self, close: char, span: Span) -> Result<(), LexError> {
        if self.brackets.pop() == Some(close) {
            Ok(())
        } else {
            Err(LexError::new(LexErrorKind::UnbalancedBracket(close), span))
        }
    }

    fn cook(&mut self, raw: RawToken, slice: &str, span: Span) -> Result<TokenKind, LexError> {
        let kind = match raw {
            RawToken::Ident => {
                TokenKind::keyword(slice).unwrap_or_else(|| TokenKind::Ident(slice.to_string()))
            }
            RawToken::Int => parse_int(slice, 10, span)?,
            RawToken::HexInt => parse_int(&slice[2..], 16, span)?,
            RawToken::OctInt => parse_int(&slice[2..], 8, span)?,
            RawToken::BinInt => parse_int(&slice[2..], 2, span)?,
            RawToken::Float => {
                let cleaned: String = slice.chars().filter(|&c| c != '_').collect();
                let value: f64 = cleaned
                    .parse()
                    .map_err(|_| LexError::new(LexErrorKind::InvalidFloat, span))?;
                TokenKind::Float(value.to_bits())
            }
            RawToken::Str => TokenKind::Str(cook_string(slice, 1)),
            RawToken::TripleStr => TokenKind::Str(cook_string(slice, 3)),
            RawToken::LParen => {
                self.open(')');
                TokenKind::LParen
            }
            RawToken::LBracket => {
                self.open(']');
                TokenKind::LBracket
            }
            RawToken::LBrace => {
                self.open('}');
                TokenKind::LBrace
            }
            RawToken::RParen => {
                self.close(')', span)?;
                TokenKind::RParen
            }
            RawToken::RBracket => {
                self.close(']', span)?;
                TokenKind::RBracket
            }
            RawToken::RBrace => {
                self.close('}', span)?;
                TokenKind::RBrace
            }
            RawToken::Comma => TokenKind::Comma,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::At => TokenKind::At,
            RawToken::Eq => TokenKind::Eq,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::SlashSlashEq => TokenKind::SlashSlashEq,
            RawToken::PercentEq => TokenKind::PercentEq,
            RawToken::StarStarEq => TokenKind::StarStarEq,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::Gt => TokenKind::Gt,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::SlashSlash => TokenKind::SlashSlash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::StarStar => TokenKind::StarStar,
            RawToken::Comment | RawToken::Newline | RawToken::LineContinuation => {
                TokenKind::Newline
            }
        };
        Ok(kind)
    }
}

fn parse_int(digits: &str, radix: u32, span: Span) -> Result<TokenKind, LexError> {
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    i64::from_str_radix(&cleaned, radix)
        .map(TokenKind::Int)
        .map_err(|_| LexError::new(LexErrorKind::IntOverflow, span))
}

/// Strip prefix and quotes, then unescape unless raw.
fn cook_string(slice: &str, quote_len: usize) -> String {
    let raw = slice.starts_with(['r', 'R']);
    let body = if raw { &slice[1..] } else { slice };
    let inner = body
        .get(quote_len..body.len().saturating_sub(quote_len))
        .unwrap_or_default();
    if raw {
        inner.to_string()
    } else {
        unescape_string(inner)
    }
}

/// Column width of leading whitespace. Tabs advance to the next multiple of
/// eight; a form feed resets the count.
fn indentation_width(prefix: &str) -> u32 {
    let mut width = 0;
    for c in prefix.chars() {
        match c {
            '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
            '\x0C' => width = 0,
            _ => width += 1,
        }
    }
    width
}

#[cfg(test)]
mod tests;
