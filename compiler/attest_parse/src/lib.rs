//! Recursive descent parser for attest scripts.
//!
//! Two entry points:
//! - [`parse_module`]: a whole program unit
//! - [`parse_expression`]: a single expression (used to re-parse the
//!   condition text handed to the assertion check)

mod cursor;
mod error;
mod grammar;

use attest_ir::{Expr, Module, TokenKind};

pub use cursor::Cursor;
pub use error::ParseError;

/// Statement-level context that decides which statements are legal.
#[derive(Clone, Copy, Debug, Default)]
struct Context {
    in_function: bool,
    loop_depth: u32,
    /// The block being parsed is the direct body of a function.
    function_body: bool,
}

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    context: Context,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [attest_ir::Token]) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            context: Context::default(),
        }
    }

    /// Run `f` with a modified context, restoring the previous one after.
    fn with_context<T>(
        &mut self,
        update: impl FnOnce(&mut Context),
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved = self.context;
        update(&mut self.context);
        let result = f(self);
        self.context = saved;
        result
    }

    /// Parse statements until end of input.
    pub fn parse_module(&mut self) -> Result<Module, ParseError> {
        let mut body = Vec::new();
        loop {
            match self.cursor.current_kind() {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.cursor.advance();
                }
                _ => self.parse_statement_into(&mut body)?,
            }
        }
        Ok(Module::new(body))
    }
}

/// Parse a complete program unit.
pub fn parse_module(source: &str) -> Result<Module, ParseError> {
    let tokens = attest_lexer::lex(source)?;
    Parser::new(&tokens).parse_module()
}

/// Parse a single expression. Surrounding whitespace is ignored; a bare
/// comma-separated list parses as a tuple.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let tokens = attest_lexer::lex(source.trim())?;
    let mut parser = Parser::new(&tokens);
    if parser.cursor.check(&TokenKind::Newline) || parser.cursor.is_at_end() {
        return Err(ParseError::new(
            "unexpected EOF while parsing",
            parser.cursor.current_span(),
        ));
    }
    let expr = parser.parse_testlist()?;
    while parser.cursor.eat(&TokenKind::Newline) {}
    if !parser.cursor.is_at_end() {
        return Err(ParseError::invalid_syntax(parser.cursor.current_span()));
    }
    Ok(expr)
}
