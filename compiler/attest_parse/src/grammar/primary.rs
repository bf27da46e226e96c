//! Atoms, trailers and displays.
//!
//! ```text
//! postfix  := atom trailer*
//! trailer  := '(' arglist ')' | '[' subscript ']' | '.' NAME
//! atom     := NAME | NUMBER | STRING+ | None | True | False
//!           | '(' [test (comp_for | (',' test)* [','])] ')'
//!           | '[' [test (comp_for | (',' test)* [','])] ']'
//!           | '{' [test ':' test (',' test ':' test)* [',']] '}'
//! comp_for := ('for' targets 'in' or_test ('if' or_test)*)+
//! ```

use attest_ir::{Comprehension, Expr, ExprKind, Keyword, Span, TokenKind};

use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        let mut expr = self.parse_atom()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::LParen => {
                    self.cursor.advance();
                    expr = self.parse_call(expr, start)?;
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = self.parse_subscript()?;
                    self.cursor.expect(&TokenKind::RBracket, "']'")?;
                    expr = Expr::new(
                        ExprKind::Subscript {
                            value: Box::new(expr),
                            index: Box::new(index),
                        },
                        self.cursor.span_from(start),
                    );
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let (attr, _) = self.cursor.expect_ident("attribute name")?;
                    expr = Expr::new(
                        ExprKind::Attribute {
                            value: Box::new(expr),
                            attr,
                        },
                        self.cursor.span_from(start),
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Arguments after `(`; consumes the closing `)`.
    fn parse_call(&mut self, func: Expr, start: Span) -> Result<Expr, ParseError> {
        let mut args = Vec::new();
        let mut keywords: Vec<Keyword> = Vec::new();
        let mut starargs = None;
        let mut kwargs = None;

        while !self.cursor.check(&TokenKind::RParen) {
            let arg_span = self.cursor.current_span();
            match self.cursor.current_kind() {
                TokenKind::StarStar => {
                    self.cursor.advance();
                    if kwargs.is_some() {
                        return Err(ParseError::new("duplicate ** argument", arg_span));
                    }
                    kwargs = Some(Box::new(self.parse_test()?));
                }
                TokenKind::Star => {
                    self.cursor.advance();
                    if starargs.is_some() || kwargs.is_some() {
                        return Err(ParseError::invalid_syntax(arg_span));
                    }
                    starargs = Some(Box::new(self.parse_test()?));
                }
                TokenKind::Ident(name) if matches!(self.cursor.peek_kind(1), TokenKind::Eq) => {
                    self.cursor.advance();
                    self.cursor.advance();
                    if keywords.iter().any(|k| k.name == *name) {
                        return Err(ParseError::new(
                            format!("keyword argument repeated: {name}"),
                            arg_span,
                        ));
                    }
                    let value = self.parse_test()?;
                    keywords.push(Keyword {
                        name: name.clone(),
                        value,
                    });
                }
                _ => {
                    if !keywords.is_empty() || starargs.is_some() || kwargs.is_some() {
                        return Err(ParseError::new(
                            "positional argument follows keyword argument",
                            arg_span,
                        ));
                    }
                    let arg = self.parse_test()?;
                    if self.cursor.check(&TokenKind::For) {
                        let generators = self.parse_comprehension()?;
                        args.push(Expr::new(
                            ExprKind::GeneratorExp {
                                elt: Box::new(arg),
                                generators,
                            },
                            self.cursor.span_from(arg_span),
                        ));
                        if !self.cursor.check(&TokenKind::RParen) || args.len() > 1 {
                            return Err(ParseError::new(
                                "generator expression must be parenthesized",
                                arg_span,
                            ));
                        }
                        break;
                    }
                    args.push(arg);
                }
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen, "')'")?;

        Ok(Expr::new(
            ExprKind::Call {
                func: Box::new(func),
                args,
                keywords,
                starargs,
                kwargs,
            },
            self.cursor.span_from(start),
        ))
    }

    /// `index` or `[lower]:[upper][:[step]]`.
    fn parse_subscript(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        let lower = if self.cursor.check(&TokenKind::Colon) {
            None
        } else {
            let index = self.parse_testlist()?;
            if !self.cursor.check(&TokenKind::Colon) {
                return Ok(index);
            }
            Some(Box::new(index))
        };
        self.cursor.expect(&TokenKind::Colon, "':'")?;
        let upper = self.parse_slice_bound()?;
        let step = if self.cursor.eat(&TokenKind::Colon) {
            self.parse_slice_bound()?
        } else {
            None
        };
        Ok(Expr::new(
            ExprKind::Slice { lower, upper, step },
            self.cursor.span_from(start),
        ))
    }

    fn parse_slice_bound(&mut self) -> Result<Option<Box<Expr>>, ParseError> {
        if self.cursor.check(&TokenKind::RBracket) || self.cursor.check(&TokenKind::Colon) {
            return Ok(None);
        }
        Ok(Some(Box::new(self.parse_test()?)))
    }

    /// One or more `for ... in ... [if ...]` clauses.
    pub(crate) fn parse_comprehension(&mut self) -> Result<Vec<Comprehension>, ParseError> {
        let mut generators = Vec::new();
        while self.cursor.eat(&TokenKind::For) {
            let target = self.parse_target_list()?;
            self.cursor.expect(&TokenKind::In, "'in'")?;
            let iter = self.parse_or_test()?;
            let mut ifs = Vec::new();
            while self.cursor.eat(&TokenKind::If) {
                ifs.push(self.parse_or_test()?);
            }
            generators.push(Comprehension { target, iter, ifs });
        }
        Ok(generators)
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let token = self.cursor.current();
        let span = token.span;
        let kind = match &token.kind {
            TokenKind::Ident(name) => ExprKind::Name(name.clone()),
            TokenKind::Int(value) => ExprKind::Int(*value),
            TokenKind::Float(bits) => ExprKind::Float(*bits),
            TokenKind::None => ExprKind::None,
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Str(_) => return Ok(self.parse_strings()),
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::LBracket => return self.parse_list(),
            TokenKind::LBrace => return self.parse_dict(),
            TokenKind::Newline | TokenKind::Eof => {
                return Err(ParseError::new("unexpected EOF while parsing", span))
            }
            _ => return Err(ParseError::invalid_syntax(span)),
        };
        self.cursor.advance();
        Ok(Expr::new(kind, span))
    }

    /// Adjacent string literals concatenate.
    fn parse_strings(&mut self) -> Expr {
        let start = self.cursor.current_span();
        let mut value = String::new();
        while let TokenKind::Str(part) = self.cursor.current_kind() {
            value.push_str(part);
            self.cursor.advance();
        }
        Expr::new(ExprKind::Str(value), self.cursor.span_from(start))
    }

    fn parse_paren(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.expect(&TokenKind::LParen, "'('")?;
        if self.cursor.eat(&TokenKind::RParen) {
            return Ok(Expr::new(
                ExprKind::Tuple(Vec::new()),
                self.cursor.span_from(start),
            ));
        }
        let first = self.parse_test()?;
        if self.cursor.check(&TokenKind::For) {
            let generators = self.parse_comprehension()?;
            self.cursor.expect(&TokenKind::RParen, "')'")?;
            return Ok(Expr::new(
                ExprKind::GeneratorExp {
                    elt: Box::new(first),
                    generators,
                },
                self.cursor.span_from(start),
            ));
        }
        if !self.cursor.check(&TokenKind::Comma) {
            self.cursor.expect(&TokenKind::RParen, "')'")?;
            return Ok(first);
        }
        let items = self.parse_display_tail(first, &TokenKind::RParen)?;
        Ok(Expr::new(ExprKind::Tuple(items), self.cursor.span_from(start)))
    }

    fn parse_list(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.expect(&TokenKind::LBracket, "'['")?;
        if self.cursor.eat(&TokenKind::RBracket) {
            return Ok(Expr::new(
                ExprKind::List(Vec::new()),
                self.cursor.span_from(start),
            ));
        }
        let first = self.parse_test()?;
        if self.cursor.check(&TokenKind::For) {
            let generators = self.parse_comprehension()?;
            self.cursor.expect(&TokenKind::RBracket, "']'")?;
            return Ok(Expr::new(
                ExprKind::ListComp {
                    elt: Box::new(first),
                    generators,
                },
                self.cursor.span_from(start),
            ));
        }
        let items = self.parse_display_tail(first, &TokenKind::RBracket)?;
        Ok(Expr::new(ExprKind::List(items), self.cursor.span_from(start)))
    }

    /// Remaining `, item` entries of a display; consumes the closer.
    fn parse_display_tail(
        &mut self,
        first: Expr,
        close: &TokenKind,
    ) -> Result<Vec<Expr>, ParseError> {
        let mut items = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            if self.cursor.check(close) {
                break;
            }
            items.push(self.parse_test()?);
        }
        self.cursor.expect(close, close.display_name())?;
        Ok(items)
    }

    fn parse_dict(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.expect(&TokenKind::LBrace, "'{'")?;
        let mut entries = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let key = self.parse_test()?;
            self.cursor.expect(&TokenKind::Colon, "':'")?;
            let value = self.parse_test()?;
            entries.push((key, value));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RBrace, "'}'")?;
        Ok(Expr::new(ExprKind::Dict(entries), self.cursor.span_from(start)))
    }
}
