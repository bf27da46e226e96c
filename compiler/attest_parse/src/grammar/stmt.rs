//! Statement parsing.
//!
//! ```text
//! stmt        := compound | simple (';' simple)* [';'] NEWLINE
//! block       := ':' (simple_line | NEWLINE INDENT stmt+ DEDENT)
//! compound    := if | while | for | try | decorator* def
//! simple      := pass | break | continue | return | raise | assert
//!              | import | from_import | yield | expr_stmt
//! ```

use attest_ir::{
    Alias, BinaryOp, ExceptHandler, Expr, ExprKind, FunctionDef, Param, Params, Stmt, StmtKind,
    TokenKind,
};
use attest_stack::ensure_sufficient_stack;

use super::starts_expression;
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse one logical statement line (or compound statement) into `out`.
    pub(crate) fn parse_statement_into(&mut self, out: &mut Vec<Stmt>) -> Result<(), ParseError> {
        ensure_sufficient_stack(|| {
            let stmt = match self.cursor.current_kind() {
                TokenKind::If => self.parse_if()?,
                TokenKind::While => self.parse_while()?,
                TokenKind::For => self.parse_for()?,
                TokenKind::Try => self.parse_try()?,
                TokenKind::Def | TokenKind::At => self.parse_def()?,
                TokenKind::Indent => {
                    return Err(ParseError::new(
                        "unexpected indent",
                        self.cursor.current_span(),
                    ))
                }
                _ => return self.parse_simple_line(out),
            };
            out.push(stmt);
            Ok(())
        })
    }

    fn at_line_end(&self) -> bool {
        matches!(
            self.cursor.current_kind(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        )
    }

    fn parse_simple_line(&mut self, out: &mut Vec<Stmt>) -> Result<(), ParseError> {
        loop {
            out.push(self.parse_simple()?);
            if !self.cursor.eat(&TokenKind::Semicolon) {
                break;
            }
            if self.cursor.check(&TokenKind::Newline) || self.cursor.is_at_end() {
                break;
            }
        }
        if self.cursor.is_at_end() {
            return Ok(());
        }
        if !self.cursor.eat(&TokenKind::Newline) {
            return Err(ParseError::invalid_syntax(self.cursor.current_span()));
        }
        Ok(())
    }

    /// `':' block`. `function_body` marks the direct body of a `def`.
    fn parse_block(&mut self, function_body: bool) -> Result<Vec<Stmt>, ParseError> {
        self.cursor.expect(&TokenKind::Colon, "':'")?;
        self.with_context(
            |ctx| ctx.function_body = function_body,
            |p| {
                let mut body = Vec::new();
                if !p.cursor.eat(&TokenKind::Newline) {
                    p.parse_simple_line(&mut body)?;
                    return Ok(body);
                }
                if !p.cursor.eat(&TokenKind::Indent) {
                    return Err(ParseError::new(
                        "expected an indented block",
                        p.cursor.current_span(),
                    ));
                }
                while !p.cursor.eat(&TokenKind::Dedent) {
                    if p.cursor.is_at_end() {
                        break;
                    }
                    p.parse_statement_into(&mut body)?;
                }
                Ok(body)
            },
        )
    }

    fn parse_loop_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.with_context(|ctx| ctx.loop_depth += 1, |p| p.parse_block(false))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        // Called on `if` or `elif`.
        let start = self.cursor.advance().span;
        let test = self.parse_test()?;
        let body = self.parse_block(false)?;
        let orelse = match self.cursor.current_kind() {
            TokenKind::Elif => vec![self.parse_if()?],
            TokenKind::Else => {
                self.cursor.advance();
                self.parse_block(false)?
            }
            _ => Vec::new(),
        };
        Ok(Stmt::new(
            StmtKind::If { test, body, orelse },
            self.cursor.span_from(start),
        ))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::While, "'while'")?;
        let test = self.parse_test()?;
        let body = self.parse_loop_body()?;
        Ok(Stmt::new(
            StmtKind::While { test, body },
            self.cursor.span_from(start),
        ))
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::For, "'for'")?;
        let target = self.parse_target_list()?;
        self.cursor.expect(&TokenKind::In, "'in'")?;
        let iter = self.parse_testlist()?;
        let body = self.parse_loop_body()?;
        Ok(Stmt::new(
            StmtKind::For { target, iter, body },
            self.cursor.span_from(start),
        ))
    }

    /// Assignment target list of `for` loops and comprehensions.
    pub(crate) fn parse_target_list(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        let first = self.parse_arith()?;
        let target = if self.cursor.check(&TokenKind::Comma) {
            let mut items = vec![first];
            while self.cursor.eat(&TokenKind::Comma) {
                if self.cursor.check(&TokenKind::In) {
                    break;
                }
                items.push(self.parse_arith()?);
            }
            Expr::new(ExprKind::Tuple(items), self.cursor.span_from(start))
        } else {
            first
        };
        check_target(&target)?;
        Ok(target)
    }

    fn parse_try(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::Try, "'try'")?;
        let body = self.parse_block(false)?;
        let mut handlers = Vec::new();
        while self.cursor.check(&TokenKind::Except) {
            let handler_start = self.cursor.advance().span;
            let (type_, name) = if self.cursor.check(&TokenKind::Colon) {
                (None, None)
            } else {
                let type_ = self.parse_test()?;
                let name = if self.cursor.eat(&TokenKind::As) {
                    Some(self.cursor.expect_ident("exception name")?.0)
                } else {
                    None
                };
                (Some(type_), name)
            };
            let handler_body = self.parse_block(false)?;
            handlers.push(ExceptHandler {
                type_,
                name,
                body: handler_body,
                span: self.cursor.span_from(handler_start),
            });
        }
        let finalbody = if self.cursor.eat(&TokenKind::Finally) {
            self.parse_block(false)?
        } else {
            Vec::new()
        };
        if handlers.is_empty() && finalbody.is_empty() {
            return Err(ParseError::new(
                "expected 'except' or 'finally' block",
                self.cursor.current_span(),
            ));
        }
        Ok(Stmt::new(
            StmtKind::Try {
                body,
                handlers,
                finalbody,
            },
            self.cursor.span_from(start),
        ))
    }

    fn parse_def(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        let mut decorators = Vec::new();
        while self.cursor.eat(&TokenKind::At) {
            decorators.push(self.parse_test()?);
            self.cursor.expect(&TokenKind::Newline, "newline after decorator")?;
        }
        self.cursor.expect(&TokenKind::Def, "'def'")?;
        let (name, _) = self.cursor.expect_ident("function name")?;
        self.cursor.expect(&TokenKind::LParen, "'('")?;
        let params = self.parse_params(&TokenKind::RParen)?;
        self.cursor.expect(&TokenKind::RParen, "')'")?;
        let body = self.with_context(
            |ctx| {
                ctx.in_function = true;
                ctx.loop_depth = 0;
            },
            |p| p.parse_block(true),
        )?;
        Ok(Stmt::new(
            StmtKind::FunctionDef(FunctionDef {
                name,
                params,
                body,
                decorators,
            }),
            self.cursor.span_from(start),
        ))
    }

    /// Parameter list up to (not including) `close`.
    pub(crate) fn parse_params(&mut self, close: &TokenKind) -> Result<Params, ParseError> {
        let mut params = Params::default();
        while !self.cursor.check(close) {
            let span = self.cursor.current_span();
            if params.kwarg.is_some() {
                return Err(ParseError::invalid_syntax(span));
            }
            if self.cursor.eat(&TokenKind::StarStar) {
                params.kwarg = Some(self.cursor.expect_ident("parameter name")?.0);
            } else if self.cursor.eat(&TokenKind::Star) {
                if params.vararg.is_some() {
                    return Err(ParseError::invalid_syntax(span));
                }
                params.vararg = Some(self.cursor.expect_ident("parameter name")?.0);
            } else {
                if params.vararg.is_some() {
                    return Err(ParseError::new(
                        "parameters after *args are not supported",
                        span,
                    ));
                }
                let (name, _) = self.cursor.expect_ident("parameter name")?;
                if params.args.iter().any(|p| p.name == name) {
                    return Err(ParseError::new(
                        format!("duplicate argument '{name}' in function definition"),
                        span,
                    ));
                }
                let default = if self.cursor.eat(&TokenKind::Eq) {
                    Some(self.parse_test()?)
                } else {
                    if params.args.iter().any(|p| p.default.is_some()) {
                        return Err(ParseError::new(
                            "non-default argument follows default argument",
                            span,
                        ));
                    }
                    None
                };
                params.args.push(Param { name, default });
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn parse_simple(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::Pass => {
                self.cursor.advance();
                StmtKind::Pass
            }
            TokenKind::Break | TokenKind::Continue => {
                let is_break = self.cursor.check(&TokenKind::Break);
                self.cursor.advance();
                if self.context.loop_depth == 0 {
                    let keyword = if is_break { "break" } else { "continue" };
                    return Err(ParseError::new(
                        format!("'{keyword}' outside loop"),
                        start,
                    ));
                }
                if is_break {
                    StmtKind::Break
                } else {
                    StmtKind::Continue
                }
            }
            TokenKind::Return => {
                self.cursor.advance();
                if !self.context.in_function {
                    return Err(ParseError::new("'return' outside function", start));
                }
                StmtKind::Return(self.parse_optional_testlist()?)
            }
            TokenKind::Raise => {
                self.cursor.advance();
                let exc = if self.at_line_end() {
                    None
                } else {
                    Some(self.parse_test()?)
                };
                StmtKind::Raise(exc)
            }
            TokenKind::Assert => {
                self.cursor.advance();
                let test = self.parse_test()?;
                let msg = if self.cursor.eat(&TokenKind::Comma) {
                    Some(self.parse_test()?)
                } else {
                    None
                };
                StmtKind::Assert { test, msg }
            }
            TokenKind::Yield => {
                self.cursor.advance();
                if !self.context.in_function {
                    return Err(ParseError::new("'yield' outside function", start));
                }
                if !self.context.function_body {
                    return Err(ParseError::new(
                        "'yield' must be a statement directly in the function body",
                        start,
                    ));
                }
                StmtKind::Yield(self.parse_optional_testlist()?)
            }
            TokenKind::Import => self.parse_import()?,
            TokenKind::From => self.parse_from_import()?,
            _ => self.parse_expr_stmt()?,
        };
        Ok(Stmt::new(kind, self.cursor.span_from(start)))
    }

    fn parse_optional_testlist(&mut self) -> Result<Option<Expr>, ParseError> {
        if self.at_line_end() {
            Ok(None)
        } else {
            self.parse_testlist().map(Some)
        }
    }

    fn parse_dotted_name(&mut self) -> Result<String, ParseError> {
        let (mut name, _) = self.cursor.expect_ident("module name")?;
        while self.cursor.eat(&TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.cursor.expect_ident("module name")?.0);
        }
        Ok(name)
    }

    fn parse_alias(&mut self, dotted: bool) -> Result<Alias, ParseError> {
        let name = if dotted {
            self.parse_dotted_name()?
        } else {
            self.cursor.expect_ident("name to import")?.0
        };
        let asname = if self.cursor.eat(&TokenKind::As) {
            Some(self.cursor.expect_ident("name")?.0)
        } else {
            None
        };
        Ok(Alias { name, asname })
    }

    fn parse_import(&mut self) -> Result<StmtKind, ParseError> {
        self.cursor.expect(&TokenKind::Import, "'import'")?;
        let mut names = vec![self.parse_alias(true)?];
        while self.cursor.eat(&TokenKind::Comma) {
            names.push(self.parse_alias(true)?);
        }
        Ok(StmtKind::Import(names))
    }

    fn parse_from_import(&mut self) -> Result<StmtKind, ParseError> {
        self.cursor.expect(&TokenKind::From, "'from'")?;
        let mut level = 0;
        while self.cursor.eat(&TokenKind::Dot) {
            level += 1;
        }
        let module = if self.cursor.check_ident() {
            Some(self.parse_dotted_name()?)
        } else {
            None
        };
        if module.is_none() && level == 0 {
            return Err(ParseError::expected(
                "module name",
                self.cursor.current_kind(),
                self.cursor.current_span(),
            ));
        }
        self.cursor.expect(&TokenKind::Import, "'import'")?;
        if self.cursor.check(&TokenKind::Star) {
            return Err(ParseError::new(
                "wildcard imports are not supported",
                self.cursor.current_span(),
            ));
        }
        let parenthesized = self.cursor.eat(&TokenKind::LParen);
        let mut names = vec![self.parse_alias(false)?];
        while self.cursor.eat(&TokenKind::Comma) {
            if parenthesized && self.cursor.check(&TokenKind::RParen) {
                break;
            }
            names.push(self.parse_alias(false)?);
        }
        if parenthesized {
            self.cursor.expect(&TokenKind::RParen, "')'")?;
        }
        Ok(StmtKind::ImportFrom {
            module,
            names,
            level,
        })
    }

    fn augmented_op(&self) -> Option<BinaryOp> {
        let op = match self.cursor.current_kind() {
            TokenKind::PlusEq => BinaryOp::Add,
            TokenKind::MinusEq => BinaryOp::Sub,
            TokenKind::StarEq => BinaryOp::Mul,
            TokenKind::SlashEq => BinaryOp::Div,
            TokenKind::SlashSlashEq => BinaryOp::FloorDiv,
            TokenKind::PercentEq => BinaryOp::Mod,
            TokenKind::StarStarEq => BinaryOp::Pow,
            _ => return None,
        };
        Some(op)
    }

    fn parse_expr_stmt(&mut self) -> Result<StmtKind, ParseError> {
        if !starts_expression(self.cursor.current_kind()) {
            return Err(ParseError::invalid_syntax(self.cursor.current_span()));
        }
        let first = self.parse_testlist()?;

        if let Some(op) = self.augmented_op() {
            if !matches!(
                first.kind,
                ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. }
            ) {
                return Err(ParseError::new(
                    "illegal expression for augmented assignment",
                    first.span,
                ));
            }
            self.cursor.advance();
            let value = self.parse_testlist()?;
            return Ok(StmtKind::AugAssign {
                target: first,
                op,
                value,
            });
        }

        if !self.cursor.check(&TokenKind::Eq) {
            return Ok(StmtKind::Expr(first));
        }
        let mut exprs = vec![first];
        while self.cursor.eat(&TokenKind::Eq) {
            exprs.push(self.parse_testlist()?);
        }
        let value = exprs.pop().ok_or_else(|| {
            ParseError::invalid_syntax(self.cursor.current_span())
        })?;
        for target in &exprs {
            check_target(target)?;
        }
        Ok(StmtKind::Assign {
            targets: exprs,
            value,
        })
    }
}

fn check_target(target: &Expr) -> Result<(), ParseError> {
    if target.is_assignable() {
        return Ok(());
    }
    let what = match &target.kind {
        ExprKind::Call { .. } => "function call",
        ExprKind::None
        | ExprKind::Bool(_)
        | ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_) => "literal",
        _ => "expression",
    };
    Err(ParseError::new(
        format!("can't assign to {what}"),
        target.span,
    ))
}
