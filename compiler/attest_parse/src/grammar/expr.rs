//! Expression parsing, lowest precedence first.
//!
//! ```text
//! testlist   := test (',' test)* [',']
//! test       := or_test ['if' or_test 'else' test] | lambda
//! or_test    := and_test ('or' and_test)*
//! and_test   := not_test ('and' not_test)*
//! not_test   := 'not' not_test | comparison
//! comparison := arith (comp_op arith)*
//! arith      := term (('+'|'-') term)*
//! term       := factor (('*'|'/'|'//'|'%') factor)*
//! factor     := ('+'|'-') factor | power
//! power      := postfix ['**' factor]
//! ```

use attest_ir::{BinaryOp, BoolOp, CmpOp, Expr, ExprKind, Span, TokenKind, UnaryOp};
use attest_stack::ensure_sufficient_stack;

use super::starts_expression;
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// A comma-separated list; more than one item (or a trailing comma)
    /// makes a tuple.
    pub(crate) fn parse_testlist(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        let first = self.parse_test()?;
        if !self.cursor.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            if !starts_expression(self.cursor.current_kind()) {
                break;
            }
            items.push(self.parse_test()?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), self.cursor.span_from(start)))
    }

    pub(crate) fn parse_test(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| {
            if self.cursor.check(&TokenKind::Lambda) {
                return self.parse_lambda();
            }
            let start = self.cursor.current_span();
            let body = self.parse_or_test()?;
            if !self.cursor.eat(&TokenKind::If) {
                return Ok(body);
            }
            let test = self.parse_or_test()?;
            self.cursor.expect(&TokenKind::Else, "'else'")?;
            let orelse = self.parse_test()?;
            Ok(Expr::new(
                ExprKind::IfExp {
                    test: Box::new(test),
                    body: Box::new(body),
                    orelse: Box::new(orelse),
                },
                self.cursor.span_from(start),
            ))
        })
    }

    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.expect(&TokenKind::Lambda, "'lambda'")?;
        let params = self.parse_params(&TokenKind::Colon)?;
        self.cursor.expect(&TokenKind::Colon, "':'")?;
        let body = self.parse_test()?;
        Ok(Expr::new(
            ExprKind::Lambda {
                params,
                body: Box::new(body),
            },
            self.cursor.span_from(start),
        ))
    }

    pub(crate) fn parse_or_test(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        let first = self.parse_and_test()?;
        if !self.cursor.check(&TokenKind::Or) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.cursor.eat(&TokenKind::Or) {
            values.push(self.parse_and_test()?);
        }
        Ok(bool_op(BoolOp::Or, values, self.cursor.span_from(start)))
    }

    fn parse_and_test(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        let first = self.parse_not_test()?;
        if !self.cursor.check(&TokenKind::And) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.cursor.eat(&TokenKind::And) {
            values.push(self.parse_not_test()?);
        }
        Ok(bool_op(BoolOp::And, values, self.cursor.span_from(start)))
    }

    fn parse_not_test(&mut self) -> Result<Expr, ParseError> {
        if self.cursor.check(&TokenKind::Not) {
            let start = self.cursor.advance().span;
            let operand = ensure_sufficient_stack(|| self.parse_not_test())?;
            return Ok(unary(UnaryOp::Not, operand, self.cursor.span_from(start)));
        }
        self.parse_comparison()
    }

    fn comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.cursor.current_kind() {
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::NotEq => CmpOp::NotEq,
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::LtEq => CmpOp::LtEq,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::GtEq => CmpOp::GtEq,
            TokenKind::In => CmpOp::In,
            TokenKind::Not if matches!(self.cursor.peek_kind(1), TokenKind::In) => {
                self.cursor.advance();
                CmpOp::NotIn
            }
            TokenKind::Is if matches!(self.cursor.peek_kind(1), TokenKind::Not) => {
                self.cursor.advance();
                CmpOp::IsNot
            }
            TokenKind::Is => CmpOp::Is,
            _ => return None,
        };
        self.cursor.advance();
        Some(op)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        let left = self.parse_arith()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some(op) = self.comparison_op() {
            ops.push(op);
            comparators.push(self.parse_arith()?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
                comparators,
            },
            self.cursor.span_from(start),
        ))
    }

    /// `+`/`-` level. Also the level used for assignment targets in `for`
    /// loops and comprehensions, so `in` is never consumed there.
    pub(crate) fn parse_arith(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        let mut left = self.parse_term()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_term()?;
            left = binary(op, left, right, self.cursor.span_from(start));
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::SlashSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_factor()?;
            left = binary(op, left, right, self.cursor.span_from(start));
        }
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let op = match self.cursor.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            _ => return self.parse_power(),
        };
        let start = self.cursor.advance().span;
        let operand = ensure_sufficient_stack(|| self.parse_factor())?;
        Ok(unary(op, operand, self.cursor.span_from(start)))
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        let base = self.parse_postfix()?;
        if !self.cursor.eat(&TokenKind::StarStar) {
            return Ok(base);
        }
        let exponent = ensure_sufficient_stack(|| self.parse_factor())?;
        Ok(binary(
            BinaryOp::Pow,
            base,
            exponent,
            self.cursor.span_from(start),
        ))
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, span: Span) -> Expr {
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

fn bool_op(op: BoolOp, values: Vec<Expr>, span: Span) -> Expr {
    Expr::new(ExprKind::BoolOp { op, values }, span)
}

fn unary(op: UnaryOp, operand: Expr, span: Span) -> Expr {
    Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        span,
    )
}
