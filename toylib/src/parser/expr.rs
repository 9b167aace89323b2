use crate::ast::{Expr, InfixOp, PrefixOp};
use crate::token::TokenKind;

use super::Parser;

/// Binding power of operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

impl Precedence {
    /// Precedence of `kind` in infix position. Tokens that are not infix
    /// operators get `Lowest`, which ends the climb.
    pub fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::EqEq | TokenKind::Neq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Star | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

fn infix_op(kind: TokenKind) -> Option<InfixOp> {
    let op = match kind {
        TokenKind::Plus => InfixOp::Add,
        TokenKind::Minus => InfixOp::Sub,
        TokenKind::Star => InfixOp::Mul,
        TokenKind::Slash => InfixOp::Div,
        TokenKind::EqEq => InfixOp::Eq,
        TokenKind::Neq => InfixOp::NotEq,
        TokenKind::Lt => InfixOp::Lt,
        TokenKind::Gt => InfixOp::Gt,
        _ => return None,
    };
    Some(op)
}

impl Parser {
    /// Precedence climbing: parse a primary term, then keep folding infix
    /// operators that bind tighter than `min`. The right operand is parsed
    /// at the operator's own precedence, so equal-precedence chains group to
    /// the left.
    pub(super) fn parse_expression(&mut self, min: Precedence) -> Option<Expr> {
        self.nested(|p| p.parse_expression_at(min))
    }

    fn parse_expression_at(&mut self, min: Precedence) -> Option<Expr> {
        let mut left = self.parse_primary()?;
        let mut height = self.height;

        loop {
            let prec = Precedence::of(self.cur.kind);
            if prec <= min {
                break;
            }
            if self.at(TokenKind::LParen) {
                left = self.parse_call(left, height)?;
                height = self.height;
                continue;
            }
            let Some(op) = infix_op(self.cur.kind) else {
                break;
            };
            let span = self.advance().span;
            let right = self.parse_expression(prec)?;
            self.set_height(height.max(self.height) + 1, span)?;
            height = self.height;
            left = Expr::Infix {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        self.height = height;
        Some(left)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        match self.cur.kind {
            TokenKind::Int => {
                let literal = self.cur.literal.clone();
                match literal.parse::<i64>() {
                    Ok(value) => {
                        self.advance();
                        self.height = 1;
                        Some(Expr::Int(value))
                    }
                    Err(_) => {
                        self.diagnostics.error(
                            format!("could not parse `{literal}` as integer"),
                            self.cur.span,
                        );
                        None
                    }
                }
            }
            TokenKind::Str => {
                self.height = 1;
                Some(Expr::Str(self.advance().literal))
            }
            TokenKind::KwTrue => {
                self.advance();
                self.height = 1;
                Some(Expr::Bool(true))
            }
            TokenKind::KwFalse => {
                self.advance();
                self.height = 1;
                Some(Expr::Bool(false))
            }
            TokenKind::Ident => {
                self.height = 1;
                Some(Expr::Ident(self.advance().literal))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RParen, "Expected `)` after grouped expression")?;
                Some(expr)
            }
            TokenKind::Minus | TokenKind::Bang => {
                let op = if self.at(TokenKind::Minus) {
                    PrefixOp::Neg
                } else {
                    PrefixOp::Not
                };
                let span = self.advance().span;
                let right = self.parse_expression(Precedence::Prefix)?;
                self.set_height(self.height + 1, span)?;
                Some(Expr::Prefix {
                    op,
                    right: Box::new(right),
                })
            }
            TokenKind::KwFn => self.parse_function_literal(),
            TokenKind::Illegal => {
                let message = format!("Illegal token `{}`", self.cur.literal);
                self.diagnostics.error(message, self.cur.span);
                None
            }
            _ => {
                self.error_here_expected("Expected expression");
                None
            }
        }
    }

    fn parse_call(&mut self, callee: Expr, callee_height: usize) -> Option<Expr> {
        let span = self.cur.span;
        self.expect(TokenKind::LParen, "Expected `(` to start call arguments")?;
        let mut args = Vec::new();
        let mut tallest = callee_height;
        if !self.at(TokenKind::RParen) {
            loop {
                if self.at(TokenKind::Comma) {
                    self.error_here_expected("Expected expression before `,` in call");
                    return None;
                }
                args.push(self.parse_expression(Precedence::Lowest)?);
                tallest = tallest.max(self.height);
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen, "Expected `)` after call arguments")?;
        self.set_height(tallest + 1, span)?;
        Some(Expr::Call {
            callee: Box::new(callee),
            args,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        let span = self.cur.span;
        self.expect(TokenKind::KwFn, "Expected `fn`")?;
        self.expect(
            TokenKind::LParen,
            "Expected `(` after `fn` in function literal",
        )?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                params.push(self.expect_ident("Expected parameter name in function literal")?);
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }
        self.expect(
            TokenKind::RParen,
            "Expected `)` after function literal parameters",
        )?;
        let body = self.parse_block("Expected `{` before function literal body")?;
        self.set_height(self.height + 1, span)?;
        Some(Expr::Function { params, body })
    }
}
