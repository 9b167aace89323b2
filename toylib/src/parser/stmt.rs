use crate::ast::{Block, Stmt};
use crate::token::TokenKind;

use super::{Parser, Precedence};

impl Parser {
    /// Parses one statement and leaves its tree height in `self.height`.
    pub(super) fn parse_stmt(&mut self) -> Option<Stmt> {
        let span = self.cur.span;
        let stmt = self.parse_stmt_kind()?;
        self.set_height(self.height + 1, span)?;
        Some(stmt)
    }

    fn parse_stmt_kind(&mut self) -> Option<Stmt> {
        match self.cur.kind {
            TokenKind::KwLet => {
                self.advance();
                let name = self.expect_ident("Expected variable name after `let`")?;
                self.expect(TokenKind::Assign, "Expected `=` in let binding")?;
                let value = self.parse_expression(Precedence::Lowest)?;
                self.eat(TokenKind::Semi);
                Some(Stmt::Let { name, value })
            }
            TokenKind::KwReturn => {
                self.advance();
                if self.eat(TokenKind::Semi)
                    || self.at(TokenKind::RBrace)
                    || self.at(TokenKind::Eof)
                {
                    self.height = 0;
                    return Some(Stmt::Return(None));
                }
                let value = self.parse_expression(Precedence::Lowest)?;
                self.eat(TokenKind::Semi);
                Some(Stmt::Return(Some(value)))
            }
            TokenKind::KwWhile => {
                self.advance();
                let cond = self.parse_condition("while")?;
                let cond_height = self.height;
                let body = self.parse_block("Expected `{` before while body")?;
                self.height = self.height.max(cond_height);
                Some(Stmt::While { cond, body })
            }
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwFor => {
                let span = self.advance().span;
                self.diagnostics
                    .error("`for` loops are not supported; use `while`", span);
                None
            }
            TokenKind::LBrace => {
                let block = self.parse_block("Expected `{`")?;
                Some(Stmt::Block(block))
            }
            TokenKind::Ident if self.peek_is(TokenKind::Assign) => {
                let name = self.advance().literal;
                self.advance();
                let value = self.parse_expression(Precedence::Lowest)?;
                self.eat(TokenKind::Semi);
                Some(Stmt::Assign { name, value })
            }
            _ => {
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.eat(TokenKind::Semi);
                Some(Stmt::Expr(expr))
            }
        }
    }

    /// Parses `{ ... }`, leaving the block's tree height in `self.height`.
    pub(super) fn parse_block(&mut self, open_err: &str) -> Option<Block> {
        self.nested(|p| p.parse_block_body(open_err))
    }

    fn parse_block_body(&mut self, open_err: &str) -> Option<Block> {
        let span = self.cur.span;
        self.expect(TokenKind::LBrace, open_err)?;
        let mut statements = Vec::new();
        let mut tallest = 0;
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            let before = self.consumed;
            match self.parse_stmt() {
                Some(stmt) => {
                    tallest = tallest.max(self.height);
                    statements.push(stmt);
                }
                None => self.recover(before),
            }
        }
        self.expect(TokenKind::RBrace, "Expected `}` after block")?;
        self.set_height(tallest + 1, span)?;
        Some(Block { statements })
    }

    fn parse_if(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::KwIf, "Expected `if`")?;
        let cond = self.parse_condition("if")?;
        let mut tallest = self.height;
        let then_block = self.parse_block("Expected `{` before if body")?;
        tallest = tallest.max(self.height);
        let else_block = if self.eat(TokenKind::KwElse) {
            if self.at(TokenKind::KwIf) {
                // `else if` becomes a block holding one nested `if`
                let span = self.cur.span;
                let nested = self.nested(Self::parse_if)?;
                self.set_height(self.height + 2, span)?;
                Some(Block {
                    statements: vec![nested],
                })
            } else {
                Some(self.parse_block("Expected `{` before else body")?)
            }
        } else {
            None
        };
        if else_block.is_some() {
            tallest = tallest.max(self.height);
        }
        self.height = tallest;
        Some(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    fn parse_condition(&mut self, keyword: &str) -> Option<crate::ast::Expr> {
        self.expect(
            TokenKind::LParen,
            &format!("Expected `(` after `{keyword}`"),
        )?;
        let cond = self.parse_expression(Precedence::Lowest)?;
        self.expect(
            TokenKind::RParen,
            &format!("Expected `)` after {keyword} condition"),
        )?;
        Some(cond)
    }
}
