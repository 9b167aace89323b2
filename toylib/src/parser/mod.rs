use crate::ast::{Expr, Program};
use crate::diagnostic::{DiagnosticBag, Span};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

mod expr;
mod stmt;

pub use expr::Precedence;

/// Deepest recursion the parser allows through groups, prefix operators,
/// right operands, call arguments and blocks.
pub const MAX_NESTING_DEPTH: usize = 256;
/// Tallest tree a single statement may produce. Bounds the recursion of
/// every later pass over the AST, including long left-leaning operator
/// chains that the parser itself builds in a loop.
pub const MAX_TREE_HEIGHT: usize = 4096;

/// Precedence-climbing parser over a pull-based [`Lexer`].
///
/// The parser is best-effort: a malformed statement is recorded in
/// [`Parser::errors`] and parsing resumes at the next statement boundary.
/// Callers must check that the diagnostics are empty before trusting the
/// returned tree.
#[derive(Debug, Clone)]
pub struct Parser {
    lexer: Lexer,
    cur: Token,
    peek: Token,
    consumed: usize,
    depth: usize,
    // height of the node most recently built
    height: usize,
    diagnostics: DiagnosticBag,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(source),
            cur: Token::eof(Default::default()),
            peek: Token::eof(Default::default()),
            consumed: 0,
            depth: 0,
            height: 0,
            diagnostics: DiagnosticBag::new(),
        };
        parser.advance();
        parser.advance();
        parser.consumed = 0;
        parser
    }

    pub fn parse_source(source: &str) -> (Program, DiagnosticBag) {
        let mut parser = Parser::new(source);
        let program = parser.parse_program();
        (program, parser.diagnostics)
    }

    /// Parses a single expression; anything left over other than one `;` is
    /// reported.
    pub fn parse_expression_source(source: &str) -> (Option<Expr>, DiagnosticBag) {
        let mut parser = Parser::new(source);
        let expr = parser.parse_expression(Precedence::Lowest);
        if expr.is_some() {
            parser.eat(TokenKind::Semi);
            if !parser.at(TokenKind::Eof) {
                parser.error_here_expected("Expected end of expression");
            }
        }
        (expr, parser.diagnostics)
    }

    pub fn errors(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            let before = self.consumed;
            match self.parse_stmt() {
                Some(stmt) => statements.push(stmt),
                None => self.recover(before),
            }
        }

        log::debug!(
            "parsed {} top-level statements ({} diagnostics)",
            statements.len(),
            self.diagnostics.len()
        );
        Program { statements }
    }

    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        let prev_peek = std::mem::replace(&mut self.peek, next);
        self.consumed += 1;
        std::mem::replace(&mut self.cur, prev_peek)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Option<Token> {
        if self.at(kind) {
            return Some(self.advance());
        }
        self.error_here_expected(message);
        None
    }

    fn expect_ident(&mut self, message: &str) -> Option<String> {
        self.expect(TokenKind::Ident, message).map(|t| t.literal)
    }

    /// Skips to the next statement boundary after a failed statement. A
    /// consumed `;` ends the bad statement; `}` and statement keywords are
    /// left for the caller. Always makes progress.
    fn recover(&mut self, before: usize) {
        while !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Semi) {
                break;
            }
            if matches!(
                self.cur.kind,
                TokenKind::RBrace
                    | TokenKind::KwLet
                    | TokenKind::KwReturn
                    | TokenKind::KwWhile
                    | TokenKind::KwIf
                    | TokenKind::KwFor
            ) {
                break;
            }
            self.advance();
        }
        if self.consumed == before && !self.at(TokenKind::Eof) {
            self.advance();
        }
    }

    /// Runs `parse` one level deeper, refusing once the nesting limit is hit.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            self.too_deep(self.cur.span);
            return None;
        }
        self.depth += 1;
        let out = parse(self);
        self.depth -= 1;
        out
    }

    /// Records the height of the node about to be built.
    fn set_height(&mut self, height: usize, span: Span) -> Option<()> {
        if height > MAX_TREE_HEIGHT {
            self.too_deep(span);
            return None;
        }
        self.height = height;
        Some(())
    }

    fn too_deep(&mut self, span: Span) {
        self.diagnostics.error("Expression nested too deeply", span);
    }

    fn token_label(token: &Token) -> String {
        match token.kind {
            TokenKind::Eof => "EOF".to_string(),
            TokenKind::Str => format!("string {:?}", token.literal),
            _ => format!("`{}`", token.literal),
        }
    }

    fn error_here_expected(&mut self, message: &str) {
        let found = Self::token_label(&self.cur);
        self.diagnostics
            .error_expected_found(message, &found, self.cur.span);
    }
}
