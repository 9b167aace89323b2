use crate::diagnostic::Span;
use crate::token::{Token, TokenKind};

/// Lexes the whole source, returning every token up to and including `Eof`.
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token();
        let done = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if done {
            return tokens;
        }
    }
}

/// Pull-based scanner. It never fails: characters it cannot classify come
/// back as `Illegal` tokens and the parser decides what to do with them.
#[derive(Debug, Clone)]
pub struct Lexer {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            idx: 0,
            line: 1,
            col: 1,
        }
    }

    /// Consumes and returns the next token. Keeps returning `Eof` once the
    /// input is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_ws_or_comment();

        let start = self.idx;
        let line = self.line;
        let col = self.col;
        let Some(c) = self.peek() else {
            return Token::eof(Span::new(start, start, line, col));
        };

        if Self::is_ident_start(c) {
            return self.lex_ident_or_keyword(start, line, col);
        }
        if c.is_ascii_digit() {
            return self.lex_number(start, line, col);
        }

        match c {
            '"' => self.lex_string(start, line, col),
            '(' => self.single(TokenKind::LParen, start, line, col),
            ')' => self.single(TokenKind::RParen, start, line, col),
            '{' => self.single(TokenKind::LBrace, start, line, col),
            '}' => self.single(TokenKind::RBrace, start, line, col),
            ';' => self.single(TokenKind::Semi, start, line, col),
            ',' => self.single(TokenKind::Comma, start, line, col),
            '+' => self.single(TokenKind::Plus, start, line, col),
            '-' => self.single(TokenKind::Minus, start, line, col),
            '*' => self.single(TokenKind::Star, start, line, col),
            '/' => self.single(TokenKind::Slash, start, line, col),
            '<' => self.single(TokenKind::Lt, start, line, col),
            '>' => self.single(TokenKind::Gt, start, line, col),
            '=' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    self.make_token(TokenKind::EqEq, start, line, col)
                } else {
                    self.make_token(TokenKind::Assign, start, line, col)
                }
            }
            '!' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    self.make_token(TokenKind::Neq, start, line, col)
                } else {
                    self.make_token(TokenKind::Bang, start, line, col)
                }
            }
            _ => self.single(TokenKind::Illegal, start, line, col),
        }
    }

    fn lex_ident_or_keyword(&mut self, start: usize, line: usize, col: usize) -> Token {
        self.bump();
        while matches!(self.peek(), Some(ch) if Self::is_ident_continue(ch)) {
            self.bump();
        }
        let literal = self.slice(start, self.idx);
        let kind = TokenKind::keyword(&literal).unwrap_or(TokenKind::Ident);
        Token::new(kind, literal, Span::new(start, self.idx, line, col))
    }

    fn lex_number(&mut self, start: usize, line: usize, col: usize) -> Token {
        self.bump();
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.bump();
        }
        self.make_token(TokenKind::Int, start, line, col)
    }

    fn lex_string(&mut self, start: usize, line: usize, col: usize) -> Token {
        self.bump();
        let body_start = self.idx;
        while let Some(ch) = self.peek() {
            if ch == '"' {
                let literal = self.slice(body_start, self.idx);
                self.bump();
                return Token::new(
                    TokenKind::Str,
                    literal,
                    Span::new(start, self.idx, line, col),
                );
            }
            if ch == '\n' {
                break;
            }
            self.bump();
        }

        // Unterminated: surface the partial text, quote included.
        self.make_token(TokenKind::Illegal, start, line, col)
    }

    fn skip_ws_or_comment(&mut self) {
        loop {
            while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
                self.bump();
            }

            if self.peek() == Some('/') && self.peek_next() == Some('/') {
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.bump();
                }
                continue;
            }

            break;
        }
    }

    fn single(&mut self, kind: TokenKind, start: usize, line: usize, col: usize) -> Token {
        self.bump();
        self.make_token(kind, start, line, col)
    }

    fn make_token(&self, kind: TokenKind, start: usize, line: usize, col: usize) -> Token {
        Token::new(
            kind,
            self.slice(start, self.idx),
            Span::new(start, self.idx, line, col),
        )
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = *self.chars.get(self.idx)?;
        self.idx += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.idx + 1).copied()
    }

    fn is_ident_start(c: char) -> bool {
        c == '_' || c.is_ascii_alphabetic()
    }

    fn is_ident_continue(c: char) -> bool {
        c == '_' || c.is_ascii_alphanumeric()
    }
}
