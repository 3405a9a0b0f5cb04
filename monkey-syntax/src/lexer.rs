use crate::token::{lookup_ident, Token, TokenKind};

#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        Self { input, iter }
    }

    fn is_letter(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    /// Returns the next token. Once the input is exhausted every call yields
    /// a [`TokenKind::Eof`] token.
    pub fn next_token(&mut self) -> Token {
        while self.iter.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}

        let Some((idx, ch)) = self.iter.next() else {
            let end = self.input.len();
            return Token::new(TokenKind::Eof, "", end, end);
        };

        match ch {
            '=' => {
                if self.iter.next_if(|(_, ch)| *ch == '=').is_some() {
                    self.token(TokenKind::Equal, idx)
                } else {
                    self.token(TokenKind::Assign, idx)
                }
            }
            '!' => {
                if self.iter.next_if(|(_, ch)| *ch == '=').is_some() {
                    self.token(TokenKind::NotEqual, idx)
                } else {
                    self.token(TokenKind::Bang, idx)
                }
            }
            '+' => self.token(TokenKind::Plus, idx),
            '-' => self.token(TokenKind::Minus, idx),
            '*' => self.token(TokenKind::Asterisk, idx),
            '/' => self.token(TokenKind::Slash, idx),
            '<' => self.token(TokenKind::LessThan, idx),
            '>' => self.token(TokenKind::GreaterThan, idx),
            ',' => self.token(TokenKind::Comma, idx),
            ':' => self.token(TokenKind::Colon, idx),
            ';' => self.token(TokenKind::SemiColon, idx),
            '(' => self.token(TokenKind::LParen, idx),
            ')' => self.token(TokenKind::RParen, idx),
            '{' => self.token(TokenKind::LBrace, idx),
            '}' => self.token(TokenKind::RBrace, idx),
            '[' => self.token(TokenKind::LBracket, idx),
            ']' => self.token(TokenKind::RBracket, idx),
            '"' => self.read_string(idx),
            c if Lexer::is_letter(c) => self.read_identifier(idx),
            c if c.is_ascii_digit() => self.read_number(idx),
            _ => self.token(TokenKind::Illegal, idx),
        }
    }

    fn token(&mut self, kind: TokenKind, start: usize) -> Token {
        let end = self.next_idx();
        Token::new(kind, &self.input[start..end], start, end)
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while self.iter.next_if(|(_, ch)| Self::is_letter(*ch)).is_some() {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        Token::new(lookup_ident(ident), ident, start, end)
    }

    fn read_number(&mut self, start: usize) -> Token {
        while self.iter.next_if(|(_, ch)| ch.is_ascii_digit()).is_some() {}

        self.token(TokenKind::Int, start)
    }

    fn read_string(&mut self, start: usize) -> Token {
        loop {
            match self.iter.next() {
                Some((closing, '"')) => {
                    let end = self.next_idx();
                    return Token::new(TokenKind::String, &self.input[start + 1..closing], start, end);
                }
                // Unterminated string
                None => return self.token(TokenKind::Illegal, start),
                _ => {}
            }
        }
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        match token.kind {
            TokenKind::Eof => None,
            _ => Some(token),
        }
    }
}
