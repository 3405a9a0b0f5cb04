use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    Ident,
    Int,
    String,

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,

    Equal,
    NotEqual,

    GreaterThan,
    LessThan,

    Comma,
    Colon,
    SemiColon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: Rc<str>,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<Rc<str>>, start: usize, end: usize) -> Self {
        Token {
            kind,
            literal: literal.into(),
            start,
            end,
        }
    }
}

pub const KEYWORDS: [(&str, TokenKind); 7] = [
    ("fn", TokenKind::Function),
    ("let", TokenKind::Let),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("return", TokenKind::Return),
];

/// Resolves an identifier against [`KEYWORDS`], falling back to
/// [`TokenKind::Ident`].
pub fn lookup_ident(ident: &str) -> TokenKind {
    KEYWORDS
        .iter()
        .find(|(keyword, _)| *keyword == ident)
        .map(|(_, kind)| *kind)
        .unwrap_or(TokenKind::Ident)
}

impl TokenKind {
    pub fn to_str(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Illegal => "ILLEGAL",
            Eof => "EOF",
            Ident => "IDENT",
            Int => "INT",
            String => "STRING",
            Assign => "=",
            Plus => "+",
            Minus => "-",
            Bang => "!",
            Asterisk => "*",
            Slash => "/",
            Equal => "==",
            NotEqual => "!=",
            GreaterThan => ">",
            LessThan => "<",
            Comma => ",",
            Colon => ":",
            SemiColon => ";",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Function => "fn",
            Let => "let",
            True => "true",
            False => "false",
            If => "if",
            Else => "else",
            Return => "return",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Ident | TokenKind::Int | TokenKind::Illegal => {
                write!(f, "{} at {}..{}", self.literal, self.start, self.end)
            }
            TokenKind::String => write!(f, "\"{}\" at {}..{}", self.literal, self.start, self.end),
            kind => write!(f, "{} at {}..{}", kind, self.start, self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let inputs = vec![
            ("fn", TokenKind::Function),
            ("let", TokenKind::Let),
            ("true", TokenKind::True),
            ("false", TokenKind::False),
            ("if", TokenKind::If),
            ("else", TokenKind::Else),
            ("return", TokenKind::Return),
            ("returns", TokenKind::Ident),
            ("Let", TokenKind::Ident),
            ("foo_bar", TokenKind::Ident),
        ];

        for (input, expected) in inputs {
            assert_eq!(lookup_ident(input), expected, "{}", input);
        }
    }

    #[test]
    fn test_token_display() {
        assert_eq!(
            Token::new(TokenKind::RParen, ")", 3, 4).to_string(),
            ") at 3..4"
        );
        assert_eq!(
            Token::new(TokenKind::Ident, "foo", 0, 3).to_string(),
            "foo at 0..3"
        );
        assert_eq!(Token::new(TokenKind::Eof, "", 9, 9).to_string(), "end of input");
    }
}
