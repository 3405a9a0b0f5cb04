use std::fmt::Display;

use thiserror::Error;

use crate::token::{Token, TokenKind};

#[derive(Debug, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected}, got end of input")]
    PrematureEndOfInput { expected: Expected },
    #[error("expected {expected}, got {got}")]
    UnexpectedToken { expected: Expected, got: Token },
    #[error("could not parse {token} as integer: {source}")]
    InvalidInteger {
        token: Token,
        source: std::num::ParseIntError,
    },
    #[error("no prefix parse function for {0}")]
    NoPrefixFunction(Token),
    #[error("illegal token {0}")]
    IllegalToken(Token),
}

#[derive(Debug, PartialEq)]
pub enum Expected {
    Token(TokenKind),
    Identifier,
    Expression,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "next token to be {}", kind),
            Expected::Identifier => write!(f, "an identifier"),
            Expected::Expression => write!(f, "an expression"),
        }
    }
}

impl ParseError {
    pub fn premature_end_expected_expression() -> Self {
        ParseError::PrematureEndOfInput {
            expected: Expected::Expression,
        }
    }

    pub fn unexpected_token(expected: TokenKind, got: Option<Token>) -> ParseError {
        Self::unexpected_other(Expected::Token(expected), got)
    }

    pub fn unexpected_other(expected: Expected, got: Option<Token>) -> ParseError {
        match got {
            Some(got) => ParseError::UnexpectedToken { expected, got },
            None => ParseError::PrematureEndOfInput { expected },
        }
    }

    /// The token that triggered the error, if the input had not ended.
    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseError::PrematureEndOfInput { .. } => None,
            ParseError::UnexpectedToken { got, .. } => Some(got),
            ParseError::InvalidInteger { token, .. }
            | ParseError::NoPrefixFunction(token)
            | ParseError::IllegalToken(token) => Some(token),
        }
    }
}

/// Every syntax error found in a single parse pass. Never empty.
#[derive(Debug, PartialEq)]
pub struct ParseErrors(Vec<ParseError>);

impl ParseErrors {
    pub(crate) fn new(errors: Vec<ParseError>) -> Self {
        debug_assert!(!errors.is_empty());
        ParseErrors(errors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.0.iter()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}
