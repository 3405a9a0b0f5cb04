use crate::ast::{Identifier, LetStatement, ReturnStatement, Statement};
use crate::parser::expressions::Precedence;
use crate::parser::{ParseError, Parser};
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    /// Parses one statement. The trailing `;` is left for the caller.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.iter.peek().map(|token| token.kind) {
            Some(TokenKind::Let) => self.parse_let_statement().map(Statement::Let),
            Some(TokenKind::Return) => self.parse_return_statement().map(Statement::Return),
            _ => self
                .parse_expression(Precedence::Lowest)
                .map(Statement::Expression),
        }
    }

    fn parse_let_statement(&mut self) -> Result<LetStatement, ParseError> {
        self.expect_token(TokenKind::Let)?;
        let name = self.parse_ident()?;
        self.expect_token(TokenKind::Assign)?;

        Ok(LetStatement {
            identifier: Identifier { name },
            value: self.parse_expression(Precedence::Lowest)?,
        })
    }

    fn parse_return_statement(&mut self) -> Result<ReturnStatement, ParseError> {
        self.expect_token(TokenKind::Return)?;

        Ok(ReturnStatement {
            value: self.parse_expression(Precedence::Lowest)?,
        })
    }
}
