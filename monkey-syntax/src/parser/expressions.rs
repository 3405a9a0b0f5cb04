use super::error::{Expected, ParseError};
use crate::ast::{BlockStatement, Expression, Identifier, InfixOperationKind, PrefixOperationKind};
use crate::parser::Parser;
use crate::token::{Token, TokenKind};

/// Binding power of an operator, weakest first.
#[derive(PartialOrd, PartialEq, Debug, Clone, Copy)]
pub enum Precedence {
    Lowest = 0,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    pub fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::Equal | TokenKind::NotEqual => Precedence::Equals,
            TokenKind::LessThan | TokenKind::GreaterThan => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen => Precedence::Call,
            TokenKind::LBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

/// What a token does when it follows a complete expression.
#[derive(Debug, PartialEq, Clone, Copy)]
enum Infix {
    Operator(InfixOperationKind),
    Call,
    Index,
}

impl Infix {
    fn of(kind: TokenKind) -> Option<Infix> {
        let operator = match kind {
            TokenKind::Plus => InfixOperationKind::Plus,
            TokenKind::Minus => InfixOperationKind::Minus,
            TokenKind::Asterisk => InfixOperationKind::Multiply,
            TokenKind::Slash => InfixOperationKind::Divide,
            TokenKind::LessThan => InfixOperationKind::LessThan,
            TokenKind::GreaterThan => InfixOperationKind::GreaterThan,
            TokenKind::Equal => InfixOperationKind::Equal,
            TokenKind::NotEqual => InfixOperationKind::NotEqual,
            TokenKind::LParen => return Some(Infix::Call),
            TokenKind::LBracket => return Some(Infix::Index),
            _ => return None,
        };
        Some(Infix::Operator(operator))
    }
}

impl<'a> Parser<'a> {
    /// Pratt loop: keeps folding operators into the left operand while they
    /// bind tighter than `precedence`. Equal precedence stops the loop, which
    /// makes binary operators left-associative.
    pub fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression, ParseError> {
        let Some(token) = self.iter.next() else {
            return Err(ParseError::premature_end_expected_expression());
        };
        let mut left = self.parse_prefix(token)?;

        // `;` and every non-operator token sit at `Lowest`
        while let Some(next) = self
            .iter
            .next_if(|next| precedence < Precedence::of(next.kind))
        {
            let Some(infix) = Infix::of(next.kind) else {
                break;
            };
            left = self.parse_infix(infix, next.kind, left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self, token: Token) -> Result<Expression, ParseError> {
        match token.kind {
            TokenKind::Ident => Ok(Expression::Identifier(Identifier {
                name: token.literal,
            })),
            TokenKind::Int => parse_integer_literal(token),
            TokenKind::String => Ok(Expression::StringLiteral(token.literal.to_string())),
            TokenKind::True => Ok(Expression::BooleanLiteral(true)),
            TokenKind::False => Ok(Expression::BooleanLiteral(false)),
            TokenKind::Bang => self.parse_prefix_operation(PrefixOperationKind::Bang),
            TokenKind::Minus => self.parse_prefix_operation(PrefixOperationKind::Minus),
            TokenKind::LParen => self.parse_grouped_expression(),
            TokenKind::LBracket => Ok(Expression::ArrayLiteral(
                self.parse_expression_list(TokenKind::RBracket)?,
            )),
            TokenKind::LBrace => self.parse_hash_literal(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::Illegal => Err(ParseError::IllegalToken(token)),
            _ => Err(ParseError::NoPrefixFunction(token)),
        }
    }

    fn parse_infix(
        &mut self,
        infix: Infix,
        kind: TokenKind,
        left: Expression,
    ) -> Result<Expression, ParseError> {
        match infix {
            Infix::Operator(operator) => {
                let right = self.parse_expression(Precedence::of(kind))?;
                Ok(Expression::InfixOperation(
                    operator,
                    Box::new(left),
                    Box::new(right),
                ))
            }
            Infix::Call => Ok(Expression::CallExpression {
                function: Box::new(left),
                arguments: self.parse_expression_list(TokenKind::RParen)?,
            }),
            Infix::Index => {
                let index = self.parse_expression(Precedence::Lowest)?;
                self.expect_token(TokenKind::RBracket)?;
                Ok(Expression::IndexExpression {
                    left: Box::new(left),
                    index: Box::new(index),
                })
            }
        }
    }

    fn parse_prefix_operation(
        &mut self,
        kind: PrefixOperationKind,
    ) -> Result<Expression, ParseError> {
        // The magnitude of `i64::MIN` only fits once negated
        if kind == PrefixOperationKind::Minus
            && self
                .iter
                .next_if(|token| {
                    token.kind == TokenKind::Int
                        && token.literal.parse::<u64>() == Ok(i64::MIN.unsigned_abs())
                })
                .is_some()
        {
            return Ok(Expression::IntegerLiteral(i64::MIN));
        }
        let operand = self.parse_expression(Precedence::Prefix)?;
        Ok(Expression::PrefixOperation(kind, Box::new(operand)))
    }

    fn parse_grouped_expression(&mut self) -> Result<Expression, ParseError> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_token(TokenKind::RParen)?;
        Ok(expression)
    }

    /// Parses `item (, item)* ,? closing` with the opening delimiter already
    /// consumed.
    fn parse_delimited<T>(
        &mut self,
        closing: TokenKind,
        mut parse_item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = Vec::new();

        loop {
            match self.iter.peek() {
                None => {
                    return Err(ParseError::PrematureEndOfInput {
                        expected: Expected::Token(closing),
                    })
                }
                Some(next) if next.kind == closing => {
                    self.iter.next();
                    return Ok(items);
                }
                Some(_) => items.push(parse_item(self)?),
            }

            match self.iter.next() {
                Some(next) if next.kind == TokenKind::Comma => {}
                Some(next) if next.kind == closing => return Ok(items),
                next => return Err(ParseError::unexpected_token(closing, next)),
            }
        }
    }

    fn parse_expression_list(&mut self, closing: TokenKind) -> Result<Vec<Expression>, ParseError> {
        self.parse_delimited(closing, |parser| {
            parser.parse_expression(Precedence::Lowest)
        })
    }

    fn parse_hash_literal(&mut self) -> Result<Expression, ParseError> {
        let pairs = self.parse_delimited(TokenKind::RBrace, |parser| {
            let key = parser.parse_expression(Precedence::Lowest)?;
            parser.expect_token(TokenKind::Colon)?;
            let value = parser.parse_expression(Precedence::Lowest)?;
            Ok((key, value))
        })?;
        Ok(Expression::HashLiteral(pairs))
    }

    fn parse_if_expression(&mut self) -> Result<Expression, ParseError> {
        let condition = self.parse_expression(Precedence::Lowest)?;
        let consequence = self.parse_block_statement()?;

        let alternative = match self.iter.next_if(|token| token.kind == TokenKind::Else) {
            Some(_) => Some(self.parse_block_statement()?),
            None => None,
        };

        Ok(Expression::IfExpression {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// Parses `{ statement* }`. Statements may be separated by `;` the same
    /// way as at the top level.
    fn parse_block_statement(&mut self) -> Result<BlockStatement, ParseError> {
        self.expect_token(TokenKind::LBrace)?;
        let mut statements = Vec::new();

        loop {
            match self.iter.peek().map(|token| token.kind) {
                Some(TokenKind::RBrace) => {
                    self.iter.next();
                    return Ok(BlockStatement { statements });
                }
                Some(TokenKind::SemiColon) => {
                    self.iter.next();
                }
                Some(_) => match self.parse_statement() {
                    Ok(statement) => statements.push(statement),
                    Err(err) => {
                        // A failure on `}` has already closed this block
                        let closed = err
                            .token()
                            .is_some_and(|token| token.kind == TokenKind::RBrace);
                        self.recover(err);
                        if closed {
                            return Ok(BlockStatement { statements });
                        }
                    }
                },
                None => {
                    return Err(ParseError::PrematureEndOfInput {
                        expected: Expected::Token(TokenKind::RBrace),
                    })
                }
            }
        }
    }

    fn parse_function_literal(&mut self) -> Result<Expression, ParseError> {
        self.expect_token(TokenKind::LParen)?;
        let parameters = self.parse_delimited(TokenKind::RParen, |parser| {
            parser.parse_ident().map(|name| Identifier { name })
        })?;
        let body = self.parse_block_statement()?;

        Ok(Expression::FunctionLiteral { parameters, body })
    }
}

fn parse_integer_literal(token: Token) -> Result<Expression, ParseError> {
    match token.literal.parse() {
        Ok(value) => Ok(Expression::IntegerLiteral(value)),
        Err(source) => Err(ParseError::InvalidInteger { token, source }),
    }
}
