pub mod error;
pub mod expressions;
pub mod statements;

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};
pub use error::{ParseError, ParseErrors};

pub struct Parser<'a> {
    pub(crate) iter: std::iter::Peekable<Lexer<'a>>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let iter = lexer.peekable();
        Self {
            iter,
            errors: Vec::new(),
        }
    }

    pub(crate) fn parse_ident(&mut self) -> Result<std::rc::Rc<str>, ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token {
                kind: TokenKind::Ident,
                literal,
                ..
            }) => Ok(literal),
            _ => Err(ParseError::unexpected_other(
                error::Expected::Identifier,
                token,
            )),
        }
    }

    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<(), ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token { kind, .. }) if kind == token_kind => Ok(()),
            _ => Err(ParseError::unexpected_token(token_kind, token)),
        }
    }

    pub(crate) fn skip_semicolon(&mut self) -> bool {
        self.iter
            .next_if(|token| token.kind == TokenKind::SemiColon)
            .is_some()
    }

    /// Parses the whole input. Statement-level errors are collected and
    /// parsing resumes at the next statement, so one pass reports every
    /// independent error.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn parse_program(&mut self) -> Result<crate::ast::Program, ParseErrors> {
        let mut statements = Vec::new();

        while self.iter.peek().is_some() {
            if self.skip_semicolon() {
                continue;
            }
            match self.parse_statement() {
                Ok(statement) => {
                    statements.push(statement);
                    self.skip_semicolon();
                }
                Err(err) => self.recover(err),
            }
        }

        let errors = std::mem::take(&mut self.errors);
        if errors.is_empty() {
            Ok(crate::ast::Program { statements })
        } else {
            Err(ParseErrors::new(errors))
        }
    }

    /// Records `err` and skips the rest of the failed statement.
    pub(crate) fn recover(&mut self, err: ParseError) {
        tracing::debug!(%err, "syntax error, skipping to next statement");
        self.synchronize(&err);
        self.errors.push(err);
    }

    // Discard tokens up to and including the next semicolon, unless the
    // failing token already ended the statement. Braced groups are skipped
    // whole and an unmatched `}` is left for the enclosing block.
    fn synchronize(&mut self, error: &ParseError) {
        if error.token().is_some_and(|token| {
            matches!(token.kind, TokenKind::SemiColon | TokenKind::RBrace)
        }) {
            return;
        }
        let mut depth = 0usize;
        while let Some(kind) = self.iter.peek().map(|token| token.kind) {
            if kind == TokenKind::RBrace && depth == 0 {
                return;
            }
            self.iter.next();
            match kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                TokenKind::SemiColon if depth == 0 => return,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::error::Expected;
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Result<crate::ast::Program, ParseErrors> {
        Parser::new(Lexer::new(input)).parse_program()
    }

    fn test_parsing(tests: Vec<(&str, &str)>) {
        for (input, expected) in tests {
            let program = parse(input).unwrap();

            assert_eq!(program.to_string(), expected)
        }
    }

    #[test]
    fn test_statements() {
        let tests = vec![
            ("let x = 5;", "let x = 5;\n"),
            ("let y = true;", "let y = true;\n"),
            ("let foobar = y;", "let foobar = y;\n"),
            ("return 5;", "return 5;\n"),
            ("return x + y", "return (x + y);\n"),
            ("foobar;", "foobar;\n"),
            ("\"hello world\"", "\"hello world\";\n"),
            ("let a = 1 let b = 2", "let a = 1;\nlet b = 2;\n"),
            (";;5;;", "5;\n"),
            ("", ""),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_expression_1() {
        let tests = vec![
            ("-a * b", "((-a) * b);\n"),
            ("!-a", "(!(-a));\n"),
            ("a + b + c", "((a + b) + c);\n"),
            ("a + b - c", "((a + b) - c);\n"),
            ("a * b * c", "((a * b) * c);\n"),
            ("a * b / c", "((a * b) / c);\n"),
            ("a + b / c", "(a + (b / c));\n"),
            (
                "a + b * c + d / e - f",
                "(((a + (b * c)) + (d / e)) - f);\n",
            ),
            ("3 + 4; -5 * 5", "(3 + 4);\n((-5) * 5);\n"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4));\n"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4));\n"),
            (
                "3 + 4 * 5 == 3 * 1 + 4 * 5",
                "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)));\n",
            ),
            ("true == !false", "(true == (!false));\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_expression_precedence() {
        let tests = vec![
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4);\n"),
            ("(5 + 5) * 2", "((5 + 5) * 2);\n"),
            ("2 / (5 + 5)", "(2 / (5 + 5));\n"),
            ("-(5 + 5)", "(-(5 + 5));\n"),
            ("!(true == true)", "(!(true == true));\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_call_expression() {
        let tests = vec![
            ("a + add(b * c) + d", "((a + add((b * c))) + d);\n"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)));\n",
            ),
            (
                "add(a + b + c * d / f + g)",
                "add((((a + b) + ((c * d) / f)) + g));\n",
            ),
            ("newAdder(2)(3)", "newAdder(2)(3);\n"),
            ("add()", "add();\n"),
            ("add(1, 2,)", "add(1, 2);\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_index_expression() {
        let tests = vec![
            (
                "a * [1, 2, 3, 4][b * c] * d",
                "((a * ([1, 2, 3, 4][(b * c)])) * d);\n",
            ),
            (
                "add(a * b[2], b[1], 2 * [1, 2][1])",
                "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])));\n",
            ),
            ("myArray[1 + 1]", "(myArray[(1 + 1)]);\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_collection_literals() {
        let tests = vec![
            ("[]", "[];\n"),
            ("[1, 2 * 2, 3 + 3]", "[1, (2 * 2), (3 + 3)];\n"),
            ("{}", "{};\n"),
            (
                "{\"one\": 1, \"two\": 2,}",
                "{\"one\": 1, \"two\": 2};\n",
            ),
            (
                "{\"one\": 0 + 1, true: 10 - 8}",
                "{\"one\": (0 + 1), true: (10 - 8)};\n",
            ),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_conditional() {
        let tests = vec![
            ("if (x < y) { x }", "if (x < y) {\n  x;\n};\n"),
            (
                "if (x < y) { x } else { y }",
                "if (x < y) {\n  x;\n} else {\n  y;\n};\n",
            ),
            ("if x { }", "if x {\n};\n"),
            (
                "if (a) { if (b) { return 10; } return 1; }",
                "if a {\n  if b {\n  return 10;\n};\n  return 1;\n};\n",
            ),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_function() {
        let tests = vec![
            (
                "let getName = fn(person) { person[\"name\"]; };",
                "let getName = fn(person) {\n  (person[\"name\"]);\n};\n",
            ),
            (
                "let getName = fn(person) { person[\"name\"] };",
                "let getName = fn(person) {\n  (person[\"name\"]);\n};\n",
            ),
            ("fn() {};", "fn() {\n};\n"),
            ("fn(x, y, z) {}", "fn(x, y, z) {\n};\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_missing_closing_paren() {
        let errors = parse("(1 + 2;").unwrap_err();
        assert_eq!(
            errors.into_iter().collect::<Vec<_>>(),
            vec![ParseError::UnexpectedToken {
                expected: Expected::Token(TokenKind::RParen),
                got: Token::new(TokenKind::SemiColon, ";", 6, 7),
            }]
        );
    }

    #[test]
    fn test_premature_end() {
        let errors = parse("let x = ").unwrap_err();
        assert_eq!(
            errors.into_iter().collect::<Vec<_>>(),
            vec![ParseError::premature_end_expected_expression()]
        );
    }

    #[test]
    fn test_errors_are_accumulated() {
        let errors = parse("let x 5; let = 10; let y = 3; add(1, 2;").unwrap_err();

        assert_eq!(
            errors.messages(),
            vec![
                "expected next token to be =, got 5 at 6..7",
                "expected an identifier, got = at 13..14",
                "expected next token to be ), got ; at 38..39",
            ]
        );
    }

    #[test]
    fn test_error_on_semicolon_does_not_swallow_next_statement() {
        let errors = parse("let x = ; let y = ;").unwrap_err();

        assert_eq!(
            errors.messages(),
            vec![
                "no prefix parse function for ; at 8..9",
                "no prefix parse function for ; at 18..19",
            ]
        );
    }

    #[test]
    fn test_errors_inside_blocks_stay_in_the_block() {
        let tests = vec![
            (
                "let f = fn() { let = 1; 2 }; let y = 3;",
                vec!["expected an identifier, got = at 19..20"],
            ),
            (
                "if (x) { let = 1 } let y = 2;",
                vec!["expected an identifier, got = at 13..14"],
            ),
            (
                "fn() { if (a) { 1 + } 2 }; let = 3;",
                vec![
                    "no prefix parse function for } at 20..21",
                    "expected an identifier, got = at 31..32",
                ],
            ),
            (
                "fn() { let x 1 + fn() { 2 }; 3 }",
                vec!["expected next token to be =, got 1 at 13..14"],
            ),
        ];

        for (input, expected) in tests {
            assert_eq!(parse(input).unwrap_err().messages(), expected, "{}", input);
        }
    }

    #[test]
    fn test_illegal_and_invalid_tokens() {
        let errors = parse("let a = @; 99999999999999999999; }").unwrap_err();
        let errors = errors.into_iter().collect::<Vec<_>>();

        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors[0],
            ParseError::IllegalToken(Token::new(TokenKind::Illegal, "@", 8, 9))
        );
        assert!(matches!(errors[1], ParseError::InvalidInteger { .. }));
        assert_eq!(
            errors[2],
            ParseError::NoPrefixFunction(Token::new(TokenKind::RBrace, "}", 33, 34))
        );
    }
}
