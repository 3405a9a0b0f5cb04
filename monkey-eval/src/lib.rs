pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod object;

use gc::Gc;

use environment::Environment;
use monkey_syntax::ast::Program;
use monkey_syntax::lexer::Lexer;
use monkey_syntax::parser::{ParseErrors, Parser};
use object::{EvaluationError, Object};
use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum RunError {
    #[error("{0}")]
    Parse(#[from] ParseErrors),
    #[error("{0}")]
    Evaluation(#[from] EvaluationError),
}

pub fn parse(input: &str) -> Result<Program, ParseErrors> {
    Parser::new(Lexer::new(input)).parse_program()
}

/// Lexes, parses and evaluates `input` against `environment`. Nothing is
/// evaluated when the source has syntax errors.
pub fn run(input: &str, environment: &Environment) -> Result<Gc<Object>, RunError> {
    let program = parse(input)?;
    Ok(evaluator::eval_program(&program, environment)?)
}
