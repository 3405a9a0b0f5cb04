use anyhow::Context;
use std::fmt::Display;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use monkey_eval::environment::Environment;
use monkey_eval::RunError;

pub fn execute(path: &Path, print_ast: bool) -> anyhow::Result<ExitCode> {
    tracing::debug!(path = %path.display(), "running script");
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let stdout = std::io::stdout();
    let succeeded = interpret(&source, print_ast, &mut stdout.lock())
        .context("failed to write to stdout")?;
    tracing::debug!(succeeded, "script finished");

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Runs `source` in a fresh environment, reporting to `out`. Returns whether
/// the program parsed and evaluated without error.
fn interpret(source: &str, print_ast: bool, out: &mut impl Write) -> std::io::Result<bool> {
    if print_ast {
        print_program(source, out)?;
    }
    let result = monkey_eval::run(source, &Environment::new());
    report(&result, out)
}

/// Writes the canonical form of `source` when it parses. Syntax errors are
/// left for the evaluation report.
pub fn print_program(source: &str, out: &mut impl Write) -> std::io::Result<()> {
    match monkey_eval::parse(source) {
        Ok(program) => write!(out, "{}", program),
        Err(_) => Ok(()),
    }
}

/// Writes the value of a run, or its errors, to `out`. Returns whether the
/// run succeeded.
pub fn report<T: Display>(
    result: &Result<T, RunError>,
    out: &mut impl Write,
) -> std::io::Result<bool> {
    match result {
        Ok(value) => {
            writeln!(out, "{}", value)?;
            Ok(true)
        }
        Err(RunError::Parse(errors)) => {
            for err in errors.iter() {
                writeln!(out, "parser error: {}", err)?;
            }
            Ok(false)
        }
        Err(RunError::Evaluation(err)) => {
            writeln!(out, "ERROR: {}", err)?;
            Ok(false)
        }
    }
}
