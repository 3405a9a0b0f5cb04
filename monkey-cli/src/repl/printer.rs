use std::fmt::Display;

use monkey_eval::RunError;

use crate::runner;

pub struct Printer {
    pub print_ast: bool,
}

impl Printer {
    pub fn print_program(&mut self, line: &str) -> std::io::Result<()> {
        if self.print_ast {
            runner::print_program(line, &mut std::io::stdout().lock())?;
        }
        Ok(())
    }

    pub fn print<T: Display>(&mut self, result: &Result<T, RunError>) -> std::io::Result<()> {
        runner::report(result, &mut std::io::stdout().lock())?;
        Ok(())
    }
}
