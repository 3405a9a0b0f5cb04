mod printer;
mod reader;

use rustyline::DefaultEditor;

use monkey_eval::environment::Environment;
use printer::Printer;
use reader::{ReadOutput, Reader};

struct Repl {
    reader: Reader,
    environment: Environment,
    printer: Printer,
}

impl Repl {
    fn run(mut self) -> anyhow::Result<()> {
        tracing::debug!(print_ast = self.printer.print_ast, "starting repl");
        loop {
            match self.reader.read()? {
                ReadOutput::Exit => break,
                ReadOutput::Clear => continue,
                ReadOutput::Value(line) => {
                    tracing::trace!(%line, "evaluating line");
                    self.printer.print_program(&line)?;
                    let result = monkey_eval::run(&line, &self.environment);
                    self.printer.print(&result)?;
                }
            }
        }
        tracing::debug!("repl closed");
        Ok(())
    }
}

/// Reads lines until Ctrl-D, evaluating each against one session-wide
/// environment.
pub fn start(print_ast: bool) -> anyhow::Result<()> {
    let rl = DefaultEditor::new()?;

    Repl {
        reader: Reader::new(rl),
        environment: Environment::new(),
        printer: Printer { print_ast },
    }
    .run()
}
