use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = ">> ";

pub enum ReadOutput {
    Exit,
    Clear,
    Value(String),
}

pub struct Reader {
    rl: DefaultEditor,
}

impl Reader {
    pub fn new(rl: DefaultEditor) -> Self {
        Self { rl }
    }

    pub fn read(&mut self) -> Result<ReadOutput, ReadlineError> {
        let line = match self.rl.readline(PROMPT) {
            Err(ReadlineError::Interrupted) => return Ok(ReadOutput::Clear),
            Err(ReadlineError::Eof) => return Ok(ReadOutput::Exit),
            Err(err) => return Err(err),
            Ok(line) => line,
        };
        if line.trim().is_empty() {
            return Ok(ReadOutput::Clear);
        }
        self.rl.add_history_entry(line.as_str())?;

        Ok(ReadOutput::Value(line))
    }
}
