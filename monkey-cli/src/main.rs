mod logging;
mod repl;
mod runner;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Script to run. Starts the interactive prompt when omitted.
    path: Option<PathBuf>,
    /// Print the parsed program before evaluating it.
    #[arg(long)]
    print_ast: bool,
    /// Stack size of the interpreter thread, in MiB.
    #[arg(long, value_name = "MIB", default_value_t = 64)]
    stack_size: usize,
    /// Tracing filter directive, e.g. `monkey_syntax=debug`. Overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_tracing(cli.log.as_deref())?;

    // Evaluation recurses on the host stack.
    let interpreter = std::thread::Builder::new()
        .name("interpreter".to_owned())
        .stack_size(cli.stack_size.saturating_mul(1024 * 1024))
        .spawn(move || match cli.path {
            None => repl::start(cli.print_ast).map(|()| ExitCode::SUCCESS),
            Some(path) => runner::execute(&path, cli.print_ast),
        })
        .context("failed to spawn the interpreter thread")?;

    match interpreter.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["monkey"]).unwrap();

        assert_eq!(cli.path, None);
        assert!(!cli.print_ast);
        assert_eq!(cli.stack_size, 64);
        assert_eq!(cli.log, None);
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::try_parse_from([
            "monkey",
            "--print-ast",
            "--stack-size",
            "8",
            "--log",
            "monkey_eval=trace",
            "script.mk",
        ])
        .unwrap();

        assert_eq!(cli.path, Some(PathBuf::from("script.mk")));
        assert!(cli.print_ast);
        assert_eq!(cli.stack_size, 8);
        assert_eq!(cli.log.as_deref(), Some("monkey_eval=trace"));
    }

    #[test]
    fn test_rejects_bad_stack_size() {
        assert!(Cli::try_parse_from(["monkey", "--stack-size", "lots"]).is_err());
    }
}
