use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber. The filter comes from `directive` when
/// given, otherwise from `RUST_LOG`; with neither, nothing is installed.
/// Events go to stderr so program output on stdout stays clean.
pub fn init_tracing(directive: Option<&str>) -> anyhow::Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{}`", directive))?,
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => return Ok(()),
        },
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
    Ok(())
}
